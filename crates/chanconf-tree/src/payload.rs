//! Typed value payloads.
//!
//! A config value stores its payload as opaque bytes; the key and scope of
//! the value decide which [`ValuePayload`] variant those bytes decode to.
//! The bytes are the bincode encoding of the variant's inner struct, so two
//! writers producing the same logical payload produce the same bytes.

use crate::encoding;
use crate::error::{Error, Result};
use crate::policy::Policy;
use crate::schema::ValueKind;
use chanconf_msp::Msp;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::{BTreeMap, BTreeSet};

/// Orderer batch size limits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSize {
    pub max_message_count: u32,
    pub absolute_max_bytes: u32,
    pub preferred_max_bytes: u32,
}

/// Orderer batch timeout as a duration literal, e.g. `"2s"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchTimeout {
    pub timeout: String,
}

/// Consensus state of the ordering service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConsensusState {
    #[default]
    #[serde(rename = "STATE_NORMAL")]
    Normal,
    #[serde(rename = "STATE_MAINTENANCE")]
    Maintenance,
}

/// Consensus type, its opaque metadata and state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsensusType {
    #[serde(rename = "type")]
    pub consensus_type: String,
    #[serde(with = "serde_bytes")]
    pub metadata: Vec<u8>,
    pub state: ConsensusState,
}

/// Limit on the number of channels the orderer will create.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelRestrictions {
    pub max_count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KafkaBrokers {
    pub brokers: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AnchorPeer {
    pub host: String,
    pub port: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnchorPeers {
    pub anchor_peers: Vec<AnchorPeer>,
}

/// `host:port` addresses; used for both channel orderer addresses and
/// per-org orderer endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrdererAddresses {
    pub addresses: Vec<String>,
}

/// A resource name's policy reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiResource {
    pub policy_ref: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Acls {
    pub acls: BTreeMap<String, ApiResource>,
}

/// Marker for an enabled capability.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Capability {}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Capabilities {
    pub capabilities: BTreeMap<String, Capability>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Consortium {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HashingAlgorithm {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockDataHashingStructure {
    pub width: u32,
}

impl Capabilities {
    pub fn names(&self) -> BTreeSet<&str> {
        self.capabilities.keys().map(String::as_str).collect()
    }
}

impl FromIterator<String> for Capabilities {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self {
            capabilities: iter.into_iter().map(|name| (name, Capability {})).collect(),
        }
    }
}

/// A decoded config value payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValuePayload {
    BatchSize(BatchSize),
    BatchTimeout(BatchTimeout),
    ConsensusType(ConsensusType),
    ChannelRestrictions(ChannelRestrictions),
    KafkaBrokers(KafkaBrokers),
    AnchorPeers(AnchorPeers),
    Endpoints(OrdererAddresses),
    OrdererAddresses(OrdererAddresses),
    Acls(Acls),
    Capabilities(Capabilities),
    Consortium(Consortium),
    HashingAlgorithm(HashingAlgorithm),
    BlockDataHashingStructure(BlockDataHashingStructure),
    Msp(Box<Msp>),
    ChannelCreationPolicy(Policy),
}

impl ValuePayload {
    /// The kind this payload must be registered under.
    pub fn kind(&self) -> ValueKind {
        match self {
            Self::BatchSize(_) => ValueKind::BatchSize,
            Self::BatchTimeout(_) => ValueKind::BatchTimeout,
            Self::ConsensusType(_) => ValueKind::ConsensusType,
            Self::ChannelRestrictions(_) => ValueKind::ChannelRestrictions,
            Self::KafkaBrokers(_) => ValueKind::KafkaBrokers,
            Self::AnchorPeers(_) => ValueKind::AnchorPeers,
            Self::Endpoints(_) => ValueKind::Endpoints,
            Self::OrdererAddresses(_) => ValueKind::OrdererAddresses,
            Self::Acls(_) => ValueKind::Acls,
            Self::Capabilities(_) => ValueKind::Capabilities,
            Self::Consortium(_) => ValueKind::Consortium,
            Self::HashingAlgorithm(_) => ValueKind::HashingAlgorithm,
            Self::BlockDataHashingStructure(_) => ValueKind::BlockDataHashingStructure,
            Self::Msp(_) => ValueKind::Msp,
            Self::ChannelCreationPolicy(_) => ValueKind::ChannelCreationPolicy,
        }
    }

    /// Canonical bytes of the payload.
    pub fn encode(&self) -> Result<Vec<u8>> {
        match self {
            Self::BatchSize(p) => encoding::encode(p),
            Self::BatchTimeout(p) => encoding::encode(p),
            Self::ConsensusType(p) => encoding::encode(p),
            Self::ChannelRestrictions(p) => encoding::encode(p),
            Self::KafkaBrokers(p) => encoding::encode(p),
            Self::AnchorPeers(p) => encoding::encode(p),
            Self::Endpoints(p) | Self::OrdererAddresses(p) => encoding::encode(p),
            Self::Acls(p) => encoding::encode(p),
            Self::Capabilities(p) => encoding::encode(p),
            Self::Consortium(p) => encoding::encode(p),
            Self::HashingAlgorithm(p) => encoding::encode(p),
            Self::BlockDataHashingStructure(p) => encoding::encode(p),
            Self::Msp(msp) => {
                msp.validate()?;
                encoding::encode(msp.as_ref())
            }
            Self::ChannelCreationPolicy(p) => encoding::encode(p),
        }
    }

    /// Decode `bytes` as a payload of `kind`. Empty bytes are a placeholder
    /// and decode to `None`.
    pub fn decode(kind: ValueKind, bytes: &[u8]) -> Result<Option<Self>> {
        if bytes.is_empty() {
            return Ok(None);
        }
        let payload = match kind {
            ValueKind::BatchSize => Self::BatchSize(encoding::decode(bytes)?),
            ValueKind::BatchTimeout => Self::BatchTimeout(encoding::decode(bytes)?),
            ValueKind::ConsensusType => Self::ConsensusType(encoding::decode(bytes)?),
            ValueKind::ChannelRestrictions => Self::ChannelRestrictions(encoding::decode(bytes)?),
            ValueKind::KafkaBrokers => Self::KafkaBrokers(encoding::decode(bytes)?),
            ValueKind::AnchorPeers => Self::AnchorPeers(encoding::decode(bytes)?),
            ValueKind::Endpoints => Self::Endpoints(encoding::decode(bytes)?),
            ValueKind::OrdererAddresses => Self::OrdererAddresses(encoding::decode(bytes)?),
            ValueKind::Acls => Self::Acls(encoding::decode(bytes)?),
            ValueKind::Capabilities => Self::Capabilities(encoding::decode(bytes)?),
            ValueKind::Consortium => Self::Consortium(encoding::decode(bytes)?),
            ValueKind::HashingAlgorithm => Self::HashingAlgorithm(encoding::decode(bytes)?),
            ValueKind::BlockDataHashingStructure => {
                Self::BlockDataHashingStructure(encoding::decode(bytes)?)
            }
            ValueKind::Msp => Self::Msp(Box::new(encoding::decode(bytes)?)),
            ValueKind::ChannelCreationPolicy => Self::ChannelCreationPolicy(encoding::decode(bytes)?),
        };
        Ok(Some(payload))
    }

    /// JSON rendering of the payload.
    pub fn to_json(&self) -> Result<Value> {
        let value = match self {
            Self::BatchSize(p) => serde_json::to_value(p)?,
            Self::BatchTimeout(p) => serde_json::to_value(p)?,
            Self::ConsensusType(p) => json!({
                "type": p.consensus_type,
                "metadata": if p.metadata.is_empty() {
                    Value::Null
                } else {
                    Value::String(hex::encode(&p.metadata))
                },
                "state": p.state,
            }),
            Self::ChannelRestrictions(p) => json!({ "max_count": p.max_count.to_string() }),
            Self::KafkaBrokers(p) => serde_json::to_value(p)?,
            Self::AnchorPeers(p) => serde_json::to_value(p)?,
            Self::Endpoints(p) | Self::OrdererAddresses(p) => serde_json::to_value(p)?,
            Self::Acls(p) => serde_json::to_value(p)?,
            Self::Capabilities(p) => serde_json::to_value(p)?,
            Self::Consortium(p) => serde_json::to_value(p)?,
            Self::HashingAlgorithm(p) => serde_json::to_value(p)?,
            Self::BlockDataHashingStructure(p) => serde_json::to_value(p)?,
            Self::Msp(msp) => serde_json::to_value(msp.as_ref())?,
            Self::ChannelCreationPolicy(policy) => policy.to_json(),
        };
        Ok(value)
    }
}

/// Checked accessors used by the Mutation API.
macro_rules! payload_accessor {
    ($($fn_name:ident => $variant:ident($ty:ty)),* $(,)?) => {
        impl ValuePayload {
            $(
                pub fn $fn_name(self) -> Result<$ty> {
                    match self {
                        Self::$variant(inner) => Ok(inner),
                        other => Err(Error::Validation(format!(
                            "expected {} payload, found {}",
                            ValueKind::$variant,
                            other.kind()
                        ))),
                    }
                }
            )*
        }
    };
}

payload_accessor! {
    into_batch_size => BatchSize(BatchSize),
    into_batch_timeout => BatchTimeout(BatchTimeout),
    into_consensus_type => ConsensusType(ConsensusType),
    into_channel_restrictions => ChannelRestrictions(ChannelRestrictions),
    into_kafka_brokers => KafkaBrokers(KafkaBrokers),
    into_anchor_peers => AnchorPeers(AnchorPeers),
    into_endpoints => Endpoints(OrdererAddresses),
    into_orderer_addresses => OrdererAddresses(OrdererAddresses),
    into_acls => Acls(Acls),
    into_capabilities => Capabilities(Capabilities),
    into_consortium => Consortium(Consortium),
    into_msp => Msp(Box<Msp>),
    into_channel_creation_policy => ChannelCreationPolicy(Policy),
}
