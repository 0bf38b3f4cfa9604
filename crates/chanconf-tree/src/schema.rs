//! Well-known keys and the schema registry.
//!
//! Every value in a channel config is identified by its key, but the meaning
//! of a key depends on where in the tree it sits: `MSP` under an application
//! org and `MSP` under an orderer org carry the same payload, while
//! `Capabilities` exists at three different levels. The registry maps a
//! `(Scope, key)` pair to the [`ValueKind`] of the payload stored there.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Name of the root group.
pub const CHANNEL_GROUP_KEY: &str = "Channel";

// Group keys
pub const ORDERER_GROUP_KEY: &str = "Orderer";
pub const APPLICATION_GROUP_KEY: &str = "Application";
pub const CONSORTIUMS_GROUP_KEY: &str = "Consortiums";

// Policy keys
pub const ADMINS_POLICY_KEY: &str = "Admins";
pub const READERS_POLICY_KEY: &str = "Readers";
pub const WRITERS_POLICY_KEY: &str = "Writers";
pub const ENDORSEMENT_POLICY_KEY: &str = "Endorsement";
pub const LIFECYCLE_ENDORSEMENT_POLICY_KEY: &str = "LifecycleEndorsement";
pub const BLOCK_VALIDATION_POLICY_KEY: &str = "BlockValidation";

// Value keys
pub const CONSORTIUM_KEY: &str = "Consortium";
pub const ORDERER_ADDRESSES_KEY: &str = "OrdererAddresses";
pub const HASHING_ALGORITHM_KEY: &str = "HashingAlgorithm";
pub const BLOCK_DATA_HASHING_STRUCTURE_KEY: &str = "BlockDataHashingStructure";
pub const CAPABILITIES_KEY: &str = "Capabilities";
pub const CONSENSUS_TYPE_KEY: &str = "ConsensusType";
pub const BATCH_SIZE_KEY: &str = "BatchSize";
pub const BATCH_TIMEOUT_KEY: &str = "BatchTimeout";
pub const CHANNEL_RESTRICTIONS_KEY: &str = "ChannelRestrictions";
pub const KAFKA_BROKERS_KEY: &str = "KafkaBrokers";
pub const ACLS_KEY: &str = "ACLs";
pub const MSP_KEY: &str = "MSP";
pub const ANCHOR_PEERS_KEY: &str = "AnchorPeers";
pub const ENDPOINTS_KEY: &str = "Endpoints";
pub const CHANNEL_CREATION_POLICY_KEY: &str = "ChannelCreationPolicy";

/// Mod policy of orderer-controlled consortium entries.
pub const ORDERER_ADMINS_POLICY: &str = "/Channel/Orderer/Admins";

/// Position of a group in the channel hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Scope {
    Channel,
    Orderer,
    Application,
    Consortiums,
    Consortium,
    OrdererOrg,
    ApplicationOrg,
    ConsortiumOrg,
}

impl Scope {
    /// Scope of the group at `path` (group names below the root group).
    ///
    /// Returns `None` for paths outside the known hierarchy.
    pub fn of<S: AsRef<str>>(path: &[S]) -> Option<Self> {
        let names: Vec<&str> = path.iter().map(AsRef::as_ref).collect();
        match names.as_slice() {
            [] => Some(Self::Channel),
            [ORDERER_GROUP_KEY] => Some(Self::Orderer),
            [ORDERER_GROUP_KEY, _] => Some(Self::OrdererOrg),
            [APPLICATION_GROUP_KEY] => Some(Self::Application),
            [APPLICATION_GROUP_KEY, _] => Some(Self::ApplicationOrg),
            [CONSORTIUMS_GROUP_KEY] => Some(Self::Consortiums),
            [CONSORTIUMS_GROUP_KEY, _] => Some(Self::Consortium),
            [CONSORTIUMS_GROUP_KEY, _, _] => Some(Self::ConsortiumOrg),
            _ => None,
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// The closed set of payload kinds a config value can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ValueKind {
    BatchSize,
    BatchTimeout,
    ConsensusType,
    ChannelRestrictions,
    KafkaBrokers,
    AnchorPeers,
    Endpoints,
    OrdererAddresses,
    Acls,
    Capabilities,
    Consortium,
    HashingAlgorithm,
    BlockDataHashingStructure,
    Msp,
    ChannelCreationPolicy,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

static REGISTRY: Lazy<BTreeMap<(Scope, &'static str), ValueKind>> = Lazy::new(|| {
    use Scope::*;
    [
        (Channel, CONSORTIUM_KEY, ValueKind::Consortium),
        (Channel, ORDERER_ADDRESSES_KEY, ValueKind::OrdererAddresses),
        (Channel, HASHING_ALGORITHM_KEY, ValueKind::HashingAlgorithm),
        (Channel, BLOCK_DATA_HASHING_STRUCTURE_KEY, ValueKind::BlockDataHashingStructure),
        (Channel, CAPABILITIES_KEY, ValueKind::Capabilities),
        (Orderer, CONSENSUS_TYPE_KEY, ValueKind::ConsensusType),
        (Orderer, BATCH_SIZE_KEY, ValueKind::BatchSize),
        (Orderer, BATCH_TIMEOUT_KEY, ValueKind::BatchTimeout),
        (Orderer, CHANNEL_RESTRICTIONS_KEY, ValueKind::ChannelRestrictions),
        (Orderer, KAFKA_BROKERS_KEY, ValueKind::KafkaBrokers),
        (Orderer, CAPABILITIES_KEY, ValueKind::Capabilities),
        (Application, ACLS_KEY, ValueKind::Acls),
        (Application, CAPABILITIES_KEY, ValueKind::Capabilities),
        (ApplicationOrg, MSP_KEY, ValueKind::Msp),
        (ApplicationOrg, ANCHOR_PEERS_KEY, ValueKind::AnchorPeers),
        (OrdererOrg, MSP_KEY, ValueKind::Msp),
        (OrdererOrg, ENDPOINTS_KEY, ValueKind::Endpoints),
        (Consortium, CHANNEL_CREATION_POLICY_KEY, ValueKind::ChannelCreationPolicy),
        (ConsortiumOrg, MSP_KEY, ValueKind::Msp),
    ]
    .into_iter()
    .map(|(scope, key, kind)| ((scope, key), kind))
    .collect()
});

/// Payload kind registered for `key` in `scope`.
pub fn value_kind(scope: Scope, key: &str) -> Option<ValueKind> {
    REGISTRY.get(&(scope, key)).copied()
}

/// Keys registered for `scope`, in ascending order.
pub fn value_keys(scope: Scope) -> impl Iterator<Item = &'static str> {
    REGISTRY
        .keys()
        .filter(move |(s, _)| *s == scope)
        .map(|(_, key)| *key)
}
