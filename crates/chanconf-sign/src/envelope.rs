//! Signature and envelope messages.
//!
//! Nested messages travel as canonical bytes, so what a signer signed is
//! exactly what a verifier decodes:
//!
//! ```text
//! Envelope { payload: bytes(Payload), signature }
//!   Payload { header, data: bytes(ConfigUpdateEnvelope) }
//!     Header { channel_header: bytes(ChannelHeader), signature_header: bytes(SignatureHeader) }
//!     ConfigUpdateEnvelope { config_update: bytes(ConfigUpdate), signatures }
//!       ConfigSignature { signature_header: bytes(SignatureHeader), signature }
//! ```

use crate::error::Result;
use chanconf_tree::{encoding, ConfigUpdate};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::debug;

/// An MSP-qualified identity: the MSP id and the PEM certificate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializedIdentity {
    pub mspid: String,
    #[serde(with = "serde_bytes")]
    pub id_bytes: Vec<u8>,
}

/// Who signed, plus a fresh nonce.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignatureHeader {
    /// Encoded [`SerializedIdentity`].
    #[serde(with = "serde_bytes")]
    pub creator: Vec<u8>,
    #[serde(with = "serde_bytes")]
    pub nonce: Vec<u8>,
}

/// One signature over `signature_header || config_update`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigSignature {
    #[serde(with = "serde_bytes")]
    pub signature_header: Vec<u8>,
    #[serde(with = "serde_bytes")]
    pub signature: Vec<u8>,
}

/// An encoded update with the signatures collected for it.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ConfigUpdateEnvelope {
    #[serde(with = "serde_bytes")]
    pub config_update: Vec<u8>,
    pub signatures: Vec<ConfigSignature>,
}

/// Transaction type carried in a channel header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HeaderType {
    Config,
    ConfigUpdate,
}

/// Seconds and nanoseconds since the Unix epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Timestamp {
    pub seconds: i64,
    pub nanos: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelHeader {
    pub header_type: HeaderType,
    pub version: i32,
    pub timestamp: Timestamp,
    pub channel_id: String,
    /// Hex digest of `nonce || creator`; empty on unsigned envelopes.
    pub tx_id: String,
    pub epoch: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    #[serde(with = "serde_bytes")]
    pub channel_header: Vec<u8>,
    #[serde(with = "serde_bytes")]
    pub signature_header: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payload {
    pub header: Header,
    #[serde(with = "serde_bytes")]
    pub data: Vec<u8>,
}

/// A transaction as submitted to the ordering service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    #[serde(with = "serde_bytes")]
    pub payload: Vec<u8>,
    #[serde(with = "serde_bytes")]
    pub signature: Vec<u8>,
}

impl Timestamp {
    pub fn now() -> Self {
        let since_epoch = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default();
        Self {
            seconds: since_epoch.as_secs() as i64,
            nanos: since_epoch.subsec_nanos() as i32,
        }
    }
}

impl SerializedIdentity {
    pub fn encode(&self) -> Result<Vec<u8>> {
        Ok(encoding::encode(self)?)
    }

    pub fn decode(bytes: &[u8]) -> Result<Self> {
        Ok(encoding::decode(bytes)?)
    }
}

impl SignatureHeader {
    pub fn encode(&self) -> Result<Vec<u8>> {
        Ok(encoding::encode(self)?)
    }

    pub fn decode(bytes: &[u8]) -> Result<Self> {
        Ok(encoding::decode(bytes)?)
    }

    /// Transaction id derived from this header: hex blake3 of nonce then creator.
    pub fn tx_id(&self) -> String {
        let mut hasher = blake3::Hasher::new();
        hasher.update(&self.nonce);
        hasher.update(&self.creator);
        hex::encode(hasher.finalize().as_bytes())
    }
}

impl ConfigUpdateEnvelope {
    /// Wrap `update` with no signatures yet.
    pub fn new(update: &ConfigUpdate) -> Result<Self> {
        Ok(Self {
            config_update: update.encode()?,
            signatures: Vec::new(),
        })
    }

    /// Append signatures in arrival order.
    pub fn append_signatures(&mut self, signatures: impl IntoIterator<Item = ConfigSignature>) {
        let before = self.signatures.len();
        self.signatures.extend(signatures);
        debug!(
            added = self.signatures.len() - before,
            total = self.signatures.len(),
            "collected config signatures"
        );
    }

    /// Decode the wrapped update.
    pub fn config_update(&self) -> Result<ConfigUpdate> {
        Ok(ConfigUpdate::decode(&self.config_update)?)
    }

    pub fn encode(&self) -> Result<Vec<u8>> {
        Ok(encoding::encode(self)?)
    }

    pub fn decode(bytes: &[u8]) -> Result<Self> {
        Ok(encoding::decode(bytes)?)
    }
}

impl ChannelHeader {
    /// A `ConfigUpdate` header stamped with the current time.
    pub fn config_update(channel_id: impl Into<String>, tx_id: String, epoch: u64) -> Self {
        Self {
            header_type: HeaderType::ConfigUpdate,
            version: 0,
            timestamp: Timestamp::now(),
            channel_id: channel_id.into(),
            tx_id,
            epoch,
        }
    }

    pub fn encode(&self) -> Result<Vec<u8>> {
        Ok(encoding::encode(self)?)
    }

    pub fn decode(bytes: &[u8]) -> Result<Self> {
        Ok(encoding::decode(bytes)?)
    }
}

impl Payload {
    pub fn encode(&self) -> Result<Vec<u8>> {
        Ok(encoding::encode(self)?)
    }

    pub fn decode(bytes: &[u8]) -> Result<Self> {
        Ok(encoding::decode(bytes)?)
    }

    pub fn channel_header(&self) -> Result<ChannelHeader> {
        ChannelHeader::decode(&self.header.channel_header)
    }

    /// The wrapped update envelope.
    pub fn config_update_envelope(&self) -> Result<ConfigUpdateEnvelope> {
        ConfigUpdateEnvelope::decode(&self.data)
    }
}

impl Envelope {
    /// An envelope with no submitter signature, as handed to signers for
    /// collection.
    pub fn unsigned(
        update_envelope: &ConfigUpdateEnvelope,
        channel_id: &str,
        epoch: u64,
    ) -> Result<Self> {
        let channel_header = ChannelHeader::config_update(channel_id, String::new(), epoch);
        let payload = Payload {
            header: Header {
                channel_header: channel_header.encode()?,
                signature_header: Vec::new(),
            },
            data: update_envelope.encode()?,
        };
        Ok(Self {
            payload: payload.encode()?,
            signature: Vec::new(),
        })
    }

    pub fn payload(&self) -> Result<Payload> {
        Payload::decode(&self.payload)
    }

    pub fn is_signed(&self) -> bool {
        !self.signature.is_empty()
    }

    pub fn encode(&self) -> Result<Vec<u8>> {
        Ok(encoding::encode(self)?)
    }

    pub fn decode(bytes: &[u8]) -> Result<Self> {
        Ok(encoding::decode(bytes)?)
    }
}
