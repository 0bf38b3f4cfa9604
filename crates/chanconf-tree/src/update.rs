use crate::encoding;
use crate::error::Result;
use crate::tree::ConfigGroup;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A proposed configuration change.
///
/// The read set pins the versions the change was computed against; the
/// write set carries the new or modified entries. Every changed entry in the
/// write set has all of its ancestor groups present in one of the two sets.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ConfigUpdate {
    pub channel_id: String,
    pub read_set: ConfigGroup,
    pub write_set: ConfigGroup,
    /// Opaque per-extension data; always empty when produced by a diff.
    pub isolated_data: BTreeMap<String, serde_bytes::ByteBuf>,
}

impl ConfigUpdate {
    /// Canonical bytes; this is what signers sign.
    pub fn encode(&self) -> Result<Vec<u8>> {
        encoding::encode(self)
    }

    pub fn decode(bytes: &[u8]) -> Result<Self> {
        encoding::decode(bytes)
    }

    /// True when the update changes nothing.
    pub fn is_empty(&self) -> bool {
        self.read_set.is_empty()
            && self.write_set.is_empty()
            && self.read_set.version == self.write_set.version
    }
}
