//! Shared handling of values and policies.

use crate::path::EntryKind;
use chanconf_tree::{ConfigPolicy, ConfigValue};

/// A versioned leaf entry.
pub(crate) trait Leaf: Clone {
    const KIND: EntryKind;

    fn version(&self) -> u64;
    fn set_version(&mut self, version: u64);
    fn same_content(&self, other: &Self) -> bool;
    fn pin(version: u64) -> Self;

    fn with_version(&self, version: u64) -> Self {
        let mut leaf = self.clone();
        leaf.set_version(version);
        leaf
    }
}

impl Leaf for ConfigValue {
    const KIND: EntryKind = EntryKind::Value;

    fn version(&self) -> u64 {
        self.version
    }

    fn set_version(&mut self, version: u64) {
        self.version = version;
    }

    fn same_content(&self, other: &Self) -> bool {
        ConfigValue::same_content(self, other)
    }

    fn pin(version: u64) -> Self {
        ConfigValue::pin(version)
    }
}

impl Leaf for ConfigPolicy {
    const KIND: EntryKind = EntryKind::Policy;

    fn version(&self) -> u64 {
        self.version
    }

    fn set_version(&mut self, version: u64) {
        self.version = version;
    }

    fn same_content(&self, other: &Self) -> bool {
        ConfigPolicy::same_content(self, other)
    }

    fn pin(version: u64) -> Self {
        ConfigPolicy::pin(version)
    }
}
