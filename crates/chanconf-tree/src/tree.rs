//! The versioned configuration tree.
//!
//! Child groups sit behind `Arc` and are edited with `Arc::make_mut`, so a
//! working copy shares every untouched subtree with the snapshot it was
//! cloned from and the snapshot itself is never mutated.

use crate::error::{Error, Result};
use crate::payload::ValuePayload;
use crate::policy::Policy;
use crate::schema::{self, Scope};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// A group of nested groups, values and policies.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ConfigGroup {
    pub version: u64,
    /// Policy that authorizes changes to this group's own entry.
    pub mod_policy: String,
    pub groups: BTreeMap<String, Arc<ConfigGroup>>,
    pub values: BTreeMap<String, ConfigValue>,
    pub policies: BTreeMap<String, ConfigPolicy>,
}

/// An opaque, typed value. Empty bytes are a placeholder.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ConfigValue {
    pub version: u64,
    pub mod_policy: String,
    #[serde(with = "serde_bytes")]
    pub value: Vec<u8>,
}

/// A named policy. A missing body is a version-only pin.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ConfigPolicy {
    pub version: u64,
    pub mod_policy: String,
    pub policy: Option<Policy>,
}

/// A complete channel configuration snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Config {
    pub channel_id: String,
    pub sequence: u64,
    pub channel_group: ConfigGroup,
}

impl ConfigValue {
    pub fn new(mod_policy: impl Into<String>, value: Vec<u8>) -> Self {
        Self {
            version: 0,
            mod_policy: mod_policy.into(),
            value,
        }
    }

    /// A version-only entry with no content.
    pub fn pin(version: u64) -> Self {
        Self {
            version,
            ..Self::default()
        }
    }

    /// Whether mod policy and payload bytes match, ignoring version.
    pub fn same_content(&self, other: &Self) -> bool {
        self.mod_policy == other.mod_policy && self.value == other.value
    }
}

impl ConfigPolicy {
    pub fn new(mod_policy: impl Into<String>, policy: Policy) -> Self {
        Self {
            version: 0,
            mod_policy: mod_policy.into(),
            policy: Some(policy),
        }
    }

    /// A version-only entry with no policy body.
    pub fn pin(version: u64) -> Self {
        Self {
            version,
            ..Self::default()
        }
    }

    /// Whether mod policy and body match, ignoring version.
    pub fn same_content(&self, other: &Self) -> bool {
        self.mod_policy == other.mod_policy && self.policy == other.policy
    }
}

impl ConfigGroup {
    /// An empty group with the given mod policy.
    pub fn new(mod_policy: impl Into<String>) -> Self {
        Self {
            mod_policy: mod_policy.into(),
            ..Self::default()
        }
    }

    /// A version-only group with no children.
    pub fn pin(version: u64) -> Self {
        Self {
            version,
            ..Self::default()
        }
    }

    /// True when the group has no children of any kind.
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty() && self.values.is_empty() && self.policies.is_empty()
    }

    // Groups

    pub fn group(&self, name: &str) -> Result<&ConfigGroup> {
        self.groups
            .get(name)
            .map(Arc::as_ref)
            .ok_or_else(|| Error::not_found("group", name))
    }

    pub fn group_mut(&mut self, name: &str) -> Result<&mut ConfigGroup> {
        self.groups
            .get_mut(name)
            .map(Arc::make_mut)
            .ok_or_else(|| Error::not_found("group", name))
    }

    /// Walk down `path` from this group.
    pub fn descend<S: AsRef<str>>(&self, path: &[S]) -> Result<&ConfigGroup> {
        path.iter()
            .try_fold(self, |group, name| group.group(name.as_ref()))
    }

    /// Walk down `path`, unsharing each group on the way.
    pub fn descend_mut<S: AsRef<str>>(&mut self, path: &[S]) -> Result<&mut ConfigGroup> {
        path.iter()
            .try_fold(self, |group, name| group.group_mut(name.as_ref()))
    }

    pub fn insert_group(&mut self, name: &str, group: ConfigGroup) -> Result<()> {
        if self.groups.contains_key(name) {
            return Err(Error::already_exists("group", name));
        }
        self.groups.insert(name.to_string(), Arc::new(group));
        Ok(())
    }

    pub fn remove_group(&mut self, name: &str) -> Result<Arc<ConfigGroup>> {
        self.groups
            .remove(name)
            .ok_or_else(|| Error::not_found("group", name))
    }

    // Values

    pub fn value(&self, key: &str) -> Result<&ConfigValue> {
        self.values
            .get(key)
            .ok_or_else(|| Error::not_found("value", key))
    }

    /// Insert or replace a value.
    pub fn set_value(&mut self, key: &str, value: ConfigValue) {
        self.values.insert(key.to_string(), value);
    }

    pub fn remove_value(&mut self, key: &str) -> Result<ConfigValue> {
        self.values
            .remove(key)
            .ok_or_else(|| Error::not_found("value", key))
    }

    /// Decode the value at `key` using the schema registered for `scope`.
    ///
    /// `Ok(None)` means the value exists but is an empty placeholder.
    pub fn payload(&self, scope: Scope, key: &str) -> Result<Option<ValuePayload>> {
        let kind = schema::value_kind(scope, key)
            .ok_or_else(|| Error::Validation(format!("no value {key} registered in {scope} scope")))?;
        ValuePayload::decode(kind, &self.value(key)?.value)
    }

    /// Encode `payload` and store it under `key`, checking the payload kind
    /// against the schema registered for `scope`.
    pub fn set_payload(
        &mut self,
        scope: Scope,
        key: &str,
        payload: &ValuePayload,
        mod_policy: &str,
    ) -> Result<()> {
        match schema::value_kind(scope, key) {
            Some(kind) if kind == payload.kind() => {}
            Some(kind) => {
                warn!(%scope, key, expected = %kind, found = %payload.kind(), "payload kind mismatch");
                return Err(Error::Validation(format!(
                    "{key} in {scope} scope holds {kind}, not {}",
                    payload.kind()
                )));
            }
            None => {
                warn!(%scope, key, "no value registered under key");
                return Err(Error::Validation(format!(
                    "no value {key} registered in {scope} scope"
                )));
            }
        }
        debug!(%scope, key, kind = %payload.kind(), "storing payload");
        let version = self.values.get(key).map_or(0, |v| v.version);
        self.values.insert(
            key.to_string(),
            ConfigValue {
                version,
                mod_policy: mod_policy.to_string(),
                value: payload.encode()?,
            },
        );
        Ok(())
    }

    // Policies

    pub fn policy(&self, key: &str) -> Result<&ConfigPolicy> {
        self.policies
            .get(key)
            .ok_or_else(|| Error::not_found("policy", key))
    }

    pub fn insert_policy(&mut self, key: &str, policy: ConfigPolicy) -> Result<()> {
        if self.policies.contains_key(key) {
            return Err(Error::already_exists("policy", key));
        }
        self.policies.insert(key.to_string(), policy);
        Ok(())
    }

    pub fn remove_policy(&mut self, key: &str) -> Result<ConfigPolicy> {
        self.policies
            .remove(key)
            .ok_or_else(|| Error::not_found("policy", key))
    }

    /// Policy bodies of this group, skipping version-only pins.
    pub fn policy_bodies(&self) -> BTreeMap<String, Policy> {
        self.policies
            .iter()
            .filter_map(|(key, p)| p.policy.clone().map(|body| (key.clone(), body)))
            .collect()
    }

    /// Set every version in this subtree to zero.
    pub fn zero_versions(&mut self) {
        self.version = 0;
        for value in self.values.values_mut() {
            value.version = 0;
        }
        for policy in self.policies.values_mut() {
            policy.version = 0;
        }
        for group in self.groups.values_mut() {
            Arc::make_mut(group).zero_versions();
        }
    }
}

impl Config {
    pub fn new(channel_id: impl Into<String>, channel_group: ConfigGroup) -> Self {
        Self {
            channel_id: channel_id.into(),
            sequence: 0,
            channel_group,
        }
    }

    /// Canonical bytes of the whole snapshot.
    pub fn encode(&self) -> Result<Vec<u8>> {
        crate::encoding::encode(self)
    }

    pub fn decode(bytes: &[u8]) -> Result<Self> {
        crate::encoding::decode(bytes)
    }
}
