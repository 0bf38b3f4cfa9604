//! Policies an update must satisfy.
//!
//! Walks the write set against the base tree:
//! - an entry written at a version other than its base version needs the
//!   base entry's mod policy
//! - an entry missing from the base needs the mod policy of the base group
//!   that will hold it
//! - under a bumped group, an entry written at version zero that the read set
//!   does not pin was removed and re-added, and counts as an addition
//!
//! A group's mod policy resolves relative to the group itself; a value's or
//! policy's resolves relative to the group holding it.

use crate::error::Result;
use crate::resolve::PolicyPath;
use chanconf_tree::{ConfigGroup, ConfigUpdate};
use chanconf_update::group_path;
use std::collections::BTreeMap;
use tracing::warn;

/// Absolute paths of every policy `update` needs, sorted and de-duplicated.
pub fn required_policies(base: &ConfigGroup, update: &ConfigUpdate) -> Result<Vec<PolicyPath>> {
    let mut required = Required::default();
    required.walk(&mut Vec::new(), base, Some(&update.read_set), &update.write_set)?;
    Ok(required.paths.into_values().collect())
}

#[derive(Default)]
struct Required {
    paths: BTreeMap<String, PolicyPath>,
}

impl Required {
    fn walk(
        &mut self,
        path: &mut Vec<String>,
        base: &ConfigGroup,
        read: Option<&ConfigGroup>,
        write: &ConfigGroup,
    ) -> Result<()> {
        let bumped = write.version != base.version;
        if bumped {
            self.require(&base.mod_policy, path, None)?;
        }
        // A fresh entry the read set doesn't vouch for replaces whatever the
        // base holds under that key.
        let readded = |version: u64, pinned: bool| bumped && version == 0 && !pinned;

        for (key, value) in &write.values {
            let pinned = read.is_some_and(|r| r.values.contains_key(key));
            match base.values.get(key) {
                Some(_) if readded(value.version, pinned) => {
                    self.require(&base.mod_policy, path, Some(key))?
                }
                Some(original) if original.version == value.version => {}
                Some(original) => self.require(&original.mod_policy, path, Some(key))?,
                None => self.require(&base.mod_policy, path, Some(key))?,
            }
        }
        for (key, policy) in &write.policies {
            let pinned = read.is_some_and(|r| r.policies.contains_key(key));
            match base.policies.get(key) {
                Some(_) if readded(policy.version, pinned) => {
                    self.require(&base.mod_policy, path, Some(key))?
                }
                Some(original) if original.version == policy.version => {}
                Some(original) => self.require(&original.mod_policy, path, Some(key))?,
                None => self.require(&base.mod_policy, path, Some(key))?,
            }
        }

        for (name, child) in &write.groups {
            let child_read = read.and_then(|r| r.groups.get(name)).map(AsRef::as_ref);
            match base.groups.get(name) {
                Some(_) if readded(child.version, child_read.is_some()) => {
                    self.require(&base.mod_policy, path, Some(name))?
                }
                Some(original) => {
                    path.push(name.clone());
                    let walked = self.walk(path, original, child_read, child);
                    path.pop();
                    walked?;
                }
                None => self.require(&base.mod_policy, path, Some(name))?,
            }
        }
        Ok(())
    }

    /// Record `mod_policy` as resolved from the group at `owner`.
    fn require(&mut self, mod_policy: &str, owner: &[String], entry: Option<&str>) -> Result<()> {
        if mod_policy.is_empty() {
            let mut at = group_path(owner);
            if let Some(entry) = entry {
                at.push('/');
                at.push_str(entry);
            }
            warn!(entry = %at, "entry has no mod policy; nothing to require");
            return Ok(());
        }
        let resolved = PolicyPath::resolve(mod_policy, owner)?;
        self.paths.insert(resolved.to_string(), resolved);
        Ok(())
    }
}
