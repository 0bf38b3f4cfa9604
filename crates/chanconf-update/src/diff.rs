//! Compute the minimal update between two snapshots.
//!
//! The walk is per group. For every direct child:
//!
//! - only in the base: removed, emitted nowhere, marks membership changed
//! - only in the update, or replaced: added, written at version 0 (whole
//!   subtree), marks membership changed
//! - in both with equal content: remembered as a version-only pin
//! - in both, changed leaf: written at base version + 1
//! - in both, group: recursed into
//!
//! A group whose own entry changed (mod policy or membership) is written at
//! base version + 1 with its new mod policy, and every unchanged child is
//! pinned in both sets. A group that only contains changes is written at its
//! current version with an empty mod policy, and its pins are dropped.

use crate::error::{Error, Result};
use crate::leaf::Leaf;
use crate::path::{group_path, is_replaced, replaced_under, EntryKind, Replacements};
use chanconf_tree::{Config, ConfigGroup, ConfigUpdate};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info};

/// Computes [`ConfigUpdate`]s, honoring the replacements of an edit session.
#[derive(Debug, Clone, Copy)]
pub struct Differ<'a> {
    replaced: Option<&'a Replacements>,
}

struct GroupDelta {
    read: ConfigGroup,
    write: ConfigGroup,
    changed: bool,
}

/// Pins collected while walking one group.
#[derive(Default, Clone)]
struct SameSet {
    groups: BTreeMap<String, Arc<ConfigGroup>>,
    values: BTreeMap<String, chanconf_tree::ConfigValue>,
    policies: BTreeMap<String, chanconf_tree::ConfigPolicy>,
}

impl SameSet {
    fn merge_into(self, group: &mut ConfigGroup) {
        group.groups.extend(self.groups);
        group.values.extend(self.values);
        group.policies.extend(self.policies);
    }
}

static NO_REPLACEMENTS: Replacements = Replacements::new();

impl Default for Differ<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> Differ<'a> {
    pub fn new() -> Self {
        Self { replaced: None }
    }

    /// Treat every entry in `replaced` as removed and added again.
    pub fn with_replacements(replaced: &'a Replacements) -> Self {
        Self {
            replaced: Some(replaced),
        }
    }

    fn replacements(&self) -> &Replacements {
        self.replaced.unwrap_or(&NO_REPLACEMENTS)
    }

    /// Diff two snapshots of the same channel.
    pub fn compute_update(&self, base: &Config, updated: &Config) -> Result<ConfigUpdate> {
        if base.channel_id != updated.channel_id {
            return Err(Error::ChannelMismatch {
                base: base.channel_id.clone(),
                updated: updated.channel_id.clone(),
            });
        }

        let (read_set, write_set) = self.diff_groups(&base.channel_group, &updated.channel_group);
        let update = ConfigUpdate {
            channel_id: updated.channel_id.clone(),
            read_set,
            write_set,
            isolated_data: BTreeMap::new(),
        };

        info!(
            channel = %update.channel_id,
            empty = update.is_empty(),
            "computed config update"
        );
        Ok(update)
    }

    /// Diff two root groups, returning `(read_set, write_set)`.
    pub fn diff_groups(&self, base: &ConfigGroup, updated: &ConfigGroup) -> (ConfigGroup, ConfigGroup) {
        let delta = self.diff_group(&mut Vec::new(), base, updated);
        (delta.read, delta.write)
    }

    fn diff_group(&self, path: &mut Vec<String>, base: &ConfigGroup, updated: &ConfigGroup) -> GroupDelta {
        let mut read = ConfigGroup::pin(base.version);
        let mut write = ConfigGroup::pin(base.version);
        let mut same = SameSet::default();

        let mut members_changed = self.diff_leaves(
            path,
            &base.values,
            &updated.values,
            &mut write.values,
            &mut same.values,
        );
        members_changed |= self.diff_leaves(
            path,
            &base.policies,
            &updated.policies,
            &mut write.policies,
            &mut same.policies,
        );

        for (name, original) in &base.groups {
            let Some(current) = updated.groups.get(name) else {
                members_changed = true;
                continue;
            };
            if is_replaced(self.replacements(), path, EntryKind::Group, name) {
                members_changed = true;
                write.groups.insert(name.clone(), Arc::new(fresh(current)));
                continue;
            }
            if Arc::ptr_eq(original, current) && !replaced_under(self.replacements(), path, name) {
                same.groups
                    .insert(name.clone(), Arc::new(ConfigGroup::pin(original.version)));
                continue;
            }

            path.push(name.clone());
            let child = self.diff_group(path, original, current);
            path.pop();

            if child.changed {
                read.groups.insert(name.clone(), Arc::new(child.read));
                write.groups.insert(name.clone(), Arc::new(child.write));
            } else {
                same.groups.insert(name.clone(), Arc::new(child.read));
            }
        }
        for (name, current) in &updated.groups {
            if !base.groups.contains_key(name) {
                members_changed = true;
                write.groups.insert(name.clone(), Arc::new(fresh(current)));
            }
        }

        let own_change = members_changed || base.mod_policy != updated.mod_policy;
        if !own_change {
            if write.is_empty() {
                return GroupDelta {
                    read: ConfigGroup::pin(base.version),
                    write: ConfigGroup::pin(base.version),
                    changed: false,
                };
            }
            return GroupDelta {
                read,
                write,
                changed: true,
            };
        }

        debug!(
            group = %group_path(path),
            version = base.version + 1,
            "group entry changed"
        );

        same.clone().merge_into(&mut read);
        same.merge_into(&mut write);
        write.version = base.version + 1;
        write.mod_policy = updated.mod_policy.clone();

        GroupDelta {
            read,
            write,
            changed: true,
        }
    }

    /// Diff one leaf map; returns whether its membership changed.
    fn diff_leaves<L: Leaf>(
        &self,
        path: &[String],
        base: &BTreeMap<String, L>,
        updated: &BTreeMap<String, L>,
        write: &mut BTreeMap<String, L>,
        same: &mut BTreeMap<String, L>,
    ) -> bool {
        let mut members_changed = false;

        for (key, original) in base {
            let Some(current) = updated.get(key) else {
                members_changed = true;
                continue;
            };
            if is_replaced(self.replacements(), path, L::KIND, key) {
                members_changed = true;
                write.insert(key.clone(), current.with_version(0));
            } else if original.same_content(current) {
                same.insert(key.clone(), L::pin(original.version()));
            } else {
                write.insert(key.clone(), current.with_version(original.version() + 1));
            }
        }
        for (key, current) in updated {
            if !base.contains_key(key) {
                members_changed = true;
                write.insert(key.clone(), current.with_version(0));
            }
        }

        members_changed
    }
}

/// A copy of `group` with every version reset, as written for additions.
fn fresh(group: &Arc<ConfigGroup>) -> ConfigGroup {
    let mut copy = ConfigGroup::clone(group);
    copy.zero_versions();
    copy
}

/// Diff two snapshots with no replacements.
pub fn compute_update(base: &Config, updated: &Config) -> Result<ConfigUpdate> {
    Differ::new().compute_update(base, updated)
}
