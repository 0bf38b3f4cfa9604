//! Restamp a working tree with the versions its diff would commit.

use crate::leaf::Leaf;
use crate::path::{is_replaced, replaced_under, EntryKind, Replacements};
use chanconf_tree::ConfigGroup;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Set every version in `working` to the version it will have once the
/// update computed against `base` is committed.
///
/// Unchanged entries keep the base version, changed leaves get base + 1,
/// added or replaced subtrees get 0, and groups get base + 1 only when
/// their own entry changed. Subtrees still shared with `base` are skipped.
pub fn stamp_versions(base: &ConfigGroup, working: &mut ConfigGroup, replaced: &Replacements) {
    stamp_group(&mut Vec::new(), base, working, replaced);
}

fn stamp_group(
    path: &mut Vec<String>,
    base: &ConfigGroup,
    working: &mut ConfigGroup,
    replaced: &Replacements,
) {
    let mut members_changed = !base.groups.keys().eq(working.groups.keys());
    members_changed |= stamp_leaves(path, &base.values, &mut working.values, replaced);
    members_changed |= stamp_leaves(path, &base.policies, &mut working.policies, replaced);

    for (name, child) in working.groups.iter_mut() {
        match base.groups.get(name) {
            Some(_) if is_replaced(replaced, path, EntryKind::Group, name) => {
                members_changed = true;
                Arc::make_mut(child).zero_versions();
            }
            Some(original) => {
                if Arc::ptr_eq(original, child) && !replaced_under(replaced, path, name) {
                    continue;
                }
                path.push(name.clone());
                stamp_group(path, original, Arc::make_mut(child), replaced);
                path.pop();
            }
            None => Arc::make_mut(child).zero_versions(),
        }
    }

    let own_change = members_changed || base.mod_policy != working.mod_policy;
    working.version = base.version + u64::from(own_change);
}

/// Stamp one leaf map; returns whether its membership changed.
fn stamp_leaves<L: Leaf>(
    path: &[String],
    base: &BTreeMap<String, L>,
    working: &mut BTreeMap<String, L>,
    replaced: &Replacements,
) -> bool {
    let mut members_changed = !base.keys().eq(working.keys());

    for (key, leaf) in working.iter_mut() {
        let version = match base.get(key) {
            Some(_) if is_replaced(replaced, path, L::KIND, key) => {
                members_changed = true;
                0
            }
            Some(original) if original.same_content(leaf) => original.version(),
            Some(original) => original.version() + 1,
            None => 0,
        };
        leaf.set_version(version);
    }

    members_changed
}
