//! Apply an update onto a base snapshot.
//!
//! This is a local verification helper: it checks the read set against the
//! base (optimistic concurrency) and the write set against the version
//! rules, then builds the tree the update describes. It never touches
//! ledger state.

use crate::error::{Error, Result};
use crate::leaf::Leaf;
use crate::path::group_path;
use chanconf_tree::{Config, ConfigGroup, ConfigUpdate};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// Apply `update` to `base`, returning the next config (sequence + 1).
pub fn apply_update(base: &Config, update: &ConfigUpdate) -> Result<Config> {
    if !base.channel_id.is_empty() && base.channel_id != update.channel_id {
        return Err(Error::ChannelMismatch {
            base: base.channel_id.clone(),
            updated: update.channel_id.clone(),
        });
    }

    let mut path = Vec::new();
    if let Err(err) = check_read_set(&mut path, &base.channel_group, &update.read_set) {
        warn!(channel = %update.channel_id, error = %err, "rejected stale config update");
        return Err(err);
    }
    let channel_group = apply_group(
        &mut path,
        &base.channel_group,
        Some(&update.read_set),
        &update.write_set,
    )?;

    debug!(channel = %update.channel_id, sequence = base.sequence + 1, "applied config update");
    Ok(Config {
        channel_id: update.channel_id.clone(),
        sequence: base.sequence + 1,
        channel_group,
    })
}

fn conflict(path: &[String], name: Option<&str>, reason: String) -> Error {
    let mut at = group_path(path);
    if let Some(name) = name {
        at.push('/');
        at.push_str(name);
    }
    Error::VersionConflict { path: at, reason }
}

fn invalid(path: &[String], name: Option<&str>, reason: impl Into<String>) -> Error {
    let mut at = group_path(path);
    if let Some(name) = name {
        at.push('/');
        at.push_str(name);
    }
    Error::Validation {
        path: at,
        reason: reason.into(),
    }
}

/// Every entry in the read set must exist in the base at the same version.
fn check_read_set(path: &mut Vec<String>, base: &ConfigGroup, read: &ConfigGroup) -> Result<()> {
    if read.version != base.version {
        return Err(conflict(
            path,
            None,
            format!("read version {}, current version {}", read.version, base.version),
        ));
    }
    check_read_leaves(path, &base.values, &read.values)?;
    check_read_leaves(path, &base.policies, &read.policies)?;

    for (name, child) in &read.groups {
        let original = base
            .groups
            .get(name)
            .ok_or_else(|| conflict(path, Some(name), "group not in current config".to_string()))?;
        path.push(name.clone());
        let checked = check_read_set(path, original, child);
        path.pop();
        checked?;
    }
    Ok(())
}

fn check_read_leaves<L: Leaf>(
    path: &[String],
    base: &BTreeMap<String, L>,
    read: &BTreeMap<String, L>,
) -> Result<()> {
    for (key, pinned) in read {
        let original = base
            .get(key)
            .ok_or_else(|| conflict(path, Some(key), "entry not in current config".to_string()))?;
        if original.version() != pinned.version() {
            return Err(conflict(
                path,
                Some(key),
                format!(
                    "read version {}, current version {}",
                    pinned.version(),
                    original.version()
                ),
            ));
        }
    }
    Ok(())
}

fn apply_group(
    path: &mut Vec<String>,
    base: &ConfigGroup,
    read: Option<&ConfigGroup>,
    write: &ConfigGroup,
) -> Result<ConfigGroup> {
    let bumped = if write.version == base.version + 1 {
        true
    } else if write.version == base.version {
        false
    } else {
        return Err(invalid(
            path,
            None,
            format!(
                "group written at version {}, current version is {}",
                write.version, base.version
            ),
        ));
    };

    let mut result = if bumped {
        ConfigGroup {
            version: write.version,
            mod_policy: write.mod_policy.clone(),
            ..ConfigGroup::default()
        }
    } else {
        base.clone()
    };

    apply_leaves(
        path,
        bumped,
        &base.values,
        read.map(|r| &r.values),
        &write.values,
        &mut result.values,
    )?;
    apply_leaves(
        path,
        bumped,
        &base.policies,
        read.map(|r| &r.policies),
        &write.policies,
        &mut result.policies,
    )?;

    for (name, written) in &write.groups {
        let original = base.groups.get(name);
        let pinned = read.and_then(|r| r.groups.get(name));
        let child = match (original, pinned) {
            (Some(original), Some(pinned)) => {
                path.push(name.clone());
                let applied = apply_group(path, original, Some(pinned), written);
                path.pop();
                applied?
            }
            (_, None) if bumped && written.version == 0 => ConfigGroup::clone(written),
            (Some(_), None) => {
                return Err(invalid(path, Some(name), "group written without a read-set entry"))
            }
            (None, _) => {
                return Err(invalid(
                    path,
                    Some(name),
                    "group added without bumping its parent",
                ))
            }
        };
        result.groups.insert(name.clone(), Arc::new(child));
    }

    Ok(result)
}

fn apply_leaves<L: Leaf>(
    path: &[String],
    bumped: bool,
    base: &BTreeMap<String, L>,
    read: Option<&BTreeMap<String, L>>,
    write: &BTreeMap<String, L>,
    result: &mut BTreeMap<String, L>,
) -> Result<()> {
    for (key, written) in write {
        let original = base.get(key);
        let pinned = read.and_then(|r| r.get(key));
        let leaf = match (original, pinned) {
            (Some(original), Some(pinned)) if pinned.version() == written.version() => {
                original.clone()
            }
            (Some(original), _) if written.version() == original.version() + 1 => written.clone(),
            (_, None) if bumped && written.version() == 0 => written.clone(),
            (Some(original), _) => {
                return Err(invalid(
                    path,
                    Some(key),
                    format!(
                        "written at version {}, current version is {}",
                        written.version(),
                        original.version()
                    ),
                ))
            }
            (None, _) if !bumped => {
                return Err(invalid(path, Some(key), "entry added without bumping its group"))
            }
            (None, _) => {
                return Err(invalid(
                    path,
                    Some(key),
                    format!("new entry written at version {}", written.version()),
                ))
            }
        };
        result.insert(key.clone(), leaf);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::compute_update;
    use chanconf_tree::{ConfigPolicy, ConfigValue, Policy};

    fn base() -> Config {
        let mut org = ConfigGroup::new("Admins");
        org.version = 2;
        org.values.insert(
            "MSP".into(),
            ConfigValue {
                version: 1,
                ..ConfigValue::new("Admins", b"msp".to_vec())
            },
        );
        org.policies.insert(
            "Admins".into(),
            ConfigPolicy::new("Admins", Policy::implicit_meta("MAJORITY Admins").unwrap()),
        );
        let mut application = ConfigGroup::new("Admins");
        application.insert_group("Org1", org).unwrap();

        let mut root = ConfigGroup::new("Admins");
        root.insert_group("Application", application).unwrap();
        Config::new("mychannel", root)
    }

    #[test]
    fn applies_leaf_change() {
        let base = base();
        let mut updated = base.clone();
        updated
            .channel_group
            .descend_mut(&["Application", "Org1"])
            .unwrap()
            .set_value("MSP", ConfigValue::new("Admins", b"msp2".to_vec()));

        let update = compute_update(&base, &updated).unwrap();
        let next = apply_update(&base, &update).unwrap();

        let msp = next.channel_group.descend(&["Application", "Org1"]).unwrap().value("MSP").unwrap();
        assert_eq!(msp.version, 2);
        assert_eq!(msp.value, b"msp2");
        assert_eq!(next.sequence, 1);
    }

    #[test]
    fn stale_read_set_conflicts() {
        let base = base();
        let mut updated = base.clone();
        updated
            .channel_group
            .descend_mut(&["Application", "Org1"])
            .unwrap()
            .remove_value("MSP")
            .unwrap();
        let update = compute_update(&base, &updated).unwrap();

        // someone else committed a change to Org1 meanwhile
        let mut moved_on = base.clone();
        moved_on
            .channel_group
            .descend_mut(&["Application", "Org1"])
            .unwrap()
            .version = 3;

        assert!(matches!(
            apply_update(&moved_on, &update),
            Err(Error::VersionConflict { .. })
        ));
    }

    #[test]
    fn bad_write_version_rejected() {
        let base = base();
        let mut update = ConfigUpdate {
            channel_id: "mychannel".into(),
            read_set: ConfigGroup::pin(0),
            write_set: ConfigGroup::pin(0),
            ..ConfigUpdate::default()
        };
        let mut application = ConfigGroup::pin(0);
        let mut org = ConfigGroup::pin(2);
        org.values.insert(
            "MSP".into(),
            ConfigValue {
                version: 5,
                ..ConfigValue::new("Admins", b"x".to_vec())
            },
        );
        application.groups.insert("Org1".into(), Arc::new(org.clone()));
        update.write_set.groups.insert("Application".into(), Arc::new(application.clone()));
        org.values.clear();
        let mut read_app = ConfigGroup::pin(0);
        read_app.groups.insert("Org1".into(), Arc::new(org));
        update.read_set.groups.insert("Application".into(), Arc::new(read_app));

        assert!(matches!(
            apply_update(&base, &update),
            Err(Error::Validation { .. })
        ));
    }

    #[test]
    fn addition_without_bump_rejected() {
        let base = base();
        let mut update = ConfigUpdate {
            channel_id: "mychannel".into(),
            ..ConfigUpdate::default()
        };
        update
            .write_set
            .values
            .insert("Consortium".into(), ConfigValue::new("", b"c".to_vec()));

        assert!(matches!(
            apply_update(&base, &update),
            Err(Error::Validation { .. })
        ));
    }

    #[test]
    fn wrong_channel_rejected() {
        let base = base();
        let update = ConfigUpdate {
            channel_id: "elsewhere".into(),
            ..ConfigUpdate::default()
        };
        assert!(matches!(
            apply_update(&base, &update),
            Err(Error::ChannelMismatch { .. })
        ));
    }
}
