//! Update Law Property Tests
//!
//! Random edit sequences against a fixture whose entries sit at nonzero
//! versions, checking that:
//!
//! - applying the computed update rebuilds exactly the stamped working tree
//! - versions already present in the edited tree do not affect the diff
//! - undoing every edit gives a vacuous update

use chanconf_tree::{Config, ConfigGroup, ConfigPolicy, ConfigValue, Policy};
use chanconf_update::{apply_update, compute_update, stamp_versions, Replacements};
use proptest::prelude::*;

const ORGS: [&str; 4] = ["Org1", "Org2", "Org3", "Org4"];
const KEYS: [&str; 3] = ["MSP", "AnchorPeers", "Extra"];

#[derive(Debug, Clone)]
enum Edit {
    SetValue { org: usize, key: usize, byte: u8 },
    RemoveValue { org: usize, key: usize },
    SetPolicy { org: usize, any: bool },
    SetModPolicy { org: usize, writers: bool },
    AddOrg { org: usize },
    RemoveOrg { org: usize },
}

fn arb_edit() -> impl Strategy<Value = Edit> {
    prop_oneof![
        (0usize..4, 0usize..3, any::<u8>())
            .prop_map(|(org, key, byte)| Edit::SetValue { org, key, byte }),
        (0usize..4, 0usize..3).prop_map(|(org, key)| Edit::RemoveValue { org, key }),
        (0usize..4, any::<bool>()).prop_map(|(org, any)| Edit::SetPolicy { org, any }),
        (0usize..4, any::<bool>()).prop_map(|(org, writers)| Edit::SetModPolicy { org, writers }),
        (0usize..4).prop_map(|org| Edit::AddOrg { org }),
        (0usize..4).prop_map(|org| Edit::RemoveOrg { org }),
    ]
}

/// Channel v1 -> Application v5 -> Org1 v3, Org2 v2 (Org3 and Org4 absent).
fn fixture() -> Config {
    let mut application = ConfigGroup::new("Admins");
    application.version = 5;
    application.values.insert(
        "ACLs".into(),
        ConfigValue {
            version: 4,
            ..ConfigValue::new("Admins", b"acls".to_vec())
        },
    );

    for (i, name) in ORGS.iter().take(2).enumerate() {
        let mut org = ConfigGroup::new("Admins");
        org.version = 3 - i as u64;
        org.values.insert(
            "MSP".into(),
            ConfigValue {
                version: 7,
                ..ConfigValue::new("Admins", name.as_bytes().to_vec())
            },
        );
        org.policies.insert(
            "Admins".into(),
            ConfigPolicy {
                version: 2,
                ..ConfigPolicy::new("Admins", Policy::implicit_meta("MAJORITY Admins").unwrap())
            },
        );
        application.insert_group(name, org).unwrap();
    }

    let mut root = ConfigGroup::new("Admins");
    root.version = 1;
    root.insert_group("Application", application).unwrap();
    let mut config = Config::new("mychannel", root);
    config.sequence = 9;
    config
}

fn apply_edit(root: &mut ConfigGroup, edit: &Edit) {
    let Ok(application) = root.group_mut("Application") else {
        return;
    };
    match *edit {
        Edit::SetValue { org, key, byte } => {
            if let Ok(org) = application.group_mut(ORGS[org]) {
                org.set_value(KEYS[key], ConfigValue::new("Admins", vec![byte]));
            }
        }
        Edit::RemoveValue { org, key } => {
            if let Ok(org) = application.group_mut(ORGS[org]) {
                let _ = org.remove_value(KEYS[key]);
            }
        }
        Edit::SetPolicy { org, any } => {
            if let Ok(org) = application.group_mut(ORGS[org]) {
                let rule = if any { "ANY Admins" } else { "MAJORITY Admins" };
                org.policies.insert(
                    "Admins".into(),
                    ConfigPolicy::new("Admins", Policy::implicit_meta(rule).unwrap()),
                );
            }
        }
        Edit::SetModPolicy { org, writers } => {
            if let Ok(org) = application.group_mut(ORGS[org]) {
                org.mod_policy = if writers { "Writers" } else { "Admins" }.into();
            }
        }
        Edit::AddOrg { org } => {
            let mut group = ConfigGroup::new("Admins");
            group.version = 11;
            group.set_value("MSP", ConfigValue::new("Admins", ORGS[org].as_bytes().to_vec()));
            let _ = application.insert_group(ORGS[org], group);
        }
        Edit::RemoveOrg { org } => {
            let _ = application.remove_group(ORGS[org]);
        }
    }
}

proptest! {
    /// Property: apply(base, diff(base, edited)) equals the stamped edit.
    #[test]
    fn prop_apply_rebuilds_stamped_tree(edits in prop::collection::vec(arb_edit(), 0..12)) {
        let base = fixture();
        let mut edited = base.clone();
        for edit in &edits {
            apply_edit(&mut edited.channel_group, edit);
        }

        let update = compute_update(&base, &edited).unwrap();
        let committed = apply_update(&base, &update).unwrap();

        stamp_versions(&base.channel_group, &mut edited.channel_group, &Replacements::new());
        prop_assert_eq!(committed.channel_group, edited.channel_group);
        prop_assert_eq!(committed.sequence, base.sequence + 1);
    }

    /// Property: stamping does not change what the diff emits.
    #[test]
    fn prop_stamping_is_invisible_to_diff(edits in prop::collection::vec(arb_edit(), 0..12)) {
        let base = fixture();
        let mut edited = base.clone();
        for edit in &edits {
            apply_edit(&mut edited.channel_group, edit);
        }
        let before = compute_update(&base, &edited).unwrap();

        let mut stamped = edited.clone();
        stamp_versions(&base.channel_group, &mut stamped.channel_group, &Replacements::new());
        let after = compute_update(&base, &stamped).unwrap();

        prop_assert_eq!(before, after);
    }

    /// Property: stamping twice is the same as stamping once.
    #[test]
    fn prop_stamping_is_idempotent(edits in prop::collection::vec(arb_edit(), 0..12)) {
        let base = fixture();
        let mut once = base.clone();
        for edit in &edits {
            apply_edit(&mut once.channel_group, edit);
        }
        stamp_versions(&base.channel_group, &mut once.channel_group, &Replacements::new());

        let mut twice = once.clone();
        stamp_versions(&base.channel_group, &mut twice.channel_group, &Replacements::new());
        prop_assert_eq!(once, twice);
    }
}

#[test]
fn reverting_every_edit_is_vacuous() {
    let base = fixture();
    let mut edited = base.clone();
    apply_edit(&mut edited.channel_group, &Edit::RemoveOrg { org: 1 });
    apply_edit(&mut edited.channel_group, &Edit::SetValue { org: 0, key: 0, byte: 1 });
    stamp_versions(&base.channel_group, &mut edited.channel_group, &Replacements::new());

    // put everything back the way it was
    edited = base.clone();
    let update = compute_update(&base, &edited).unwrap();
    assert!(update.is_empty());
    assert_eq!(update.read_set, ConfigGroup::pin(1));
}

#[test]
fn removed_then_restored_org_is_vacuous() {
    let base = fixture();
    let mut edited = base.clone();
    let org2 = edited
        .channel_group
        .descend_mut(&["Application"])
        .unwrap()
        .remove_group("Org2")
        .unwrap();
    edited
        .channel_group
        .descend_mut(&["Application"])
        .unwrap()
        .insert_group("Org2", ConfigGroup::clone(&org2))
        .unwrap();

    let update = compute_update(&base, &edited).unwrap();
    assert!(update.is_empty());
}
