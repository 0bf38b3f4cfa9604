//! Session-level behaviour: computed updates, rollback and replacement.

mod common;

use chanconf::schema::*;
use chanconf::{apply_update, update_to_json, ConfigTx, Error, Msp, Organization};
use common::{channel_config, implicit, init_tracing, system_channel_config};
use serde_json::json;

fn org3() -> Organization {
    Organization::new("Org3")
        .with_policy(ADMINS_POLICY_KEY, implicit("MAJORITY Admins"))
        .with_policy(ENDORSEMENT_POLICY_KEY, implicit("MAJORITY Endorsement"))
        .with_policy(READERS_POLICY_KEY, implicit("ANY Readers"))
        .with_policy(WRITERS_POLICY_KEY, implicit("ANY Writers"))
        .with_msp(Msp::new("Org3MSP"))
}

fn bare(version: &str, groups: serde_json::Value) -> serde_json::Value {
    json!({
        "groups": groups,
        "mod_policy": "",
        "policies": {},
        "values": {},
        "version": version,
    })
}

#[test]
fn system_channel_session_renders_minimal_update() {
    init_tracing();
    let mut tx = ConfigTx::new(system_channel_config());

    tx.update_consortium_channel_creation_policy("SampleConsortium", implicit("MAJORITY Admins"))
        .unwrap();
    tx.remove_consortium("SampleConsortium2").unwrap();
    tx.add_consortium_org("SampleConsortium", &org3()).unwrap();
    tx.remove_consortium_org("SampleConsortium", "Org3").unwrap();

    let update = tx.compute_update("testsyschannel").unwrap();
    let expected = json!({
        "channel_id": "testsyschannel",
        "isolated_data": {},
        "read_set": bare("0", json!({
            "Consortiums": bare("0", json!({
                "SampleConsortium": bare("0", json!({})),
            })),
        })),
        "write_set": bare("0", json!({
            "Consortiums": bare("1", json!({
                "SampleConsortium": {
                    "groups": {},
                    "mod_policy": "",
                    "policies": {},
                    "values": {
                        "ChannelCreationPolicy": {
                            "mod_policy": "/Channel/Orderer/Admins",
                            "value": {
                                "type": 3,
                                "value": {"rule": "MAJORITY", "sub_policy": "Admins"},
                            },
                            "version": "1",
                        },
                    },
                    "version": "0",
                },
            })),
        })),
    });
    assert_eq!(update_to_json(&update).unwrap(), expected);
}

#[test]
fn single_value_edit_leaves_parent_versions() {
    let mut tx = ConfigTx::new(system_channel_config());
    tx.update_consortium_channel_creation_policy("SampleConsortium", implicit("MAJORITY Admins"))
        .unwrap();

    let update = tx.compute_update("testsyschannel").unwrap();
    let consortiums = update.write_set.group(CONSORTIUMS_GROUP_KEY).unwrap();
    assert_eq!(consortiums.version, 0);
    let written = consortiums
        .group("SampleConsortium")
        .unwrap()
        .value(CHANNEL_CREATION_POLICY_KEY)
        .unwrap();
    assert_eq!(written.version, 1);
    assert_eq!(written.mod_policy, ORDERER_ADMINS_POLICY);
}

#[test]
fn untouched_session_yields_empty_update() {
    let tx = ConfigTx::new(channel_config());
    let update = tx.compute_update("mychannel").unwrap();
    assert!(update.is_empty());
    assert_eq!(tx.updated(), tx.original());
}

#[test]
fn failed_edit_is_rolled_back() {
    let mut tx = ConfigTx::new(channel_config());
    let before = tx.updated().clone();

    assert!(matches!(
        tx.remove_application_org("Org9"),
        Err(Error::NotFound { .. })
    ));
    assert!(matches!(
        tx.add_orderer_capability("V1_3"),
        Err(Error::AlreadyExists { .. })
    ));
    assert_eq!(tx.updated(), &before);
    assert!(tx.compute_update("mychannel").unwrap().is_empty());
}

#[test]
fn removed_then_readded_org_is_written_fresh() {
    let mut tx = ConfigTx::new(channel_config());
    tx.remove_application_org("Org1").unwrap();

    let org1 = Organization::new("Org1")
        .with_policy(ADMINS_POLICY_KEY, implicit("MAJORITY Admins"))
        .with_msp(Msp::new("Org1MSP"));
    tx.add_application_org(&org1).unwrap();

    let update = tx.compute_update("mychannel").unwrap();
    let application = update.write_set.group(APPLICATION_GROUP_KEY).unwrap();
    assert_eq!(application.version, 1);

    let written = application.group("Org1").unwrap();
    assert_eq!(written.version, 0);
    assert_eq!(written.mod_policy, ADMINS_POLICY_KEY);
    assert_eq!(written.value(MSP_KEY).unwrap().version, 0);
    assert_eq!(written.policy(ADMINS_POLICY_KEY).unwrap().version, 0);

    let read = update.read_set.group(APPLICATION_GROUP_KEY).unwrap();
    assert!(read.group("Org1").is_err());
}

#[test]
fn update_applies_onto_original() {
    let mut tx = ConfigTx::new(channel_config());
    tx.add_application_capability("V2_0").unwrap();
    tx.remove_orderer_policy(BLOCK_VALIDATION_POLICY_KEY).unwrap();
    tx.add_anchor_peer("Org1", "peer0.org1:7051".parse().unwrap()).unwrap();

    let update = tx.compute_update("mychannel").unwrap();
    let applied = apply_update(tx.original(), &update).unwrap();
    assert_eq!(applied.channel_group, tx.updated().channel_group);
    assert_eq!(applied.sequence, tx.original().sequence + 1);
}

#[test]
fn concurrent_sessions_conflict_on_apply() {
    let base = channel_config();
    let org = |name: &str| {
        Organization::new(name)
            .with_policy(ADMINS_POLICY_KEY, implicit("MAJORITY Admins"))
            .with_msp(Msp::new(format!("{name}MSP")))
    };

    let mut first = ConfigTx::new(base.clone());
    first.add_application_org(&org("Org2")).unwrap();
    let mut second = ConfigTx::new(base.clone());
    second.add_application_org(&org("Org3")).unwrap();

    let committed = apply_update(&base, &first.compute_update("mychannel").unwrap()).unwrap();
    let stale = second.compute_update("mychannel").unwrap();
    let err = apply_update(&committed, &stale).unwrap_err();
    assert!(matches!(Error::from(err), Error::VersionConflict { .. }));
}

#[test]
fn channel_id_checked_against_named_base() {
    let mut base = channel_config();
    base.channel_id = "mychannel".into();
    let tx = ConfigTx::new(base);

    assert!(tx.compute_update("mychannel").is_ok());
    assert!(matches!(
        tx.compute_update("otherchannel"),
        Err(Error::ChannelMismatch { .. })
    ));
}
