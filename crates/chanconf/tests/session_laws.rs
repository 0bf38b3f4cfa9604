//! Property tests: whatever sequence of edits a session sees, its update
//! applied to the original reproduces the working config.

mod common;

use chanconf::schema::*;
use chanconf::{apply_update, Address, ConfigTx, Msp, Organization};
use common::{channel_config, implicit};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Level {
    Channel,
    Orderer,
    Application,
}

#[derive(Debug, Clone)]
enum Op {
    AddCapability(Level, &'static str),
    RemoveCapability(Level, &'static str),
    AddAnchorPeer(u32),
    RemoveAnchorPeer(u32),
    RemoveOrg1,
    AddOrg1,
    SetMaxMessageCount(u32),
    AddAcl(&'static str),
}

fn arb_level() -> impl Strategy<Value = Level> {
    prop_oneof![
        Just(Level::Channel),
        Just(Level::Orderer),
        Just(Level::Application),
    ]
}

fn arb_op() -> impl Strategy<Value = Op> {
    let capability = prop_oneof![Just("V1_3"), Just("V2_0")];
    let port = prop_oneof![Just(7050u32), Just(7051u32), Just(8051u32)];
    prop_oneof![
        (arb_level(), capability.clone()).prop_map(|(l, c)| Op::AddCapability(l, c)),
        (arb_level(), capability).prop_map(|(l, c)| Op::RemoveCapability(l, c)),
        port.clone().prop_map(Op::AddAnchorPeer),
        port.prop_map(Op::RemoveAnchorPeer),
        Just(Op::RemoveOrg1),
        Just(Op::AddOrg1),
        (1u32..1000).prop_map(Op::SetMaxMessageCount),
        prop_oneof![Just("event/block"), Just("peer/Propose")].prop_map(Op::AddAcl),
    ]
}

fn org1() -> Organization {
    Organization::new("Org1")
        .with_policy(ADMINS_POLICY_KEY, implicit("MAJORITY Admins"))
        .with_msp(Msp::new("Org1MSP"))
}

/// Run one edit; rejected edits are part of the property too.
fn run(tx: &mut ConfigTx, op: &Op) {
    let _ = match op {
        Op::AddCapability(Level::Channel, c) => tx.add_channel_capability(c),
        Op::AddCapability(Level::Orderer, c) => tx.add_orderer_capability(c),
        Op::AddCapability(Level::Application, c) => tx.add_application_capability(c),
        Op::RemoveCapability(Level::Channel, c) => tx.remove_channel_capability(c),
        Op::RemoveCapability(Level::Orderer, c) => tx.remove_orderer_capability(c),
        Op::RemoveCapability(Level::Application, c) => tx.remove_application_capability(c),
        Op::AddAnchorPeer(port) => tx.add_anchor_peer("Org1", Address::new("127.0.0.1", *port)),
        Op::RemoveAnchorPeer(port) => {
            tx.remove_anchor_peer("Org1", &Address::new("127.0.0.1", *port))
        }
        Op::RemoveOrg1 => tx.remove_application_org("Org1"),
        Op::AddOrg1 => tx.add_application_org(&org1()),
        Op::SetMaxMessageCount(count) => tx.orderer_configuration().and_then(|mut config| {
            config.batch_size.max_message_count = *count;
            tx.update_orderer_configuration(&config)
        }),
        Op::AddAcl(name) => tx.add_acls([(
            name.to_string(),
            "/Channel/Application/Writers".to_string(),
        )]),
    };
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn update_reproduces_working_config(ops in prop::collection::vec(arb_op(), 0..12)) {
        let mut tx = ConfigTx::new(channel_config());
        for op in &ops {
            run(&mut tx, op);
        }

        let update = tx.compute_update("mychannel").unwrap();
        let applied = apply_update(tx.original(), &update).unwrap();
        prop_assert_eq!(&applied.channel_group, &tx.updated().channel_group);
    }

    #[test]
    fn rejected_edit_changes_nothing(ops in prop::collection::vec(arb_op(), 0..8)) {
        let mut tx = ConfigTx::new(channel_config());
        for op in &ops {
            run(&mut tx, op);
        }

        let before = tx.updated().clone();
        let rejected = tx.add_orderer_endpoint("Missing", Address::new("127.0.0.1", 7050));
        prop_assert!(rejected.is_err());
        prop_assert_eq!(tx.updated(), &before);
    }
}
