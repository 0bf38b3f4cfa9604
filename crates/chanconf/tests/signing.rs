//! Signature collection and policy authorization of a computed update.

mod common;

use chanconf::schema::*;
use chanconf::{
    apply_update, authorize_update, verify_config_signature, verify_envelope, Config, ConfigTx,
    ConfigUpdateEnvelope, Msp, Organization, Policy, PolicyPath, SignerConfig, SigningIdentity,
};
use chanconf_tree::SignaturePolicy;
use common::{channel_config, ed25519_pems, implicit, init_tracing};
use std::collections::BTreeSet;

fn identity(msp_id: &str) -> SigningIdentity {
    let (cert, key) = ed25519_pems(&format!("admin.{}", msp_id.to_lowercase()));
    SigningIdentity::from_pem(msp_id, &cert, &key).unwrap()
}

fn signed_org(name: &str, msp_id: &str) -> Organization {
    Organization::new(name)
        .with_policy(
            ADMINS_POLICY_KEY,
            Policy::signature(format!("OR('{msp_id}.admin')")).unwrap(),
        )
        .with_policy(
            READERS_POLICY_KEY,
            Policy::signature(format!("OR('{msp_id}.member')")).unwrap(),
        )
        .with_msp(Msp::new(msp_id))
}

/// The fixture channel after Org2 and Org3 joined with signature policies.
fn committed_channel() -> Config {
    let mut tx = ConfigTx::new(channel_config());
    tx.add_application_org(&signed_org("Org2", "Org2MSP")).unwrap();
    tx.add_application_org(&signed_org("Org3", "Org3MSP")).unwrap();
    let update = tx.compute_update("mychannel").unwrap();
    apply_update(tx.original(), &update).unwrap()
}

/// Satisfied when one of `signers` appears in the signature rule.
fn signed_by(signers: &BTreeSet<String>) -> impl Fn(&PolicyPath, &SignaturePolicy) -> bool + '_ {
    move |_, policy| signers.iter().any(|msp| policy.rule.contains(&format!("'{msp}.")))
}

#[test]
fn collected_signatures_verify_and_authorize() {
    init_tracing();
    let base = committed_channel();
    let mut tx = ConfigTx::new(base.clone());
    tx.add_acls([("peer/Propose".to_string(), "/Channel/Application/Writers".to_string())])
        .unwrap();
    let update = tx.compute_update("mychannel").unwrap();

    let config = SignerConfig::new(24, 0);
    let admins = [identity("Org2MSP"), identity("Org3MSP")];
    let mut update_envelope = ConfigUpdateEnvelope::new(&update).unwrap();
    update_envelope.append_signatures(
        admins
            .iter()
            .map(|admin| admin.sign_config_update(&update, &config).unwrap()),
    );

    let envelope = admins[0]
        .sign_envelope(&update_envelope, "mychannel", &config)
        .unwrap();
    let payload = verify_envelope(&envelope).unwrap();
    let received = payload.config_update_envelope().unwrap();
    assert_eq!(received.config_update().unwrap(), update);

    let signers: BTreeSet<String> = received
        .signatures
        .iter()
        .map(|signature| {
            verify_config_signature(&received.config_update, signature)
                .unwrap()
                .mspid
        })
        .collect();
    assert_eq!(signers.len(), 2);

    let authorization = authorize_update(&base, &update, signed_by(&signers)).unwrap();
    assert_eq!(
        authorization.required,
        vec![PolicyPath::resolve("/Channel/Application/Admins", &[] as &[&str]).unwrap()]
    );
    assert!(authorization.is_authorized());
}

#[test]
fn minority_of_admins_is_not_enough() {
    let mut tx = ConfigTx::new(committed_channel());
    tx.add_application_capability("V2_0").unwrap();

    let signers: BTreeSet<String> = ["Org2MSP".to_string()].into_iter().collect();
    let authorization = tx.authorize("mychannel", signed_by(&signers)).unwrap();
    assert!(!authorization.is_authorized());
    assert_eq!(authorization.unsatisfied, authorization.required);
}

#[test]
fn org_level_edit_needs_only_that_org() {
    let mut tx = ConfigTx::new(committed_channel());
    tx.add_application_org_policy(
        "Org2",
        ADMINS_POLICY_KEY,
        WRITERS_POLICY_KEY,
        implicit("ANY Writers"),
    )
    .unwrap();

    let required = tx.required_policies("mychannel").unwrap();
    assert_eq!(
        required.iter().map(ToString::to_string).collect::<Vec<_>>(),
        vec!["/Channel/Application/Org2/Admins"]
    );

    let org2: BTreeSet<String> = ["Org2MSP".to_string()].into_iter().collect();
    assert!(tx.authorize("mychannel", signed_by(&org2)).unwrap().is_authorized());
    let org3: BTreeSet<String> = ["Org3MSP".to_string()].into_iter().collect();
    assert!(!tx.authorize("mychannel", signed_by(&org3)).unwrap().is_authorized());
}
