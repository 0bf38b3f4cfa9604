//! Shared fixtures: an application channel config and a system channel
//! config as fetched from their latest config blocks.

#![allow(dead_code)]

use chanconf::schema::*;
use chanconf::{Config, ConfigGroup, Policy};
use chanconf_tree::payload::{
    Acls, AnchorPeer, AnchorPeers, ApiResource, BatchSize, BatchTimeout, ChannelRestrictions,
    ConsensusState, ConsensusType, KafkaBrokers, OrdererAddresses,
};
use chanconf_tree::{ConfigPolicy, ConfigValue, Scope, ValuePayload};
use tracing_subscriber::EnvFilter;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_test_writer()
        .try_init();
}

pub fn implicit(rule: &str) -> Policy {
    Policy::implicit_meta(rule).unwrap()
}

fn policy(rule: &str) -> ConfigPolicy {
    ConfigPolicy::new(ADMINS_POLICY_KEY, implicit(rule))
}

fn put(group: &mut ConfigGroup, scope: Scope, key: &str, payload: ValuePayload, mod_policy: &str) {
    group.set_payload(scope, key, &payload, mod_policy).unwrap();
}

/// Admins, Readers and Writers implicit meta policies.
fn standard_policies(group: &mut ConfigGroup) {
    group.insert_policy(ADMINS_POLICY_KEY, policy("MAJORITY Admins")).unwrap();
    group.insert_policy(READERS_POLICY_KEY, policy("ANY Readers")).unwrap();
    group.insert_policy(WRITERS_POLICY_KEY, policy("ANY Writers")).unwrap();
}

fn capabilities(names: &[&str]) -> ValuePayload {
    ValuePayload::Capabilities(names.iter().map(|n| n.to_string()).collect())
}

fn placeholder_msp() -> ConfigValue {
    ConfigValue::new(ADMINS_POLICY_KEY, Vec::new())
}

/// Application channel: a kafka orderer with one org, and an application
/// with one org.
pub fn channel_config() -> Config {
    let mut orderer_org = ConfigGroup::new(ADMINS_POLICY_KEY);
    put(
        &mut orderer_org,
        Scope::OrdererOrg,
        ENDPOINTS_KEY,
        ValuePayload::Endpoints(OrdererAddresses {
            addresses: vec!["127.0.0.1:7050".into()],
        }),
        ADMINS_POLICY_KEY,
    );
    orderer_org.set_value(MSP_KEY, placeholder_msp());
    standard_policies(&mut orderer_org);

    let mut orderer = ConfigGroup::new("");
    orderer.version = 1;
    orderer.insert_group("OrdererOrg", orderer_org).unwrap();
    put(
        &mut orderer,
        Scope::Orderer,
        CONSENSUS_TYPE_KEY,
        ValuePayload::ConsensusType(ConsensusType {
            consensus_type: "kafka".into(),
            metadata: Vec::new(),
            state: ConsensusState::Normal,
        }),
        ADMINS_POLICY_KEY,
    );
    put(
        &mut orderer,
        Scope::Orderer,
        CHANNEL_RESTRICTIONS_KEY,
        ValuePayload::ChannelRestrictions(ChannelRestrictions { max_count: 1 }),
        ADMINS_POLICY_KEY,
    );
    put(&mut orderer, Scope::Orderer, CAPABILITIES_KEY, capabilities(&["V1_3"]), ADMINS_POLICY_KEY);
    put(
        &mut orderer,
        Scope::Orderer,
        KAFKA_BROKERS_KEY,
        ValuePayload::KafkaBrokers(KafkaBrokers {
            brokers: vec!["kafka0:9092".into(), "kafka1:9092".into()],
        }),
        ADMINS_POLICY_KEY,
    );
    put(
        &mut orderer,
        Scope::Orderer,
        BATCH_TIMEOUT_KEY,
        ValuePayload::BatchTimeout(BatchTimeout {
            timeout: "15s".into(),
        }),
        "",
    );
    put(
        &mut orderer,
        Scope::Orderer,
        BATCH_SIZE_KEY,
        ValuePayload::BatchSize(BatchSize {
            max_message_count: 100,
            absolute_max_bytes: 100,
            preferred_max_bytes: 100,
        }),
        "",
    );
    standard_policies(&mut orderer);
    orderer
        .insert_policy(BLOCK_VALIDATION_POLICY_KEY, policy("ANY Writers"))
        .unwrap();

    let mut org1 = ConfigGroup::new("");
    put(
        &mut org1,
        Scope::ApplicationOrg,
        ANCHOR_PEERS_KEY,
        ValuePayload::AnchorPeers(AnchorPeers {
            anchor_peers: vec![AnchorPeer {
                host: "127.0.0.1".into(),
                port: 7050,
            }],
        }),
        ADMINS_POLICY_KEY,
    );
    org1.set_value(MSP_KEY, placeholder_msp());

    let mut application = ConfigGroup::new("");
    application.insert_group("Org1", org1).unwrap();
    let mut acls = Acls::default();
    acls.acls.insert(
        "event/block".into(),
        ApiResource {
            policy_ref: "/Channel/Application/Readers".into(),
        },
    );
    put(&mut application, Scope::Application, ACLS_KEY, ValuePayload::Acls(acls), ADMINS_POLICY_KEY);
    put(
        &mut application,
        Scope::Application,
        CAPABILITIES_KEY,
        capabilities(&["V1_3"]),
        ADMINS_POLICY_KEY,
    );
    application
        .insert_policy(LIFECYCLE_ENDORSEMENT_POLICY_KEY, policy("MAJORITY Admins"))
        .unwrap();
    standard_policies(&mut application);

    let mut root = ConfigGroup::new("");
    root.insert_group(ORDERER_GROUP_KEY, orderer).unwrap();
    root.insert_group(APPLICATION_GROUP_KEY, application).unwrap();
    put(
        &mut root,
        Scope::Channel,
        ORDERER_ADDRESSES_KEY,
        ValuePayload::OrdererAddresses(OrdererAddresses {
            addresses: vec!["127.0.0.1:7050".into()],
        }),
        ADMINS_POLICY_KEY,
    );
    standard_policies(&mut root);

    Config::new("", root)
}

/// System channel: two consortiums, the first with two empty orgs.
pub fn system_channel_config() -> Config {
    let consortium = |orgs: &[&str]| {
        let mut group = ConfigGroup::new("");
        for org in orgs {
            group.insert_group(org, ConfigGroup::new(ADMINS_POLICY_KEY)).unwrap();
        }
        put(
            &mut group,
            Scope::Consortium,
            CHANNEL_CREATION_POLICY_KEY,
            ValuePayload::ChannelCreationPolicy(implicit("ANY Admins")),
            ORDERER_ADMINS_POLICY,
        );
        group
    };

    let mut consortiums = ConfigGroup::new("");
    consortiums
        .insert_group("SampleConsortium", consortium(&["Org1", "Org2"]))
        .unwrap();
    consortiums
        .insert_group("SampleConsortium2", consortium(&[]))
        .unwrap();

    let mut root = ConfigGroup::new("");
    root.insert_group(CONSORTIUMS_GROUP_KEY, consortiums).unwrap();
    Config::new("", root)
}

/// A self-signed Ed25519 certificate and its key, as PEM.
pub fn ed25519_pems(host: &str) -> (String, String) {
    let key_pair = rcgen::KeyPair::generate_for(&rcgen::PKCS_ED25519).unwrap();
    let cert = rcgen::CertificateParams::new(vec![host.to_string()])
        .unwrap()
        .self_signed(&key_pair)
        .unwrap();
    (cert.pem(), key_pair.serialize_pem())
}
