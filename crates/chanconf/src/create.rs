//! Channel creation from a descriptor.
//!
//! A new application channel has no committed config yet, so its update is
//! computed against an implicit base: an `Application` group holding one
//! empty group per org and, when a consortium is named, a placeholder
//! `Consortium` value.
//!
//! ```text
//! base                          updated
//! Channel                       Channel
//! ├── Consortium  (empty)       ├── Consortium  {name}
//! └── Application               └── Application  Admins, ACLs, Capabilities, policies
//!     ├── Org1                      ├── Org1
//!     └── Org2                      └── Org2
//! ```

use crate::error::{Error, Result};
use chanconf_sign::{ConfigUpdateEnvelope, Envelope, SignerConfig};
use chanconf_tree::payload::{Acls, ApiResource, Capabilities, Consortium};
use chanconf_tree::schema::{
    ACLS_KEY, ADMINS_POLICY_KEY, APPLICATION_GROUP_KEY, CAPABILITIES_KEY, CONSORTIUM_KEY,
};
use chanconf_tree::{Config, ConfigGroup, ConfigPolicy, ConfigUpdate, ConfigValue, Policy, Scope, ValuePayload};
use chanconf_update::Differ;
use std::collections::BTreeMap;
use tracing::info;

/// Description of a channel to create.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Channel {
    /// Consortium the channel belongs to; empty for none.
    pub consortium: String,
    pub application: Application,
}

/// Application settings of a channel to create.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Application {
    /// Member orgs; only their names are used.
    pub organizations: Vec<String>,
    pub capabilities: Vec<String>,
    /// Resource name to policy reference.
    pub acls: BTreeMap<String, String>,
    pub policies: BTreeMap<String, Policy>,
}

/// The update that creates `channel_id` as described by `channel`.
///
/// The `Consortium` value is pinned at version 0 in the read set and
/// written at version 0, as channel creation expects.
pub fn create_channel_update(channel: &Channel, channel_id: &str) -> Result<ConfigUpdate> {
    if channel_id.is_empty() {
        return Err(Error::Validation("channel id is empty".to_string()));
    }
    let application = &channel.application;
    if application.policies.is_empty() {
        return Err(Error::Validation(format!("no application policies defined for {channel_id}")));
    }

    let base = implicit_base(channel)?;
    let mut updated = base.clone();
    {
        let group = updated.channel_group.group_mut(APPLICATION_GROUP_KEY)?;
        group.mod_policy = ADMINS_POLICY_KEY.to_string();
        for (name, policy) in &application.policies {
            group.insert_policy(name, ConfigPolicy::new(ADMINS_POLICY_KEY, policy.clone()))?;
        }
        if !application.acls.is_empty() {
            let acls = Acls {
                acls: application
                    .acls
                    .iter()
                    .map(|(name, policy_ref)| {
                        let resource = ApiResource {
                            policy_ref: policy_ref.clone(),
                        };
                        (name.clone(), resource)
                    })
                    .collect(),
            };
            group.set_payload(Scope::Application, ACLS_KEY, &ValuePayload::Acls(acls), ADMINS_POLICY_KEY)?;
        }
        if !application.capabilities.is_empty() {
            let capabilities: Capabilities = application.capabilities.iter().cloned().collect();
            group.set_payload(
                Scope::Application,
                CAPABILITIES_KEY,
                &ValuePayload::Capabilities(capabilities),
                ADMINS_POLICY_KEY,
            )?;
        }
    }

    let (mut read_set, mut write_set) =
        Differ::new().diff_groups(&base.channel_group, &updated.channel_group);

    if !channel.consortium.is_empty() {
        let consortium = ValuePayload::Consortium(Consortium {
            name: channel.consortium.clone(),
        });
        read_set.set_value(CONSORTIUM_KEY, ConfigValue::pin(0));
        write_set.set_value(CONSORTIUM_KEY, ConfigValue::new("", consortium.encode()?));
    }

    info!(
        channel = %channel_id,
        consortium = %channel.consortium,
        orgs = application.organizations.len(),
        "computed channel creation update"
    );
    Ok(ConfigUpdate {
        channel_id: channel_id.to_string(),
        read_set,
        write_set,
        isolated_data: BTreeMap::new(),
    })
}

/// An unsigned envelope carrying the creation update for `channel_id`,
/// ready for signature collection.
pub fn new_create_channel_tx(channel: &Channel, channel_id: &str) -> Result<Envelope> {
    let update = create_channel_update(channel, channel_id)?;
    let update_envelope = ConfigUpdateEnvelope::new(&update)?;
    Ok(Envelope::unsigned(
        &update_envelope,
        channel_id,
        SignerConfig::default().epoch,
    )?)
}

fn implicit_base(channel: &Channel) -> Result<Config> {
    let mut application = ConfigGroup::default();
    for org in &channel.application.organizations {
        if org.trim().is_empty() {
            return Err(Error::Validation("organization name is empty".to_string()));
        }
        application.insert_group(org, ConfigGroup::default())?;
    }

    let mut root = ConfigGroup::default();
    root.insert_group(APPLICATION_GROUP_KEY, application)?;
    if !channel.consortium.is_empty() {
        root.set_value(CONSORTIUM_KEY, ConfigValue::pin(0));
    }
    Ok(Config::new("", root))
}
