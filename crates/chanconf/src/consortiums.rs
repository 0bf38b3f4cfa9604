//! Consortium edits on the system channel.

use crate::config_tx::ConfigTx;
use crate::error::{Error, Result};
use crate::organization::{OrgKind, Organization};
use chanconf_tree::schema::{CHANNEL_CREATION_POLICY_KEY, CONSORTIUMS_GROUP_KEY, ORDERER_ADMINS_POLICY};
use chanconf_tree::{ConfigGroup, Policy, Scope, ValuePayload};

const CONSORTIUMS: &[&str] = &[CONSORTIUMS_GROUP_KEY];

/// A named set of orgs allowed to create channels together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Consortium {
    pub name: String,
    pub organizations: Vec<Organization>,
    pub channel_creation_policy: Policy,
}

impl Consortium {
    fn to_group(&self) -> Result<ConfigGroup> {
        if self.name.trim().is_empty() {
            return Err(Error::Validation("consortium name is empty".to_string()));
        }
        let mut group = ConfigGroup::new(ORDERER_ADMINS_POLICY);
        group.set_payload(
            Scope::Consortium,
            CHANNEL_CREATION_POLICY_KEY,
            &ValuePayload::ChannelCreationPolicy(self.channel_creation_policy.clone()),
            ORDERER_ADMINS_POLICY,
        )?;
        for org in &self.organizations {
            group.insert_group(&org.name, org.to_group(OrgKind::Consortium)?)?;
        }
        Ok(group)
    }
}

impl ConfigTx {
    /// Names of the consortiums defined on this (system) channel.
    pub fn consortiums(&self) -> Result<Vec<String>> {
        Ok(self.group(CONSORTIUMS)?.groups.keys().cloned().collect())
    }

    pub fn consortium(&self, name: &str) -> Result<Consortium> {
        let group = self.group(&[CONSORTIUMS_GROUP_KEY, name])?;
        let channel_creation_policy = group
            .payload(Scope::Consortium, CHANNEL_CREATION_POLICY_KEY)?
            .ok_or_else(|| Error::not_found("value", CHANNEL_CREATION_POLICY_KEY))?
            .into_channel_creation_policy()?;
        let organizations = group
            .groups
            .iter()
            .map(|(org, org_group)| Organization::from_group(org, org_group, OrgKind::Consortium))
            .collect::<Result<_>>()?;

        Ok(Consortium {
            name: name.to_string(),
            organizations,
            channel_creation_policy,
        })
    }

    /// Replace the policy governing channel creation in `consortium`. The
    /// value keeps its mod policy.
    pub fn update_consortium_channel_creation_policy(
        &mut self,
        consortium: &str,
        policy: Policy,
    ) -> Result<()> {
        let payload = ValuePayload::ChannelCreationPolicy(policy);
        self.edit("update channel creation policy", |edit| {
            edit.put_payload(
                &[CONSORTIUMS_GROUP_KEY, consortium],
                CHANNEL_CREATION_POLICY_KEY,
                &payload,
                ORDERER_ADMINS_POLICY,
            )
        })
    }

    pub fn add_consortium(&mut self, consortium: &Consortium) -> Result<()> {
        let group = consortium.to_group()?;
        self.edit("add consortium", |edit| {
            edit.add_group(CONSORTIUMS, &consortium.name, group)
        })
    }

    pub fn remove_consortium(&mut self, name: &str) -> Result<()> {
        self.edit("remove consortium", |edit| edit.remove_group(CONSORTIUMS, name))
    }

    pub fn add_consortium_org(&mut self, consortium: &str, org: &Organization) -> Result<()> {
        let group = org.to_group(OrgKind::Consortium)?;
        self.edit("add consortium org", |edit| {
            edit.add_group(&[CONSORTIUMS_GROUP_KEY, consortium], &org.name, group)
        })
    }

    pub fn remove_consortium_org(&mut self, consortium: &str, org: &str) -> Result<()> {
        self.edit("remove consortium org", |edit| {
            edit.remove_group(&[CONSORTIUMS_GROUP_KEY, consortium], org)
        })
    }
}
