//! Channel-level edits.

use crate::config_tx::ConfigTx;
use crate::error::Result;
use crate::organization::{optional_payload, parse_addresses, Address};
use chanconf_tree::schema::ORDERER_ADDRESSES_KEY;
use chanconf_tree::{Policy, Scope};
use std::collections::BTreeMap;

const CHANNEL: &[&str] = &[];

impl ConfigTx {
    pub fn channel_capabilities(&self) -> Result<Vec<String>> {
        self.capabilities_at(CHANNEL)
    }

    pub fn add_channel_capability(&mut self, capability: &str) -> Result<()> {
        self.edit("add channel capability", |edit| edit.add_capability(CHANNEL, capability))
    }

    pub fn remove_channel_capability(&mut self, capability: &str) -> Result<()> {
        self.edit("remove channel capability", |edit| {
            edit.remove_capability(CHANNEL, capability)
        })
    }

    pub fn channel_policies(&self) -> Result<BTreeMap<String, Policy>> {
        self.policies_at(CHANNEL)
    }

    pub fn add_channel_policy(&mut self, mod_policy: &str, name: &str, policy: Policy) -> Result<()> {
        self.edit("add channel policy", |edit| {
            edit.add_policy(CHANNEL, mod_policy, name, policy)
        })
    }

    pub fn remove_channel_policy(&mut self, name: &str) -> Result<()> {
        self.edit("remove channel policy", |edit| edit.remove_policy(CHANNEL, name))
    }

    /// Channel-wide orderer addresses; empty when none are configured.
    pub fn orderer_addresses(&self) -> Result<Vec<Address>> {
        match optional_payload(self.group(CHANNEL)?, Scope::Channel, ORDERER_ADDRESSES_KEY)? {
            Some(payload) => parse_addresses(payload.into_orderer_addresses()?),
            None => Ok(Vec::new()),
        }
    }
}
