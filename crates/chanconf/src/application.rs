//! Application edits: ACLs, policies, capabilities and application orgs.

use crate::config_tx::ConfigTx;
use crate::error::{Error, Result};
use crate::organization::{optional_payload, Address, OrgKind, Organization};
use chanconf_msp::Msp;
use chanconf_tree::payload::{Acls, AnchorPeer, AnchorPeers, ApiResource};
use chanconf_tree::schema::{ACLS_KEY, ADMINS_POLICY_KEY, ANCHOR_PEERS_KEY, APPLICATION_GROUP_KEY};
use chanconf_tree::{Policy, Scope, ValuePayload};
use std::collections::BTreeMap;

const APPLICATION: &[&str] = &[APPLICATION_GROUP_KEY];

impl ConfigTx {
    /// Resource name to policy reference.
    pub fn acls(&self) -> Result<BTreeMap<String, String>> {
        Ok(self
            .current_acls()?
            .acls
            .into_iter()
            .map(|(name, resource)| (name, resource.policy_ref))
            .collect())
    }

    /// Add ACLs, replacing the policy reference of names already present.
    pub fn add_acls(&mut self, acls: impl IntoIterator<Item = (String, String)>) -> Result<()> {
        let mut current = self.current_acls()?;
        for (name, policy_ref) in acls {
            current.acls.insert(name, ApiResource { policy_ref });
        }
        self.write_acls("add ACLs", current)
    }

    /// Remove ACLs by name; every name must be present.
    pub fn remove_acls<S: AsRef<str>>(&mut self, names: &[S]) -> Result<()> {
        let mut current = self.current_acls()?;
        for name in names {
            let name = name.as_ref();
            if current.acls.remove(name).is_none() {
                return Err(Error::not_found("ACL", name));
            }
        }
        self.write_acls("remove ACLs", current)
    }

    fn current_acls(&self) -> Result<Acls> {
        let group = self.group(APPLICATION)?;
        match optional_payload(group, Scope::Application, ACLS_KEY)? {
            Some(payload) => Ok(payload.into_acls()?),
            None => Ok(Acls::default()),
        }
    }

    fn write_acls(&mut self, what: &str, acls: Acls) -> Result<()> {
        let payload = ValuePayload::Acls(acls);
        self.edit(what, |edit| {
            edit.put_payload(APPLICATION, ACLS_KEY, &payload, ADMINS_POLICY_KEY)
        })
    }

    pub fn application_policies(&self) -> Result<BTreeMap<String, Policy>> {
        self.policies_at(APPLICATION)
    }

    pub fn add_application_policy(
        &mut self,
        mod_policy: &str,
        name: &str,
        policy: Policy,
    ) -> Result<()> {
        self.edit("add application policy", |edit| {
            edit.add_policy(APPLICATION, mod_policy, name, policy)
        })
    }

    pub fn remove_application_policy(&mut self, name: &str) -> Result<()> {
        self.edit("remove application policy", |edit| {
            edit.remove_policy(APPLICATION, name)
        })
    }

    pub fn application_capabilities(&self) -> Result<Vec<String>> {
        self.capabilities_at(APPLICATION)
    }

    pub fn add_application_capability(&mut self, capability: &str) -> Result<()> {
        self.edit("add application capability", |edit| {
            edit.add_capability(APPLICATION, capability)
        })
    }

    pub fn remove_application_capability(&mut self, capability: &str) -> Result<()> {
        self.edit("remove application capability", |edit| {
            edit.remove_capability(APPLICATION, capability)
        })
    }

    pub fn application_org(&self, name: &str) -> Result<Organization> {
        let group = self.group(&[APPLICATION_GROUP_KEY, name])?;
        Organization::from_group(name, group, OrgKind::Application)
    }

    pub fn add_application_org(&mut self, org: &Organization) -> Result<()> {
        let group = org.to_group(OrgKind::Application)?;
        self.edit("add application org", |edit| {
            edit.add_group(APPLICATION, &org.name, group)
        })
    }

    pub fn remove_application_org(&mut self, name: &str) -> Result<()> {
        self.edit("remove application org", |edit| {
            edit.remove_group(APPLICATION, name)
        })
    }

    pub fn add_application_org_policy(
        &mut self,
        org: &str,
        mod_policy: &str,
        name: &str,
        policy: Policy,
    ) -> Result<()> {
        self.edit("add application org policy", |edit| {
            edit.add_policy(&[APPLICATION_GROUP_KEY, org], mod_policy, name, policy)
        })
    }

    pub fn remove_application_org_policy(&mut self, org: &str, name: &str) -> Result<()> {
        self.edit("remove application org policy", |edit| {
            edit.remove_policy(&[APPLICATION_GROUP_KEY, org], name)
        })
    }

    pub fn anchor_peers(&self, org: &str) -> Result<Vec<Address>> {
        Ok(self.application_org(org)?.anchor_peers)
    }

    pub fn add_anchor_peer(&mut self, org: &str, peer: Address) -> Result<()> {
        let mut peers = self.anchor_peers(org)?;
        if peers.contains(&peer) {
            return Err(Error::already_exists("anchor peer", peer.to_string()));
        }
        peers.push(peer);
        self.write_anchor_peers(org, "add anchor peer", &peers)
    }

    pub fn remove_anchor_peer(&mut self, org: &str, peer: &Address) -> Result<()> {
        let mut peers = self.anchor_peers(org)?;
        let before = peers.len();
        peers.retain(|p| p != peer);
        if peers.len() == before {
            return Err(Error::not_found("anchor peer", peer.to_string()));
        }
        self.write_anchor_peers(org, "remove anchor peer", &peers)
    }

    fn write_anchor_peers(&mut self, org: &str, what: &str, peers: &[Address]) -> Result<()> {
        let payload = ValuePayload::AnchorPeers(AnchorPeers {
            anchor_peers: peers.iter().map(AnchorPeer::from).collect(),
        });
        self.edit(what, |edit| {
            edit.put_payload(
                &[APPLICATION_GROUP_KEY, org],
                ANCHOR_PEERS_KEY,
                &payload,
                ADMINS_POLICY_KEY,
            )
        })
    }

    /// MSP of an application org; `NotFound` when the org has only a
    /// placeholder.
    pub fn application_msp(&self, org: &str) -> Result<Msp> {
        self.application_org(org)?
            .msp
            .ok_or_else(|| Error::not_found("MSP", org))
    }

    /// Replace an application org's MSP. The MSP name cannot change.
    pub fn update_application_msp(&mut self, org: &str, msp: Msp) -> Result<()> {
        self.update_msp(&[APPLICATION_GROUP_KEY, org], OrgKind::Application, msp)
    }
}
