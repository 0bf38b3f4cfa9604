//! Organizations and their config group form.

use crate::error::{Error, Result};
use chanconf_msp::Msp;
use chanconf_tree::payload::{AnchorPeer, AnchorPeers, OrdererAddresses};
use chanconf_tree::schema::{ADMINS_POLICY_KEY, ANCHOR_PEERS_KEY, ENDPOINTS_KEY, MSP_KEY};
use chanconf_tree::{ConfigGroup, ConfigPolicy, Policy, Scope, ValuePayload};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// A `host:port` network address.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Address {
    pub host: String,
    pub port: u32,
}

impl Address {
    pub fn new(host: impl Into<String>, port: u32) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

impl FromStr for Address {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || Error::Validation(format!("address must be host:port, got {s:?}"));
        let (host, port) = s.rsplit_once(':').ok_or_else(invalid)?;
        if host.is_empty() {
            return Err(invalid());
        }
        Ok(Self::new(host, port.parse().map_err(|_| invalid())?))
    }
}

impl From<AnchorPeer> for Address {
    fn from(peer: AnchorPeer) -> Self {
        Self::new(peer.host, peer.port)
    }
}

impl From<&Address> for AnchorPeer {
    fn from(address: &Address) -> Self {
        Self {
            host: address.host.clone(),
            port: address.port,
        }
    }
}

/// Where an organization sits in the channel hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum OrgKind {
    Application,
    Orderer,
    Consortium,
}

impl OrgKind {
    pub(crate) fn scope(self) -> Scope {
        match self {
            Self::Application => Scope::ApplicationOrg,
            Self::Orderer => Scope::OrdererOrg,
            Self::Consortium => Scope::ConsortiumOrg,
        }
    }
}

/// A member organization: its policies, MSP and network addresses.
///
/// Application orgs may carry anchor peers, orderer orgs may carry orderer
/// endpoints; consortium orgs carry neither.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Organization {
    pub name: String,
    pub policies: BTreeMap<String, Policy>,
    pub msp: Option<Msp>,
    pub anchor_peers: Vec<Address>,
    pub orderer_endpoints: Vec<Address>,
}

impl Organization {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_policy(mut self, name: impl Into<String>, policy: Policy) -> Self {
        self.policies.insert(name.into(), policy);
        self
    }

    pub fn with_msp(mut self, msp: Msp) -> Self {
        self.msp = Some(msp);
        self
    }

    /// Build the org's config group. The group and every policy use the
    /// `Admins` mod policy.
    pub(crate) fn to_group(&self, kind: OrgKind) -> Result<ConfigGroup> {
        if self.name.trim().is_empty() {
            return Err(Error::Validation("organization name is empty".to_string()));
        }
        if kind != OrgKind::Application && !self.anchor_peers.is_empty() {
            return Err(Error::Validation(format!(
                "only application orgs carry anchor peers, {} is not one",
                self.name
            )));
        }
        if kind != OrgKind::Orderer && !self.orderer_endpoints.is_empty() {
            return Err(Error::Validation(format!(
                "only orderer orgs carry endpoints, {} is not one",
                self.name
            )));
        }

        let scope = kind.scope();
        let mut group = ConfigGroup::new(ADMINS_POLICY_KEY);
        for (name, policy) in &self.policies {
            group.insert_policy(name, ConfigPolicy::new(ADMINS_POLICY_KEY, policy.clone()))?;
        }
        if let Some(msp) = &self.msp {
            group.set_payload(
                scope,
                MSP_KEY,
                &ValuePayload::Msp(Box::new(msp.clone())),
                ADMINS_POLICY_KEY,
            )?;
        }
        if !self.anchor_peers.is_empty() {
            let peers = AnchorPeers {
                anchor_peers: self.anchor_peers.iter().map(AnchorPeer::from).collect(),
            };
            group.set_payload(scope, ANCHOR_PEERS_KEY, &ValuePayload::AnchorPeers(peers), ADMINS_POLICY_KEY)?;
        }
        if !self.orderer_endpoints.is_empty() {
            let endpoints = OrdererAddresses {
                addresses: self.orderer_endpoints.iter().map(Address::to_string).collect(),
            };
            group.set_payload(scope, ENDPOINTS_KEY, &ValuePayload::Endpoints(endpoints), ADMINS_POLICY_KEY)?;
        }
        Ok(group)
    }

    /// Read an org back from its config group. Placeholder values read as
    /// absent.
    pub(crate) fn from_group(name: &str, group: &ConfigGroup, kind: OrgKind) -> Result<Self> {
        let scope = kind.scope();
        let msp = match optional_payload(group, scope, MSP_KEY)? {
            Some(payload) => Some(*payload.into_msp()?),
            None => None,
        };

        let mut org = Self {
            name: name.to_string(),
            policies: group.policy_bodies(),
            msp,
            ..Self::default()
        };
        match kind {
            OrgKind::Application => {
                if let Some(payload) = optional_payload(group, scope, ANCHOR_PEERS_KEY)? {
                    org.anchor_peers = payload
                        .into_anchor_peers()?
                        .anchor_peers
                        .into_iter()
                        .map(Address::from)
                        .collect();
                }
            }
            OrgKind::Orderer => {
                if let Some(payload) = optional_payload(group, scope, ENDPOINTS_KEY)? {
                    org.orderer_endpoints = parse_addresses(payload.into_endpoints()?)?;
                }
            }
            OrgKind::Consortium => {}
        }
        Ok(org)
    }
}

/// Payload at `key`, or `None` when the value is absent or a placeholder.
pub(crate) fn optional_payload(
    group: &ConfigGroup,
    scope: Scope,
    key: &str,
) -> Result<Option<ValuePayload>> {
    if !group.values.contains_key(key) {
        return Ok(None);
    }
    Ok(group.payload(scope, key)?)
}

pub(crate) fn parse_addresses(addresses: OrdererAddresses) -> Result<Vec<Address>> {
    addresses.addresses.iter().map(|a| a.parse()).collect()
}
