//! Orderer edits: ordering-service settings, policies, capabilities and
//! orderer orgs.

use crate::config_tx::ConfigTx;
use crate::error::{Error, Result};
use crate::organization::{optional_payload, Address, OrgKind, Organization};
use chanconf_msp::Msp;
use chanconf_tree::payload::{
    BatchSize, BatchTimeout, ChannelRestrictions, ConsensusState, ConsensusType, KafkaBrokers,
    OrdererAddresses,
};
use chanconf_tree::schema::{
    ADMINS_POLICY_KEY, BATCH_SIZE_KEY, BATCH_TIMEOUT_KEY, CHANNEL_RESTRICTIONS_KEY,
    CONSENSUS_TYPE_KEY, ENDPOINTS_KEY, KAFKA_BROKERS_KEY, MSP_KEY, ORDERER_GROUP_KEY,
};
use chanconf_tree::{Policy, Scope, ValuePayload};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

const ORDERER: &[&str] = &[ORDERER_GROUP_KEY];

/// Supported consensus implementations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrdererType {
    Solo,
    Kafka,
    EtcdRaft,
}

impl OrdererType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Solo => "solo",
            Self::Kafka => "kafka",
            Self::EtcdRaft => "etcdraft",
        }
    }
}

impl fmt::Display for OrdererType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrdererType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "solo" => Ok(Self::Solo),
            "kafka" => Ok(Self::Kafka),
            "etcdraft" => Ok(Self::EtcdRaft),
            other => Err(Error::Validation(format!("unsupported consensus type {other:?}"))),
        }
    }
}

/// Ordering-service settings of a channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrdererConfig {
    pub orderer_type: OrdererType,
    pub batch_timeout: Duration,
    pub batch_size: BatchSize,
    pub kafka_brokers: Vec<String>,
    /// Channel creation limit; 0 means unlimited.
    pub max_channels: u64,
    pub state: ConsensusState,
    /// Opaque consensus metadata, e.g. the etcdraft consenter set.
    pub consensus_metadata: Vec<u8>,
}

impl ConfigTx {
    /// Current ordering-service settings.
    pub fn orderer_configuration(&self) -> Result<OrdererConfig> {
        let orderer = self.group(ORDERER)?;
        let required = |key: &str| -> Result<ValuePayload> {
            orderer
                .payload(Scope::Orderer, key)?
                .ok_or_else(|| Error::not_found("value", key))
        };

        let consensus = required(CONSENSUS_TYPE_KEY)?.into_consensus_type()?;
        let timeout = required(BATCH_TIMEOUT_KEY)?.into_batch_timeout()?;
        let batch_size = required(BATCH_SIZE_KEY)?.into_batch_size()?;

        let kafka_brokers = match optional_payload(orderer, Scope::Orderer, KAFKA_BROKERS_KEY)? {
            Some(payload) => payload.into_kafka_brokers()?.brokers,
            None => Vec::new(),
        };
        let max_channels = match optional_payload(orderer, Scope::Orderer, CHANNEL_RESTRICTIONS_KEY)? {
            Some(payload) => payload.into_channel_restrictions()?.max_count,
            None => 0,
        };

        Ok(OrdererConfig {
            orderer_type: consensus.consensus_type.parse()?,
            batch_timeout: parse_timeout(&timeout.timeout)?,
            batch_size,
            kafka_brokers,
            max_channels,
            state: consensus.state,
            consensus_metadata: consensus.metadata,
        })
    }

    /// Write `config` back. Unchanged settings produce no update entries;
    /// existing values keep their mod policies.
    pub fn update_orderer_configuration(&mut self, config: &OrdererConfig) -> Result<()> {
        if config.batch_timeout.is_zero() {
            return Err(Error::Validation("batch timeout must be positive".to_string()));
        }
        if config.batch_size.max_message_count == 0 {
            return Err(Error::Validation("batch size max message count must be positive".to_string()));
        }
        if config.orderer_type == OrdererType::Kafka && config.kafka_brokers.is_empty() {
            return Err(Error::Validation("kafka consensus needs at least one broker".to_string()));
        }

        self.edit("update orderer configuration", |edit| {
            let consensus = ConsensusType {
                consensus_type: config.orderer_type.to_string(),
                metadata: config.consensus_metadata.clone(),
                state: config.state,
            };
            edit.put_payload(
                ORDERER,
                CONSENSUS_TYPE_KEY,
                &ValuePayload::ConsensusType(consensus),
                ADMINS_POLICY_KEY,
            )?;
            edit.put_payload(
                ORDERER,
                BATCH_TIMEOUT_KEY,
                &ValuePayload::BatchTimeout(BatchTimeout {
                    timeout: format_timeout(config.batch_timeout),
                }),
                ADMINS_POLICY_KEY,
            )?;
            edit.put_payload(
                ORDERER,
                BATCH_SIZE_KEY,
                &ValuePayload::BatchSize(config.batch_size.clone()),
                ADMINS_POLICY_KEY,
            )?;

            let has_restrictions = edit.group(ORDERER)?.values.contains_key(CHANNEL_RESTRICTIONS_KEY);
            if config.max_channels > 0 || has_restrictions {
                edit.put_payload(
                    ORDERER,
                    CHANNEL_RESTRICTIONS_KEY,
                    &ValuePayload::ChannelRestrictions(ChannelRestrictions {
                        max_count: config.max_channels,
                    }),
                    ADMINS_POLICY_KEY,
                )?;
            }
            if config.orderer_type == OrdererType::Kafka {
                edit.put_payload(
                    ORDERER,
                    KAFKA_BROKERS_KEY,
                    &ValuePayload::KafkaBrokers(KafkaBrokers {
                        brokers: config.kafka_brokers.clone(),
                    }),
                    ADMINS_POLICY_KEY,
                )?;
            }
            Ok(())
        })
    }

    pub fn orderer_policies(&self) -> Result<BTreeMap<String, Policy>> {
        self.policies_at(ORDERER)
    }

    pub fn add_orderer_policy(&mut self, mod_policy: &str, name: &str, policy: Policy) -> Result<()> {
        self.edit("add orderer policy", |edit| {
            edit.add_policy(ORDERER, mod_policy, name, policy)
        })
    }

    pub fn remove_orderer_policy(&mut self, name: &str) -> Result<()> {
        self.edit("remove orderer policy", |edit| edit.remove_policy(ORDERER, name))
    }

    pub fn orderer_capabilities(&self) -> Result<Vec<String>> {
        self.capabilities_at(ORDERER)
    }

    pub fn add_orderer_capability(&mut self, capability: &str) -> Result<()> {
        self.edit("add orderer capability", |edit| edit.add_capability(ORDERER, capability))
    }

    pub fn remove_orderer_capability(&mut self, capability: &str) -> Result<()> {
        self.edit("remove orderer capability", |edit| {
            edit.remove_capability(ORDERER, capability)
        })
    }

    pub fn orderer_org(&self, name: &str) -> Result<Organization> {
        let group = self.group(&[ORDERER_GROUP_KEY, name])?;
        Organization::from_group(name, group, OrgKind::Orderer)
    }

    pub fn add_orderer_org(&mut self, org: &Organization) -> Result<()> {
        let group = org.to_group(OrgKind::Orderer)?;
        self.edit("add orderer org", |edit| edit.add_group(ORDERER, &org.name, group))
    }

    pub fn remove_orderer_org(&mut self, name: &str) -> Result<()> {
        self.edit("remove orderer org", |edit| edit.remove_group(ORDERER, name))
    }

    pub fn add_orderer_org_policy(
        &mut self,
        org: &str,
        mod_policy: &str,
        name: &str,
        policy: Policy,
    ) -> Result<()> {
        self.edit("add orderer org policy", |edit| {
            edit.add_policy(&[ORDERER_GROUP_KEY, org], mod_policy, name, policy)
        })
    }

    pub fn remove_orderer_org_policy(&mut self, org: &str, name: &str) -> Result<()> {
        self.edit("remove orderer org policy", |edit| {
            edit.remove_policy(&[ORDERER_GROUP_KEY, org], name)
        })
    }

    pub fn orderer_endpoints(&self, org: &str) -> Result<Vec<Address>> {
        Ok(self.orderer_org(org)?.orderer_endpoints)
    }

    pub fn add_orderer_endpoint(&mut self, org: &str, endpoint: Address) -> Result<()> {
        let mut endpoints = self.orderer_endpoints(org)?;
        if endpoints.contains(&endpoint) {
            return Err(Error::already_exists("endpoint", endpoint.to_string()));
        }
        endpoints.push(endpoint);
        self.write_endpoints(org, "add orderer endpoint", &endpoints)
    }

    pub fn remove_orderer_endpoint(&mut self, org: &str, endpoint: &Address) -> Result<()> {
        let mut endpoints = self.orderer_endpoints(org)?;
        let before = endpoints.len();
        endpoints.retain(|e| e != endpoint);
        if endpoints.len() == before {
            return Err(Error::not_found("endpoint", endpoint.to_string()));
        }
        self.write_endpoints(org, "remove orderer endpoint", &endpoints)
    }

    fn write_endpoints(&mut self, org: &str, what: &str, endpoints: &[Address]) -> Result<()> {
        let payload = ValuePayload::Endpoints(OrdererAddresses {
            addresses: endpoints.iter().map(ToString::to_string).collect(),
        });
        self.edit(what, |edit| {
            edit.put_payload(&[ORDERER_GROUP_KEY, org], ENDPOINTS_KEY, &payload, ADMINS_POLICY_KEY)
        })
    }

    /// MSP of an orderer org; `NotFound` when the org has only a placeholder.
    pub fn orderer_msp(&self, org: &str) -> Result<Msp> {
        self.orderer_org(org)?
            .msp
            .ok_or_else(|| Error::not_found("MSP", org))
    }

    /// Replace an orderer org's MSP. The MSP name cannot change.
    pub fn update_orderer_msp(&mut self, org: &str, msp: Msp) -> Result<()> {
        self.update_msp(&[ORDERER_GROUP_KEY, org], OrgKind::Orderer, msp)
    }

    pub(crate) fn update_msp(&mut self, path: &[&str], kind: OrgKind, msp: Msp) -> Result<()> {
        let name = path.last().copied().unwrap_or_default();
        let current = Organization::from_group(name, self.group(path)?, kind)?;
        if let Some(current) = current.msp {
            if current.name != msp.name {
                return Err(Error::Validation(format!(
                    "MSP name of {name} cannot change from {} to {}",
                    current.name, msp.name
                )));
            }
        }
        let payload = ValuePayload::Msp(Box::new(msp));
        self.edit("update MSP", |edit| {
            edit.put_payload(path, MSP_KEY, &payload, ADMINS_POLICY_KEY)
        })
    }
}

/// Parse a duration literal such as `2s`, `500ms` or `1m30s`.
pub(crate) fn parse_timeout(literal: &str) -> Result<Duration> {
    let invalid = || Error::Validation(format!("malformed batch timeout {literal:?}"));
    if literal.is_empty() {
        return Err(invalid());
    }

    let is_number = |c: char| c.is_ascii_digit() || c == '.';
    let mut total = Duration::ZERO;
    let mut rest = literal;
    while !rest.is_empty() {
        let digits = rest.find(|c: char| !is_number(c)).ok_or_else(invalid)?;
        if digits == 0 {
            return Err(invalid());
        }
        let (number, tail) = rest.split_at(digits);
        let unit = tail.find(is_number).unwrap_or(tail.len());
        let unit_nanos: u64 = match &tail[..unit] {
            "ns" => 1,
            "us" | "µs" => 1_000,
            "ms" => 1_000_000,
            "s" => 1_000_000_000,
            "m" => 60_000_000_000,
            "h" => 3_600_000_000_000,
            _ => return Err(invalid()),
        };

        let nanos = match number.parse::<u64>() {
            Ok(whole) => whole.checked_mul(unit_nanos).ok_or_else(invalid)?,
            Err(_) => {
                let amount: f64 = number.parse().map_err(|_| invalid())?;
                let nanos = (amount * unit_nanos as f64).round();
                if !nanos.is_finite() || nanos >= u64::MAX as f64 {
                    return Err(invalid());
                }
                nanos as u64
            }
        };
        total = total
            .checked_add(Duration::from_nanos(nanos))
            .ok_or_else(invalid)?;
        rest = &tail[unit..];
    }
    Ok(total)
}

/// Render a duration the way [`parse_timeout`] reads it: `15s`, `1m30s`,
/// `500ms`.
pub(crate) fn format_timeout(duration: Duration) -> String {
    let nanos = duration.as_nanos();
    match nanos {
        0 => return "0s".to_string(),
        1..=999 => return format!("{nanos}ns"),
        1_000..=999_999 => return format!("{}µs", decimal(nanos, 1_000)),
        1_000_000..=999_999_999 => return format!("{}ms", decimal(nanos, 1_000_000)),
        _ => {}
    }

    let secs = duration.as_secs();
    let (hours, minutes) = (secs / 3600, secs / 60 % 60);
    let seconds = decimal(
        u128::from(secs % 60) * 1_000_000_000 + u128::from(duration.subsec_nanos()),
        1_000_000_000,
    );
    match (hours, minutes) {
        (0, 0) => format!("{seconds}s"),
        (0, _) => format!("{minutes}m{seconds}s"),
        _ => format!("{hours}h{minutes}m{seconds}s"),
    }
}

fn decimal(value: u128, unit: u128) -> String {
    let (whole, frac) = (value / unit, value % unit);
    if frac == 0 {
        return whole.to_string();
    }
    let width = unit.ilog10() as usize;
    let digits = format!("{frac:0width$}");
    format!("{whole}.{}", digits.trim_end_matches('0'))
}
