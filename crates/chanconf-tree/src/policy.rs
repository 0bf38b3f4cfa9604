//! Policy definitions stored in config policies and the
//! `ChannelCreationPolicy` value.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fmt;
use std::str::FromStr;

/// Wire type number of a signature policy.
pub const SIGNATURE_POLICY_TYPE: u32 = 1;

/// Wire type number of an implicit meta policy.
pub const IMPLICIT_META_POLICY_TYPE: u32 = 3;

/// An access-control policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Policy {
    /// A leaf policy over signer identities, kept as its rule text.
    Signature(SignaturePolicy),
    /// A threshold over the same-named policy of each child group.
    ImplicitMeta(ImplicitMetaPolicy),
}

/// A leaf signature policy, e.g. `OR('Org1MSP.admin')`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignaturePolicy {
    pub rule: String,
}

/// `{rule, sub_policy}` as in `MAJORITY Admins`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImplicitMetaPolicy {
    pub rule: ImplicitMetaRule,
    pub sub_policy: String,
}

/// Threshold rule of an implicit meta policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ImplicitMetaRule {
    Any,
    All,
    Majority,
}

impl Policy {
    /// Parse an implicit meta rule string such as `"ANY Readers"`.
    pub fn implicit_meta(rule: &str) -> Result<Self> {
        rule.parse().map(Self::ImplicitMeta)
    }

    /// A signature policy with the given rule text.
    pub fn signature(rule: impl Into<String>) -> Result<Self> {
        let rule = rule.into();
        if rule.trim().is_empty() {
            return Err(Error::Validation("signature policy rule is empty".to_string()));
        }
        Ok(Self::Signature(SignaturePolicy { rule }))
    }

    /// Wire type number.
    pub fn type_number(&self) -> u32 {
        match self {
            Self::Signature(_) => SIGNATURE_POLICY_TYPE,
            Self::ImplicitMeta(_) => IMPLICIT_META_POLICY_TYPE,
        }
    }

    /// JSON rendering as `{"type": n, "value": {...}}`.
    pub fn to_json(&self) -> Value {
        let value = match self {
            Self::Signature(sig) => json!({ "rule": sig.rule }),
            Self::ImplicitMeta(meta) => json!({
                "rule": meta.rule.as_str(),
                "sub_policy": meta.sub_policy,
            }),
        };
        json!({ "type": self.type_number(), "value": value })
    }
}

impl fmt::Display for Policy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Signature(sig) => f.write_str(&sig.rule),
            Self::ImplicitMeta(meta) => write!(f, "{meta}"),
        }
    }
}

impl FromStr for ImplicitMetaPolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let mut parts = s.split_whitespace();
        let (Some(rule), Some(sub_policy), None) = (parts.next(), parts.next(), parts.next()) else {
            return Err(Error::Validation(format!(
                "implicit meta rule must be '<ANY|ALL|MAJORITY> <SubPolicy>', got {s:?}"
            )));
        };
        Ok(Self {
            rule: rule.parse()?,
            sub_policy: sub_policy.to_string(),
        })
    }
}

impl fmt::Display for ImplicitMetaPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.rule.as_str(), self.sub_policy)
    }
}

impl ImplicitMetaRule {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Any => "ANY",
            Self::All => "ALL",
            Self::Majority => "MAJORITY",
        }
    }
}

impl FromStr for ImplicitMetaRule {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "ANY" => Ok(Self::Any),
            "ALL" => Ok(Self::All),
            "MAJORITY" => Ok(Self::Majority),
            other => Err(Error::Validation(format!("unknown implicit meta rule {other:?}"))),
        }
    }
}
