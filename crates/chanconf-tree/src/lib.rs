//! Chanconf Tree
//!
//! The channel configuration as a versioned tree of groups, values and
//! policies.
//!
//! ```text
//! Channel
//! ├── Orderer        ConsensusType, BatchSize, ... ; Admins, Readers, ...
//! │   └── OrdererOrg MSP, Endpoints
//! ├── Application    ACLs, Capabilities
//! │   └── Org1       MSP, AnchorPeers
//! └── Consortiums
//!     └── SampleConsortium  ChannelCreationPolicy
//!         └── Org1   MSP
//! ```
//!
//! # Versions
//!
//! Every group, value and policy carries a version. A leaf's version goes up
//! by one when its content or mod policy changes; a group's version goes up
//! only when its own entry changes (mod policy, or the set of its direct
//! children). Changes deeper in a subtree leave ancestors alone.
//!
//! # Canonical encoding
//!
//! All maps are `BTreeMap`, and messages are encoded with bincode, so the
//! bytes of a tree or [`ConfigUpdate`] are a function of its content alone.
//! Independent signers of the same logical update sign identical bytes.

pub mod encoding;
mod error;
pub mod payload;
mod policy;
pub mod render;
pub mod schema;
mod tree;
mod update;

pub use error::{Error, Result};
pub use payload::ValuePayload;
pub use policy::{
    ImplicitMetaPolicy, ImplicitMetaRule, Policy, SignaturePolicy, IMPLICIT_META_POLICY_TYPE,
    SIGNATURE_POLICY_TYPE,
};
pub use schema::{Scope, ValueKind};
pub use tree::{Config, ConfigGroup, ConfigPolicy, ConfigValue};
pub use update::ConfigUpdate;
