//! Chanconf
//!
//! Edit a channel's configuration and produce the minimal signed update
//! that takes the committed config to the edited one.
//!
//! # Session
//!
//! ```text
//!   committed Config ──► ConfigTx::new ──► edits (add_application_org, ...)
//!                                              │
//!                              compute_update  ▼
//!                        ConfigUpdate { read_set, write_set }
//!                                              │
//!                  SigningIdentity::sign_config_update (one per admin)
//!                                              ▼
//!                ConfigUpdateEnvelope ──► sign_envelope ──► Envelope
//! ```
//!
//! Every edit on a [`ConfigTx`] either applies fully or leaves the session
//! unchanged, and the working config always carries the versions the update
//! would commit. Removing an entry and adding one of the same name in one
//! session is treated as a fresh addition.
//!
//! # Channel creation
//!
//! [`create_channel_update`] and [`new_create_channel_tx`] build the update
//! for a channel that has no committed config yet, from a [`Channel`]
//! descriptor.
//!
//! # Authorization
//!
//! [`ConfigTx::authorize`] lists the policies an update needs and evaluates
//! them against the committed config, with leaf signature policies decided
//! by the caller.

mod application;
mod authorize;
mod channel;
mod config_tx;
mod consortiums;
mod create;
mod error;
mod orderer;
mod organization;

pub use authorize::{authorize_update, Authorization};
pub use config_tx::ConfigTx;
pub use consortiums::Consortium;
pub use create::{create_channel_update, new_create_channel_tx, Application, Channel};
pub use error::{Error, Result};
pub use orderer::{OrdererConfig, OrdererType};
pub use organization::{Address, Organization};

pub use chanconf_msp::Msp;
pub use chanconf_policy::{PolicyPath, SignatureSatisfier};
pub use chanconf_sign::{
    verify_config_signature, verify_envelope, ConfigSignature, ConfigUpdateEnvelope, Envelope,
    SignerConfig, SigningIdentity,
};
pub use chanconf_tree::payload::{BatchSize, ConsensusState};
pub use chanconf_tree::render::{config_to_json, update_to_json};
pub use chanconf_tree::{schema, Config, ConfigGroup, ConfigUpdate, Policy};
pub use chanconf_update::apply_update;
