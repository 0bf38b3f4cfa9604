//! Chanconf Sign
//!
//! Signatures and transaction envelopes for config updates.
//!
//! # Flow
//!
//! 1. The update author encodes the [`ConfigUpdate`](chanconf_tree::ConfigUpdate)
//!    once and wraps it in a [`ConfigUpdateEnvelope`].
//! 2. Each admin's [`SigningIdentity`] signs `signature_header || config_update`
//!    independently; signers share no state and may work in parallel.
//! 3. Signatures are appended in whatever order they arrive.
//! 4. The submitter wraps the envelope in a [`Payload`] with a `ConfigUpdate`
//!    channel header and signs that.
//!
//! Every signer signs the same canonical update bytes, so the order in which
//! signatures are collected never changes what was signed.
//!
//! Only Ed25519 keys sign. Keys of other algorithms are recognized so that
//! the error names them.

mod config;
mod envelope;
mod error;
mod identity;
mod verify;

pub use config::{SignerConfig, DEFAULT_EPOCH, DEFAULT_NONCE_SIZE, MAX_NONCE_SIZE};
pub use envelope::{
    ChannelHeader, ConfigSignature, ConfigUpdateEnvelope, Envelope, Header, HeaderType, Payload,
    SerializedIdentity, SignatureHeader, Timestamp,
};
pub use error::{Error, Result};
pub use identity::SigningIdentity;
pub use verify::{verify_config_signature, verify_envelope};
