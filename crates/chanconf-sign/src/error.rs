//! Error types for chanconf-sign.

use chanconf_msp::KeyAlgorithm;
use thiserror::Error;

/// Result type for chanconf-sign operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while signing or verifying.
#[derive(Debug, Error)]
pub enum Error {
    /// A signing identity needs an MSP identifier.
    #[error("signing identity has an empty MSP id")]
    EmptyMspId,

    /// Only Ed25519 keys can sign.
    #[error("unsupported signing key type {algorithm}")]
    UnsupportedKey { algorithm: KeyAlgorithm },

    /// The private key does not belong to the certificate.
    #[error("private key does not match the certificate of {msp_id}")]
    KeyMismatch { msp_id: String },

    /// A signature or creator failed verification.
    #[error("verification failed: {0}")]
    Verification(String),

    /// Message encoding failed.
    #[error(transparent)]
    Tree(#[from] chanconf_tree::Error),

    /// Certificate or key material is malformed.
    #[error(transparent)]
    Msp(#[from] chanconf_msp::Error),
}
