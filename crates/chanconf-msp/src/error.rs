//! Error types for chanconf-msp.

use thiserror::Error;

/// Result type for MSP operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while parsing or validating membership material.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    /// PEM armor could not be decoded.
    #[error("invalid PEM: {0}")]
    Pem(String),

    /// A certificate or CRL is not well-formed DER.
    #[error("invalid certificate: {0}")]
    Certificate(String),

    /// Private key material could not be parsed.
    #[error("invalid key material: {0}")]
    Key(String),

    /// The MSP definition is structurally inconsistent.
    #[error("invalid MSP {msp}: {reason}")]
    Validation { msp: String, reason: String },
}
