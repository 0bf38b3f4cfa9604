//! Chanconf MSP
//!
//! The data shape of a membership service provider (MSP): the trusted
//! certificates, revocation lists, organizational units and default signing
//! identity an organization publishes in its channel configuration.
//!
//! # Structural validation only
//!
//! Certificates, CRLs and keys are accepted when their PEM armor decodes and
//! their DER framing is sound. The subject key algorithm is recognized so a
//! signing key can be matched against its certificate. Chain-of-trust
//! validation, expiry and revocation checks belong to the crypto provider
//! and are not performed here.

mod cert;
mod der;
mod error;
mod key;
mod msp;
pub mod pem;

pub use cert::{Certificate, RevocationList};
pub use der::KeyAlgorithm;
pub use error::{Error, Result};
pub use key::PrivateKey;
pub use msp::{
    CryptoConfig, KeyInfo, Msp, NodeOus, OuIdentifier, SigningIdentityInfo, HASH_FAMILIES,
    IDENTIFIER_HASH_FUNCTIONS,
};
