//! Certificates and revocation lists, held as structurally checked DER.

use crate::der::{self, KeyAlgorithm};
use crate::error::{Error, Result};
use crate::pem;
use ed25519_dalek::VerifyingKey;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

const CERTIFICATE_LABEL: &str = "CERTIFICATE";
const CRL_LABEL: &str = "X509 CRL";

/// An X.509 certificate.
///
/// Construction guarantees the DER framing is sound; the contents are not
/// otherwise interpreted beyond locating the subject key algorithm.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Certificate {
    der: Vec<u8>,
}

impl Certificate {
    /// Wrap DER bytes after checking their framing.
    pub fn from_der(der: Vec<u8>) -> Result<Self> {
        der::expect_signed_sequence(&der).map_err(Error::Certificate)?;
        Ok(Self { der })
    }

    /// Parse a single PEM `CERTIFICATE` block.
    pub fn from_pem(pem: &str) -> Result<Self> {
        let block = pem::parse_one(pem)?;
        if block.label != CERTIFICATE_LABEL {
            return Err(Error::Certificate(format!(
                "expected {CERTIFICATE_LABEL} block, found {}",
                block.label
            )));
        }
        Self::from_der(block.contents)
    }

    /// Raw DER bytes.
    pub fn der(&self) -> &[u8] {
        &self.der
    }

    /// PEM encoding.
    pub fn to_pem(&self) -> String {
        pem::encode(CERTIFICATE_LABEL, &self.der)
    }

    /// Algorithm of the subject public key.
    pub fn key_algorithm(&self) -> KeyAlgorithm {
        KeyAlgorithm::of_certificate(&self.der)
    }

    /// The subject public key, when it is an Ed25519 key.
    pub fn ed25519_public_key(&self) -> Option<VerifyingKey> {
        let bytes = der::ed25519_subject_key(&self.der)?;
        VerifyingKey::from_bytes(&bytes).ok()
    }
}

impl fmt::Debug for Certificate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Certificate")
            .field("key_algorithm", &self.key_algorithm())
            .field("der_len", &self.der.len())
            .finish()
    }
}

impl Serialize for Certificate {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_pem())
    }
}

impl<'de> Deserialize<'de> for Certificate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let pem = String::deserialize(deserializer)?;
        Self::from_pem(&pem).map_err(de::Error::custom)
    }
}

/// An X.509 certificate revocation list.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct RevocationList {
    der: Vec<u8>,
}

impl RevocationList {
    /// Wrap DER bytes after checking their framing.
    pub fn from_der(der: Vec<u8>) -> Result<Self> {
        der::expect_signed_sequence(&der).map_err(Error::Certificate)?;
        Ok(Self { der })
    }

    /// Parse a single PEM `X509 CRL` block.
    pub fn from_pem(pem: &str) -> Result<Self> {
        let block = pem::parse_one(pem)?;
        if block.label != CRL_LABEL {
            return Err(Error::Certificate(format!(
                "expected {CRL_LABEL} block, found {}",
                block.label
            )));
        }
        Self::from_der(block.contents)
    }

    /// Raw DER bytes.
    pub fn der(&self) -> &[u8] {
        &self.der
    }

    /// PEM encoding.
    pub fn to_pem(&self) -> String {
        pem::encode(CRL_LABEL, &self.der)
    }
}

impl fmt::Debug for RevocationList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RevocationList")
            .field("der_len", &self.der.len())
            .finish()
    }
}

impl Serialize for RevocationList {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_pem())
    }
}

impl<'de> Deserialize<'de> for RevocationList {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let pem = String::deserialize(deserializer)?;
        Self::from_pem(&pem).map_err(de::Error::custom)
    }
}
