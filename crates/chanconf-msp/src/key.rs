//! Private key material referenced by an MSP signing identity.

use crate::cert::Certificate;
use crate::der::{self, KeyAlgorithm};
use crate::error::{Error, Result};
use crate::pem;
use ed25519_dalek::{SigningKey, VerifyingKey};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

const PKCS8_LABEL: &str = "PRIVATE KEY";
const SEC1_LABEL: &str = "EC PRIVATE KEY";
const PKCS1_LABEL: &str = "RSA PRIVATE KEY";

/// PKCS#8 v1 prefix for an Ed25519 private key; the 32-byte seed follows.
const ED25519_PKCS8_PREFIX: [u8; 16] = [
    0x30, 0x2e, 0x02, 0x01, 0x00, 0x30, 0x05, 0x06, 0x03, 0x2b, 0x65, 0x70, 0x04, 0x22, 0x04, 0x20,
];

/// Private key material.
///
/// Ed25519 keys are decoded and usable for signing. Other algorithms are
/// recognized and carried verbatim so an MSP definition can round-trip
/// them, but they cannot sign.
#[derive(Clone)]
pub enum PrivateKey {
    Ed25519(SigningKey),
    Other {
        algorithm: KeyAlgorithm,
        label: String,
        der: Vec<u8>,
    },
}

impl PrivateKey {
    /// Parse a PEM private key (`PRIVATE KEY`, `EC PRIVATE KEY` or
    /// `RSA PRIVATE KEY`).
    pub fn from_pem(pem: &str) -> Result<Self> {
        let block = pem::parse_one(pem)?;
        der::expect_sequence(&block.contents).map_err(Error::Key)?;

        match block.label.as_str() {
            PKCS8_LABEL => Self::from_pkcs8(block.contents),
            SEC1_LABEL => Ok(Self::Other {
                algorithm: KeyAlgorithm::Ecdsa,
                label: block.label,
                der: block.contents,
            }),
            PKCS1_LABEL => Ok(Self::Other {
                algorithm: KeyAlgorithm::Rsa,
                label: block.label,
                der: block.contents,
            }),
            other => Err(Error::Key(format!("unsupported PEM label {other}"))),
        }
    }

    fn from_pkcs8(der: Vec<u8>) -> Result<Self> {
        let (algorithm, private_key) = der::pkcs8_private_key(&der).map_err(Error::Key)?;
        if algorithm == KeyAlgorithm::Ed25519 {
            let seed = der::ed25519_seed(private_key)
                .ok_or_else(|| Error::Key("Ed25519 PKCS#8 key without a 32-byte seed".to_string()))?;
            return Ok(Self::Ed25519(SigningKey::from_bytes(&seed)));
        }

        Ok(Self::Other {
            algorithm,
            label: PKCS8_LABEL.to_string(),
            der,
        })
    }

    /// The key's algorithm family.
    pub fn algorithm(&self) -> KeyAlgorithm {
        match self {
            Self::Ed25519(_) => KeyAlgorithm::Ed25519,
            Self::Other { algorithm, .. } => *algorithm,
        }
    }

    /// The signing key, when this is an Ed25519 key.
    pub fn signing_key(&self) -> Option<&SigningKey> {
        match self {
            Self::Ed25519(key) => Some(key),
            Self::Other { .. } => None,
        }
    }

    /// The public half, when this is an Ed25519 key.
    pub fn verifying_key(&self) -> Option<VerifyingKey> {
        self.signing_key().map(SigningKey::verifying_key)
    }

    /// Whether this key belongs with `cert`.
    ///
    /// Ed25519 keys must match the certificate's public key exactly; for
    /// other algorithms only the key type can be compared.
    pub fn matches(&self, cert: &Certificate) -> bool {
        match self {
            Self::Ed25519(key) => cert.ed25519_public_key() == Some(key.verifying_key()),
            Self::Other { algorithm, .. } => *algorithm == cert.key_algorithm(),
        }
    }

    /// PEM encoding (PKCS#8 for Ed25519, the original block otherwise).
    pub fn to_pem(&self) -> String {
        match self {
            Self::Ed25519(key) => {
                let mut der = Vec::with_capacity(ED25519_PKCS8_PREFIX.len() + 32);
                der.extend_from_slice(&ED25519_PKCS8_PREFIX);
                der.extend_from_slice(&key.to_bytes());
                pem::encode(PKCS8_LABEL, &der)
            }
            Self::Other { label, der, .. } => pem::encode(label, der),
        }
    }
}

impl From<SigningKey> for PrivateKey {
    fn from(key: SigningKey) -> Self {
        Self::Ed25519(key)
    }
}

impl PartialEq for PrivateKey {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Ed25519(a), Self::Ed25519(b)) => a.to_bytes() == b.to_bytes(),
            (
                Self::Other { label: la, der: da, .. },
                Self::Other { label: lb, der: db, .. },
            ) => la == lb && da == db,
            _ => false,
        }
    }
}

impl Eq for PrivateKey {}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // never print key bytes
        f.debug_struct("PrivateKey")
            .field("algorithm", &self.algorithm())
            .finish_non_exhaustive()
    }
}

impl Serialize for PrivateKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_pem())
    }
}

impl<'de> Deserialize<'de> for PrivateKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let pem = String::deserialize(deserializer)?;
        Self::from_pem(&pem).map_err(de::Error::custom)
    }
}
