//! The MSP definition carried in an organization's `MSP` config value.

use crate::cert::{Certificate, RevocationList};
use crate::error::{Error, Result};
use crate::key::PrivateKey;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Hash families accepted in [`CryptoConfig::signature_hash_family`].
pub const HASH_FAMILIES: &[&str] = &["SHA2", "SHA3"];

/// Identifier hash functions accepted in
/// [`CryptoConfig::identity_identifier_hash_function`].
pub const IDENTIFIER_HASH_FUNCTIONS: &[&str] = &["SHA256", "SHA384", "SHA3_256", "SHA3_384"];

/// Membership service provider configuration for one organization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Msp {
    /// MSP identifier, e.g. `Org1MSP`.
    pub name: String,
    pub root_certs: Vec<Certificate>,
    pub intermediate_certs: Vec<Certificate>,
    pub admins: Vec<Certificate>,
    pub revocation_list: Vec<RevocationList>,
    /// Default signing identity, if the MSP ships one.
    pub signing_identity: Option<SigningIdentityInfo>,
    pub organizational_unit_identifiers: Vec<OuIdentifier>,
    pub crypto_config: CryptoConfig,
    pub tls_root_certs: Vec<Certificate>,
    pub tls_intermediate_certs: Vec<Certificate>,
    pub node_ous: Option<NodeOus>,
}

/// A signing identity descriptor: public certificate plus key reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SigningIdentityInfo {
    pub public_signer: Certificate,
    pub private_signer: KeyInfo,
}

/// A reference to private key material, optionally carrying the material.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyInfo {
    pub key_identifier: String,
    pub key_material: Option<PrivateKey>,
}

/// An organizational unit scoped to an issuing certificate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OuIdentifier {
    pub certificate: Option<Certificate>,
    pub organizational_unit_identifier: String,
}

/// Hashing choices for signatures and identity identifiers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CryptoConfig {
    pub signature_hash_family: String,
    pub identity_identifier_hash_function: String,
}

impl Default for CryptoConfig {
    fn default() -> Self {
        Self {
            signature_hash_family: "SHA2".to_string(),
            identity_identifier_hash_function: "SHA256".to_string(),
        }
    }
}

/// Node organizational units used to classify identities by role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeOus {
    pub enable: bool,
    pub client_ou_identifier: OuIdentifier,
    pub peer_ou_identifier: OuIdentifier,
    pub admin_ou_identifier: OuIdentifier,
    pub orderer_ou_identifier: OuIdentifier,
}

impl Msp {
    /// An MSP with only a name and default crypto settings.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            root_certs: Vec::new(),
            intermediate_certs: Vec::new(),
            admins: Vec::new(),
            revocation_list: Vec::new(),
            signing_identity: None,
            organizational_unit_identifiers: Vec::new(),
            crypto_config: CryptoConfig::default(),
            tls_root_certs: Vec::new(),
            tls_intermediate_certs: Vec::new(),
            node_ous: None,
        }
    }

    /// Check structural well-formedness.
    ///
    /// Certificates and CRLs are already framing-checked when constructed,
    /// so this covers the relations between the parts: the signing key must
    /// belong to its certificate, OU identifiers must name a certificate, and
    /// the crypto settings must be known values.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(self.invalid("MSP name is empty"));
        }

        if let Some(identity) = &self.signing_identity {
            if identity.private_signer.key_identifier.is_empty() {
                return Err(self.invalid("signing identity has no key identifier"));
            }
            if let Some(key) = &identity.private_signer.key_material {
                let cert_alg = identity.public_signer.key_algorithm();
                if key.algorithm() != cert_alg {
                    return Err(self.invalid(&format!(
                        "signing key is {} but certificate key is {cert_alg}",
                        key.algorithm()
                    )));
                }
                if !key.matches(&identity.public_signer) {
                    return Err(self.invalid("signing key does not belong to the public signer certificate"));
                }
            }
        }

        for ou in &self.organizational_unit_identifiers {
            self.check_ou(ou, "organizational unit")?;
        }

        if let Some(node_ous) = &self.node_ous {
            if node_ous.enable {
                for (role, ou) in [
                    ("client", &node_ous.client_ou_identifier),
                    ("peer", &node_ous.peer_ou_identifier),
                    ("admin", &node_ous.admin_ou_identifier),
                    ("orderer", &node_ous.orderer_ou_identifier),
                ] {
                    self.check_ou(ou, role)?;
                }
            }
        }

        let crypto = &self.crypto_config;
        if !HASH_FAMILIES.contains(&crypto.signature_hash_family.as_str()) {
            return Err(self.invalid(&format!(
                "unknown signature hash family {}",
                crypto.signature_hash_family
            )));
        }
        if !IDENTIFIER_HASH_FUNCTIONS.contains(&crypto.identity_identifier_hash_function.as_str()) {
            return Err(self.invalid(&format!(
                "unknown identity identifier hash function {}",
                crypto.identity_identifier_hash_function
            )));
        }

        Ok(())
    }

    fn check_ou(&self, ou: &OuIdentifier, role: &str) -> Result<()> {
        if ou.organizational_unit_identifier.is_empty() {
            return Err(self.invalid(&format!("{role} OU identifier is empty")));
        }
        if ou.certificate.is_none() {
            return Err(self.invalid(&format!(
                "{role} OU {} does not reference a certificate",
                ou.organizational_unit_identifier
            )));
        }
        Ok(())
    }

    fn invalid(&self, reason: &str) -> Error {
        warn!(msp = %self.name, reason, "MSP definition rejected");
        Error::Validation {
            msp: self.name.clone(),
            reason: reason.to_string(),
        }
    }
}
