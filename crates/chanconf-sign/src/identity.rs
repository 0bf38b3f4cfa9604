//! Signing identities.

use crate::config::SignerConfig;
use crate::envelope::{
    ChannelHeader, ConfigSignature, ConfigUpdateEnvelope, Envelope, Header, Payload,
    SerializedIdentity, SignatureHeader,
};
use crate::error::{Error, Result};
use chanconf_msp::{Certificate, KeyAlgorithm, PrivateKey};
use chanconf_tree::ConfigUpdate;
use ed25519_dalek::{Signer, SigningKey};
use rand::rngs::OsRng;
use rand::RngCore;
use tracing::{debug, info};

/// An MSP member able to sign: MSP id, certificate and matching private key.
#[derive(Clone)]
pub struct SigningIdentity {
    msp_id: String,
    certificate: Certificate,
    key: SigningKey,
}

impl std::fmt::Debug for SigningIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SigningIdentity")
            .field("msp_id", &self.msp_id)
            .field("certificate", &self.certificate)
            .finish_non_exhaustive()
    }
}

impl SigningIdentity {
    /// Bind `key` to `certificate` under `msp_id`.
    ///
    /// Fails when the MSP id is empty, the key is not Ed25519, or the key is
    /// not the certificate's.
    pub fn new(msp_id: impl Into<String>, certificate: Certificate, key: PrivateKey) -> Result<Self> {
        let msp_id = msp_id.into();
        if msp_id.is_empty() {
            return Err(Error::EmptyMspId);
        }
        let PrivateKey::Ed25519(signing_key) = &key else {
            return Err(Error::UnsupportedKey {
                algorithm: key.algorithm(),
            });
        };
        if certificate.key_algorithm() != KeyAlgorithm::Ed25519 || !key.matches(&certificate) {
            return Err(Error::KeyMismatch { msp_id });
        }

        Ok(Self {
            key: signing_key.clone(),
            msp_id,
            certificate,
        })
    }

    /// Parse PEM certificate and key, then bind them.
    pub fn from_pem(msp_id: impl Into<String>, cert_pem: &str, key_pem: &str) -> Result<Self> {
        Self::new(
            msp_id,
            Certificate::from_pem(cert_pem)?,
            PrivateKey::from_pem(key_pem)?,
        )
    }

    pub fn msp_id(&self) -> &str {
        &self.msp_id
    }

    pub fn certificate(&self) -> &Certificate {
        &self.certificate
    }

    /// The encoded creator: MSP id plus PEM certificate.
    pub fn creator(&self) -> Result<Vec<u8>> {
        SerializedIdentity {
            mspid: self.msp_id.clone(),
            id_bytes: self.certificate.to_pem().into_bytes(),
        }
        .encode()
    }

    /// A signature header with a fresh nonce of the configured length.
    pub fn signature_header(&self, config: &SignerConfig) -> Result<SignatureHeader> {
        let mut nonce = vec![0u8; config.nonce_size];
        OsRng.fill_bytes(&mut nonce);
        Ok(SignatureHeader {
            creator: self.creator()?,
            nonce,
        })
    }

    /// Raw Ed25519 signature over `message`.
    pub fn sign(&self, message: &[u8]) -> Vec<u8> {
        self.key.sign(message).to_bytes().to_vec()
    }

    /// Sign `update`: the signature covers `signature_header || config_update`.
    pub fn sign_config_update(
        &self,
        update: &ConfigUpdate,
        config: &SignerConfig,
    ) -> Result<ConfigSignature> {
        let signature_header = self.signature_header(config)?.encode()?;
        let mut message = signature_header.clone();
        message.extend_from_slice(&update.encode()?);

        debug!(msp_id = %self.msp_id, channel = %update.channel_id, "signed config update");
        Ok(ConfigSignature {
            signature: self.sign(&message),
            signature_header,
        })
    }

    /// Wrap `update_envelope` in a payload for `channel_id` and sign it as
    /// the submitter.
    pub fn sign_envelope(
        &self,
        update_envelope: &ConfigUpdateEnvelope,
        channel_id: &str,
        config: &SignerConfig,
    ) -> Result<Envelope> {
        let signature_header = self.signature_header(config)?;
        let channel_header =
            ChannelHeader::config_update(channel_id, signature_header.tx_id(), config.epoch);

        let payload = Payload {
            header: Header {
                channel_header: channel_header.encode()?,
                signature_header: signature_header.encode()?,
            },
            data: update_envelope.encode()?,
        }
        .encode()?;

        info!(
            msp_id = %self.msp_id,
            channel = %channel_id,
            tx_id = %channel_header.tx_id,
            signatures = update_envelope.signatures.len(),
            "created signed config update envelope"
        );
        Ok(Envelope {
            signature: self.sign(&payload),
            payload,
        })
    }
}
