//! Signature verification against the creator certificate.

use crate::envelope::{ConfigSignature, Envelope, Payload, SerializedIdentity, SignatureHeader};
use crate::error::{Error, Result};
use chanconf_msp::Certificate;
use ed25519_dalek::{Signature, Verifier};
use tracing::warn;

fn rejected(reason: String) -> Error {
    warn!(%reason, "rejected signature");
    Error::Verification(reason)
}

/// Check `signature` over `header || message` against the creator named in
/// `header`, returning the creator.
fn verify_with_creator(header: &[u8], message: &[u8], signature: &[u8]) -> Result<SerializedIdentity> {
    let header = SignatureHeader::decode(header)?;
    let creator = SerializedIdentity::decode(&header.creator)?;

    let pem = std::str::from_utf8(&creator.id_bytes)
        .map_err(|_| rejected(format!("creator of {} is not a PEM certificate", creator.mspid)))?;
    let public_key = Certificate::from_pem(pem)?
        .ed25519_public_key()
        .ok_or_else(|| rejected(format!("certificate of {} has no Ed25519 key", creator.mspid)))?;

    let signature: [u8; 64] = signature
        .try_into()
        .map_err(|_| rejected(format!("signature by {} is not 64 bytes", creator.mspid)))?;

    public_key
        .verify(message, &Signature::from_bytes(&signature))
        .map_err(|_| rejected(format!("bad signature by {}", creator.mspid)))?;
    Ok(creator)
}

/// Verify a config signature over the encoded update bytes.
pub fn verify_config_signature(
    config_update: &[u8],
    signature: &ConfigSignature,
) -> Result<SerializedIdentity> {
    let mut message = signature.signature_header.clone();
    message.extend_from_slice(config_update);
    verify_with_creator(&signature.signature_header, &message, &signature.signature)
}

/// Verify the submitter signature of an envelope, returning its payload.
pub fn verify_envelope(envelope: &Envelope) -> Result<Payload> {
    if !envelope.is_signed() {
        return Err(rejected("envelope is unsigned".to_string()));
    }
    let payload = envelope.payload()?;
    verify_with_creator(
        &payload.header.signature_header,
        &envelope.payload,
        &envelope.signature,
    )?;

    let channel_header = payload.channel_header()?;
    let expected = SignatureHeader::decode(&payload.header.signature_header)?.tx_id();
    if channel_header.tx_id != expected {
        return Err(rejected(format!(
            "tx id {} does not match signature header",
            channel_header.tx_id
        )));
    }
    Ok(payload)
}
