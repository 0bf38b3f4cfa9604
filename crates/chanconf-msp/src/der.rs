//! Just enough DER to check framing and recognize key algorithms.
//!
//! Full X.509 path validation belongs to the crypto provider. Here we only
//! confirm that a blob is a single, correctly framed SEQUENCE and walk far
//! enough into certificates and PKCS#8 keys to read their key algorithm.

use serde::{Deserialize, Serialize};

const TAG_INTEGER: u8 = 0x02;
const TAG_BIT_STRING: u8 = 0x03;
const TAG_OCTET_STRING: u8 = 0x04;
const TAG_OID: u8 = 0x06;
const TAG_SEQUENCE: u8 = 0x30;
/// `[0] EXPLICIT Version` of a TBSCertificate.
const TAG_CERT_VERSION: u8 = 0xa0;

/// `id-Ed25519` (1.3.101.112).
pub(crate) const OID_ED25519: &[u8] = &[0x2b, 0x65, 0x70];

/// `id-ecPublicKey` (1.2.840.10045.2.1).
pub(crate) const OID_EC_PUBLIC_KEY: &[u8] = &[0x2a, 0x86, 0x48, 0xce, 0x3d, 0x02, 0x01];

/// `rsaEncryption` (1.2.840.113549.1.1.1).
pub(crate) const OID_RSA_ENCRYPTION: &[u8] = &[0x2a, 0x86, 0x48, 0x86, 0xf7, 0x0d, 0x01, 0x01, 0x01];

/// Key algorithm families recognized in certificates and keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyAlgorithm {
    Ed25519,
    Ecdsa,
    Rsa,
    Unknown,
}

impl KeyAlgorithm {
    /// Family named by an AlgorithmIdentifier OID (content bytes only).
    pub(crate) fn from_oid(oid: &[u8]) -> Self {
        match oid {
            OID_ED25519 => Self::Ed25519,
            OID_EC_PUBLIC_KEY => Self::Ecdsa,
            OID_RSA_ENCRYPTION => Self::Rsa,
            _ => Self::Unknown,
        }
    }

    /// Subject key algorithm of a DER certificate.
    pub(crate) fn of_certificate(der: &[u8]) -> Self {
        subject_public_key_info(der)
            .and_then(algorithm_identifier)
            .map_or(Self::Unknown, |(oid, _)| Self::from_oid(oid))
    }
}

impl std::fmt::Display for KeyAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Ed25519 => "Ed25519",
            Self::Ecdsa => "ECDSA",
            Self::Rsa => "RSA",
            Self::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

/// Read one TLV, returning `(tag, value, rest)`.
pub(crate) fn read_tlv(input: &[u8]) -> Result<(u8, &[u8], &[u8]), String> {
    let (&tag, after_tag) = input.split_first().ok_or("truncated tag")?;
    let (&first, after_len) = after_tag.split_first().ok_or("truncated length")?;

    let (len, body) = if first < 0x80 {
        (first as usize, after_len)
    } else {
        let count = (first & 0x7f) as usize;
        if count == 0 || count > 4 {
            return Err(format!("unsupported length encoding 0x{first:02x}"));
        }
        if after_len.len() < count {
            return Err("truncated long-form length".to_string());
        }
        let len = after_len[..count]
            .iter()
            .fold(0usize, |acc, b| (acc << 8) | *b as usize);
        (len, &after_len[count..])
    };

    if body.len() < len {
        return Err(format!("value needs {len} bytes, {} available", body.len()));
    }
    Ok((tag, &body[..len], &body[len..]))
}

/// Read one TLV that must carry `tag`, returning `(value, rest)`.
fn expect_tlv<'a>(input: &'a [u8], tag: u8, what: &str) -> Result<(&'a [u8], &'a [u8]), String> {
    let (found, value, rest) = read_tlv(input)?;
    if found != tag {
        return Err(format!("expected {what}, found tag 0x{found:02x}"));
    }
    Ok((value, rest))
}

/// Contents of a certificate's SubjectPublicKeyInfo SEQUENCE.
pub(crate) fn subject_public_key_info(cert: &[u8]) -> Result<&[u8], String> {
    let (certificate, _) = expect_tlv(cert, TAG_SEQUENCE, "Certificate")?;
    let (mut fields, _) = expect_tlv(certificate, TAG_SEQUENCE, "TBSCertificate")?;
    if fields.first() == Some(&TAG_CERT_VERSION) {
        fields = read_tlv(fields)?.2;
    }
    // serialNumber, signature, issuer, validity, subject
    for _ in 0..5 {
        fields = read_tlv(fields)?.2;
    }
    let (spki, _) = expect_tlv(fields, TAG_SEQUENCE, "SubjectPublicKeyInfo")?;
    Ok(spki)
}

/// Split the AlgorithmIdentifier at the head of `input` into its OID
/// content bytes and whatever follows the identifier.
fn algorithm_identifier(input: &[u8]) -> Result<(&[u8], &[u8]), String> {
    let (identifier, rest) = expect_tlv(input, TAG_SEQUENCE, "AlgorithmIdentifier")?;
    let (oid, _) = expect_tlv(identifier, TAG_OID, "OBJECT IDENTIFIER")?;
    Ok((oid, rest))
}

/// The raw subject key of a certificate, when it is an Ed25519 key.
pub(crate) fn ed25519_subject_key(cert: &[u8]) -> Option<[u8; 32]> {
    let (oid, rest) = algorithm_identifier(subject_public_key_info(cert).ok()?).ok()?;
    if KeyAlgorithm::from_oid(oid) != KeyAlgorithm::Ed25519 {
        return None;
    }
    let (bits, _) = expect_tlv(rest, TAG_BIT_STRING, "subjectPublicKey").ok()?;
    match bits {
        [0, key @ ..] => key.try_into().ok(),
        _ => None,
    }
}

/// Algorithm and `privateKey` contents of a PKCS#8 PrivateKeyInfo.
pub(crate) fn pkcs8_private_key(der: &[u8]) -> Result<(KeyAlgorithm, &[u8]), String> {
    let (info, _) = expect_tlv(der, TAG_SEQUENCE, "PrivateKeyInfo")?;
    let (_, rest) = expect_tlv(info, TAG_INTEGER, "version")?;
    let (oid, rest) = algorithm_identifier(rest)?;
    let (key, _) = expect_tlv(rest, TAG_OCTET_STRING, "privateKey")?;
    Ok((KeyAlgorithm::from_oid(oid), key))
}

/// The 32-byte seed of an Ed25519 `CurvePrivateKey`.
pub(crate) fn ed25519_seed(private_key: &[u8]) -> Option<[u8; 32]> {
    let (seed, rest) = expect_tlv(private_key, TAG_OCTET_STRING, "CurvePrivateKey").ok()?;
    if !rest.is_empty() {
        return None;
    }
    seed.try_into().ok()
}

/// Check that `der` is exactly one SEQUENCE whose first element is also a
/// SEQUENCE (the shape shared by certificates, CRLs and PKCS#8 keys is
/// close enough for the structural check we need).
pub(crate) fn expect_signed_sequence(der: &[u8]) -> Result<(), String> {
    let (tag, value, rest) = read_tlv(der)?;
    if tag != TAG_SEQUENCE {
        return Err(format!("expected SEQUENCE, found tag 0x{tag:02x}"));
    }
    if !rest.is_empty() {
        return Err(format!("{} trailing bytes after SEQUENCE", rest.len()));
    }
    let (inner, _, _) = read_tlv(value)?;
    if inner != TAG_SEQUENCE {
        return Err(format!("expected inner SEQUENCE, found tag 0x{inner:02x}"));
    }
    Ok(())
}

/// Check that `der` is exactly one SEQUENCE.
pub(crate) fn expect_sequence(der: &[u8]) -> Result<(), String> {
    let (tag, _, rest) = read_tlv(der)?;
    if tag != TAG_SEQUENCE {
        return Err(format!("expected SEQUENCE, found tag 0x{tag:02x}"));
    }
    if !rest.is_empty() {
        return Err(format!("{} trailing bytes after SEQUENCE", rest.len()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_and_long_lengths() {
        let short = [0x04, 0x02, 0xaa, 0xbb, 0xff];
        let (tag, value, rest) = read_tlv(&short).unwrap();
        assert_eq!(tag, 0x04);
        assert_eq!(value, &[0xaa, 0xbb]);
        assert_eq!(rest, &[0xff]);

        let mut long = vec![0x30, 0x81, 0x80];
        long.extend(std::iter::repeat(0u8).take(0x80));
        let (_, value, rest) = read_tlv(&long).unwrap();
        assert_eq!(value.len(), 0x80);
        assert!(rest.is_empty());
    }

    #[test]
    fn truncated_value_rejected() {
        assert!(read_tlv(&[0x30, 0x05, 0x00]).is_err());
        assert!(read_tlv(&[0x30]).is_err());
        assert!(read_tlv(&[0x30, 0x85, 0, 0, 0, 0, 1]).is_err());
    }

    #[test]
    fn sequence_checks() {
        assert!(expect_sequence(&[0x30, 0x00]).is_ok());
        assert!(expect_sequence(&[0x31, 0x00]).is_err());
        assert!(expect_sequence(&[0x30, 0x00, 0x00]).is_err());
        assert!(expect_signed_sequence(&[0x30, 0x02, 0x30, 0x00]).is_ok());
        assert!(expect_signed_sequence(&[0x30, 0x02, 0x02, 0x00]).is_err());
    }

    /// A minimal v3 certificate: empty placeholders for serial through
    /// subject, then `spki`, then `extensions` as a trailing [3] field.
    fn certificate(spki: &[u8], extensions: &[u8]) -> Vec<u8> {
        let mut tbs = vec![0xa0, 0x03, 0x02, 0x01, 0x02];
        tbs.extend_from_slice(&[0x02, 0x01, 0x01]);
        for _ in 0..4 {
            tbs.extend_from_slice(&[0x30, 0x00]);
        }
        tbs.extend_from_slice(spki);
        tbs.extend_from_slice(extensions);

        let mut body = tlv(TAG_SEQUENCE, &tbs);
        body.extend_from_slice(&[0x30, 0x00, 0x03, 0x01, 0x00]);
        tlv(TAG_SEQUENCE, &body)
    }

    fn tlv(tag: u8, value: &[u8]) -> Vec<u8> {
        assert!(value.len() < 0x80);
        let mut out = vec![tag, value.len() as u8];
        out.extend_from_slice(value);
        out
    }

    fn spki(oid: &[u8], key: &[u8]) -> Vec<u8> {
        let mut identifier = tlv(TAG_SEQUENCE, &tlv(TAG_OID, oid));
        let mut bits = vec![0u8];
        bits.extend_from_slice(key);
        identifier.extend(tlv(TAG_BIT_STRING, &bits));
        tlv(TAG_SEQUENCE, &identifier)
    }

    #[test]
    fn algorithm_read_from_subject_key_info() {
        let ed = certificate(&spki(OID_ED25519, &[7u8; 32]), &[]);
        assert_eq!(KeyAlgorithm::of_certificate(&ed), KeyAlgorithm::Ed25519);
        assert_eq!(ed25519_subject_key(&ed), Some([7u8; 32]));

        let ec = certificate(&spki(OID_EC_PUBLIC_KEY, &[4u8; 65]), &[]);
        assert_eq!(KeyAlgorithm::of_certificate(&ec), KeyAlgorithm::Ecdsa);
        assert_eq!(ed25519_subject_key(&ec), None);

        assert_eq!(KeyAlgorithm::of_certificate(&[0x30, 0x02, 0x30, 0x00]), KeyAlgorithm::Unknown);
    }

    #[test]
    fn extension_oids_do_not_leak_into_key_algorithm() {
        // RSA subject key, with an extension quoting id-ecPublicKey and a
        // whole Ed25519 key info
        let mut quoted = tlv(TAG_OID, OID_EC_PUBLIC_KEY);
        quoted.extend(spki(OID_ED25519, &[9u8; 32]));
        let extensions = tlv(0xa3, &tlv(TAG_SEQUENCE, &quoted));
        let rsa = certificate(&spki(OID_RSA_ENCRYPTION, &[0x30, 0x00]), &extensions);

        assert_eq!(KeyAlgorithm::of_certificate(&rsa), KeyAlgorithm::Rsa);
        assert_eq!(ed25519_subject_key(&rsa), None);
    }

    #[test]
    fn certificate_without_version_field() {
        let mut cert = certificate(&spki(OID_EC_PUBLIC_KEY, &[4u8; 65]), &[]);
        // strip the [0] version: outer header (2), tbs header (2), version (5)
        cert.drain(4..9);
        cert[1] -= 5;
        cert[3] -= 5;
        assert_eq!(KeyAlgorithm::of_certificate(&cert), KeyAlgorithm::Ecdsa);
    }

    #[test]
    fn pkcs8_fields() {
        let mut info = vec![0x02, 0x01, 0x00];
        info.extend(tlv(TAG_SEQUENCE, &tlv(TAG_OID, OID_ED25519)));
        info.extend(tlv(TAG_OCTET_STRING, &tlv(TAG_OCTET_STRING, &[3u8; 32])));
        let der = tlv(TAG_SEQUENCE, &info);

        let (algorithm, private_key) = pkcs8_private_key(&der).unwrap();
        assert_eq!(algorithm, KeyAlgorithm::Ed25519);
        assert_eq!(ed25519_seed(private_key), Some([3u8; 32]));
        assert!(pkcs8_private_key(&[0x30, 0x02, 0x30, 0x00]).is_err());
    }
}
