//! PEM armor decoding and encoding.
//!
//! Only the armor is handled here: `-----BEGIN <label>-----`, a base64 body
//! and the matching `-----END <label>-----` line. Headers inside the armor
//! (RFC 1421 style) are not supported.

use crate::error::{Error, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;

const BEGIN: &str = "-----BEGIN ";
const END: &str = "-----END ";
const DASHES: &str = "-----";
const LINE_WIDTH: usize = 64;

/// One decoded PEM block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PemBlock {
    /// The armor label, e.g. `CERTIFICATE`.
    pub label: String,
    /// The decoded body.
    pub contents: Vec<u8>,
}

/// Decode every PEM block in `input`, in order.
///
/// Text outside the armor is ignored.
pub fn parse_all(input: &str) -> Result<Vec<PemBlock>> {
    let mut blocks = Vec::new();
    let mut rest = input;

    while let Some(start) = rest.find(BEGIN) {
        let after_begin = &rest[start + BEGIN.len()..];
        let label_end = after_begin
            .find(DASHES)
            .ok_or_else(|| Error::Pem("unterminated BEGIN line".to_string()))?;
        let label = &after_begin[..label_end];
        let body = &after_begin[label_end + DASHES.len()..];

        let end_marker = format!("{END}{label}{DASHES}");
        let body_end = body
            .find(&end_marker)
            .ok_or_else(|| Error::Pem(format!("missing END line for {label}")))?;

        let encoded: String = body[..body_end]
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect();
        let contents = STANDARD
            .decode(encoded.as_bytes())
            .map_err(|e| Error::Pem(format!("{label}: {e}")))?;
        if contents.is_empty() {
            return Err(Error::Pem(format!("{label}: empty body")));
        }

        blocks.push(PemBlock {
            label: label.to_string(),
            contents,
        });
        rest = &body[body_end + end_marker.len()..];
    }

    Ok(blocks)
}

/// Decode exactly one PEM block from `input`.
pub fn parse_one(input: &str) -> Result<PemBlock> {
    let mut blocks = parse_all(input)?;
    match blocks.len() {
        0 => Err(Error::Pem("no PEM block found".to_string())),
        1 => Ok(blocks.remove(0)),
        n => Err(Error::Pem(format!("expected one PEM block, found {n}"))),
    }
}

/// Encode `contents` as a PEM block with 64-column body lines.
pub fn encode(label: &str, contents: &[u8]) -> String {
    let body = STANDARD.encode(contents);
    let mut out = String::with_capacity(body.len() + body.len() / LINE_WIDTH + 2 * label.len() + 32);

    out.push_str(BEGIN);
    out.push_str(label);
    out.push_str(DASHES);
    out.push('\n');
    for line in body.as_bytes().chunks(LINE_WIDTH) {
        // base64 output is ASCII
        out.push_str(std::str::from_utf8(line).unwrap_or_default());
        out.push('\n');
    }
    out.push_str(END);
    out.push_str(label);
    out.push_str(DASHES);
    out.push('\n');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_then_parse() {
        let data: Vec<u8> = (0u8..=200).collect();
        let pem = encode("TEST DATA", &data);

        assert!(pem.starts_with("-----BEGIN TEST DATA-----\n"));
        assert!(pem.lines().all(|l| l.len() <= LINE_WIDTH));

        let block = parse_one(&pem).unwrap();
        assert_eq!(block.label, "TEST DATA");
        assert_eq!(block.contents, data);
    }

    #[test]
    fn parse_multiple_blocks_with_noise() {
        let input = format!(
            "leading text\n{}between\n{}",
            encode("A", b"first"),
            encode("B", b"second")
        );
        let blocks = parse_all(&input).unwrap();
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].label, "A");
        assert_eq!(blocks[1].contents, b"second");
    }

    #[test]
    fn missing_end_line() {
        let err = parse_all("-----BEGIN CERTIFICATE-----\nAAAA\n").unwrap_err();
        assert!(matches!(err, Error::Pem(_)));
    }

    #[test]
    fn bad_base64() {
        let err = parse_all("-----BEGIN X-----\n!!!!\n-----END X-----\n").unwrap_err();
        assert!(matches!(err, Error::Pem(_)));
    }

    #[test]
    fn parse_one_rejects_zero_and_many() {
        assert!(parse_one("nothing here").is_err());
        let two = format!("{}{}", encode("A", b"1"), encode("A", b"2"));
        assert!(parse_one(&two).is_err());
    }
}
