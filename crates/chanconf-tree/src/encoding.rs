//! Canonical binary encoding.
//!
//! Fixed-width little-endian bincode: deterministic for a given value, and
//! every map in the tree is a `BTreeMap`, so equal content always yields
//! equal bytes. Decoding rejects trailing bytes, so one value has exactly one
//! accepted encoding.

use crate::error::Result;
use bincode::Options;
use serde::de::DeserializeOwned;
use serde::Serialize;

fn options() -> impl Options {
    bincode::DefaultOptions::new()
        .with_fixint_encoding()
        .reject_trailing_bytes()
}

pub fn encode<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>> {
    Ok(options().serialize(value)?)
}

pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    Ok(options().deserialize(bytes)?)
}
