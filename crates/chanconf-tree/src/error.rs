//! Error types for chanconf-tree.

use thiserror::Error;

/// Result type for chanconf-tree operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while reading, editing or encoding a config tree.
#[derive(Debug, Error)]
pub enum Error {
    /// A referenced group, value or policy does not exist.
    #[error("{kind} not found: {name}")]
    NotFound { kind: &'static str, name: String },

    /// An entry with the same name already exists at that level.
    #[error("{kind} already exists: {name}")]
    AlreadyExists { kind: &'static str, name: String },

    /// Malformed input: bad policy rule, wrong payload kind, unknown key.
    #[error("validation failed: {0}")]
    Validation(String),

    /// A payload or message could not be encoded or decoded.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// Embedded MSP definition is invalid.
    #[error(transparent)]
    Msp(#[from] chanconf_msp::Error),
}

impl Error {
    pub fn not_found(kind: &'static str, name: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            name: name.into(),
        }
    }

    pub fn already_exists(kind: &'static str, name: impl Into<String>) -> Self {
        Self::AlreadyExists {
            kind,
            name: name.into(),
        }
    }
}

impl From<bincode::Error> for Error {
    fn from(err: bincode::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
