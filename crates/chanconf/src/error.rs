//! Error types for chanconf.
//!
//! Errors from the lower crates are flattened into one taxonomy, so callers
//! match on what went wrong rather than on which layer noticed it.

use thiserror::Error;

/// Result type for chanconf operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by config sessions and channel creation.
#[derive(Debug, Error)]
pub enum Error {
    /// A referenced org, policy, capability, value, anchor peer, endpoint or
    /// ACL does not exist.
    #[error("{kind} not found: {name}")]
    NotFound { kind: &'static str, name: String },

    /// An entry with the same name is already present.
    #[error("{kind} already exists: {name}")]
    AlreadyExists { kind: &'static str, name: String },

    /// Malformed input: policy rule, consensus type, batch timeout,
    /// certificate or key material, payload kind.
    #[error("validation failed: {0}")]
    Validation(String),

    /// Base and edited configs belong to different channels.
    #[error("channel mismatch: base is {base:?}, update is for {updated:?}")]
    ChannelMismatch { base: String, updated: String },

    /// A payload or message could not be encoded or decoded.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// Signing or verification failed.
    #[error(transparent)]
    Signing(chanconf_sign::Error),

    /// An update's read set does not match the config it is applied to.
    #[error("version conflict at {path}: {reason}")]
    VersionConflict { path: String, reason: String },
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

impl From<chanconf_tree::Error> for Error {
    fn from(err: chanconf_tree::Error) -> Self {
        use chanconf_tree::Error as E;
        match err {
            E::NotFound { kind, name } => Self::NotFound { kind, name },
            E::AlreadyExists { kind, name } => Self::AlreadyExists { kind, name },
            E::Validation(reason) => Self::Validation(reason),
            E::Serialization(reason) => Self::Serialization(reason),
            E::Msp(err) => err.into(),
        }
    }
}

impl From<chanconf_msp::Error> for Error {
    fn from(err: chanconf_msp::Error) -> Self {
        Self::Validation(err.to_string())
    }
}

impl From<chanconf_update::Error> for Error {
    fn from(err: chanconf_update::Error) -> Self {
        use chanconf_update::Error as E;
        match err {
            E::ChannelMismatch { base, updated } => Self::ChannelMismatch { base, updated },
            E::VersionConflict { path, reason } => Self::VersionConflict { path, reason },
            E::Validation { path, reason } => Self::Validation(format!("{path}: {reason}")),
            E::Tree(err) => err.into(),
        }
    }
}

impl From<chanconf_policy::Error> for Error {
    fn from(err: chanconf_policy::Error) -> Self {
        use chanconf_policy::Error as E;
        match err {
            E::Tree(err) => err.into(),
            other => Self::Validation(other.to_string()),
        }
    }
}

impl From<chanconf_sign::Error> for Error {
    fn from(err: chanconf_sign::Error) -> Self {
        use chanconf_sign::Error as E;
        match err {
            E::Tree(err) => err.into(),
            E::Msp(err) => err.into(),
            other => Self::Signing(other),
        }
    }
}
