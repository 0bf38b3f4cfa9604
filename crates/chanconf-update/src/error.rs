//! Error types for chanconf-update.

use thiserror::Error;

/// Result type for chanconf-update operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while computing or applying an update.
#[derive(Debug, Error)]
pub enum Error {
    /// Base and edited configs belong to different channels.
    #[error("channel mismatch: base is {base:?}, update is for {updated:?}")]
    ChannelMismatch { base: String, updated: String },

    /// The read set does not match the config it is applied to.
    #[error("version conflict at {path}: {reason}")]
    VersionConflict { path: String, reason: String },

    /// The write set breaks the version rules.
    #[error("invalid update at {path}: {reason}")]
    Validation { path: String, reason: String },

    /// Tree access failed.
    #[error(transparent)]
    Tree(#[from] chanconf_tree::Error),
}
