//! Error types for chanconf-policy.

use thiserror::Error;

/// Result type for chanconf-policy operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while resolving or evaluating policies.
#[derive(Debug, Error)]
pub enum Error {
    /// A policy reference is not a valid absolute or relative path.
    #[error("invalid policy reference {reference:?}: {reason}")]
    Reference { reference: String, reason: &'static str },

    /// A policy was found but carries no body to evaluate.
    #[error("policy {path} has no body")]
    MissingBody { path: String },

    /// A group or policy on the path does not exist.
    #[error(transparent)]
    Tree(#[from] chanconf_tree::Error),
}
