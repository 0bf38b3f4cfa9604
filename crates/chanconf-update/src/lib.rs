//! Chanconf Update
//!
//! Turns two snapshots of a channel configuration into the minimal
//! [`ConfigUpdate`](chanconf_tree::ConfigUpdate) between them, and checks an
//! update against the snapshot it claims to extend.
//!
//! # Read set and write set
//!
//! The read set names every entry the update depends on, at the version the
//! author saw. The write set carries new content at the versions it will
//! have once committed. An orderer rejects the update if any read-set
//! version has moved, so concurrent edits to the same group cannot both win.
//!
//! # Version rules
//!
//! - a modified leaf is written at its current version + 1
//! - an added entry (or a removed and re-added one) is written at 0, and its
//!   whole subtree with it
//! - a group is bumped only when its own entry changes: its mod policy, or
//!   the set of its direct children
//!
//! [`stamp_versions`] applies the same rules to a working tree, so the tree
//! a session holds always shows the versions its update would commit.
//! [`apply_update`] goes the other way and rebuilds the committed tree.

mod apply;
mod diff;
mod error;
mod leaf;
mod path;
mod stamp;

pub use apply::apply_update;
pub use diff::{compute_update, Differ};
pub use error::{Error, Result};
pub use path::{group_path, EntryKind, EntryPath, Replacements};
pub use stamp::stamp_versions;
