//! Chanconf Policy
//!
//! Who may change what. Every group, value and policy in a channel
//! configuration names a mod policy; an update is authorized when every
//! policy its write set touches is satisfied by the collected signatures.
//!
//! # Implicit meta policies
//!
//! An implicit meta policy such as `MAJORITY Admins` on group G is a
//! threshold over the `Admins` policy of each immediate child of G:
//!
//! ```text
//! /Channel/Application/Admins  = MAJORITY Admins
//!     ├── Org1/Admins  ✓
//!     ├── Org2/Admins  ✗
//!     └── Org3/Admins  ✓     2 of 3 → satisfied
//! ```
//!
//! Children are evaluated recursively; leaf signature policies are decided
//! by a caller-supplied [`SignatureSatisfier`], so this crate never touches
//! key material.
//!
//! # Required policies
//!
//! [`required_policies`] reads an update against its base and lists the
//! absolute policy paths it needs, ready to hand to an [`Evaluator`].

mod error;
mod evaluate;
mod required;
mod resolve;
mod threshold;

pub use error::{Error, Result};
pub use evaluate::{Evaluator, SignatureSatisfier};
pub use required::required_policies;
pub use resolve::PolicyPath;
pub use threshold::{meets_rule, required_count, signatures_needed};
