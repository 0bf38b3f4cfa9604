//! Policy references.
//!
//! `/Channel/Orderer/Admins` is absolute and walks from the channel root;
//! `Admins` (or `Org1/Admins`) is relative to the group that owns the
//! referencing entry.

use crate::error::{Error, Result};
use chanconf_tree::schema::CHANNEL_GROUP_KEY;
use chanconf_tree::{ConfigGroup, ConfigPolicy};
use chanconf_update::group_path;
use std::fmt;

/// A resolved policy location: group names below the root and policy name.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PolicyPath {
    pub group: Vec<String>,
    pub name: String,
}

impl PolicyPath {
    /// Resolve `reference` as seen from the group at `owner`.
    pub fn resolve<S: AsRef<str>>(reference: &str, owner: &[S]) -> Result<Self> {
        let invalid = |reason| Error::Reference {
            reference: reference.to_string(),
            reason,
        };

        let (mut group, rest) = match reference.strip_prefix('/') {
            Some(rest) => {
                let mut segments = rest.split('/');
                if segments.next() != Some(CHANNEL_GROUP_KEY) {
                    return Err(invalid("absolute references start at /Channel"));
                }
                (Vec::new(), segments.collect::<Vec<_>>())
            }
            None => (
                owner.iter().map(|s| s.as_ref().to_string()).collect(),
                reference.split('/').collect(),
            ),
        };

        let Some((name, parents)) = rest.split_last() else {
            return Err(invalid("no policy name"));
        };
        if name.is_empty() || parents.iter().any(|s| s.is_empty()) {
            return Err(invalid("empty path segment"));
        }
        group.extend(parents.iter().map(|s| s.to_string()));

        Ok(Self {
            group,
            name: name.to_string(),
        })
    }

    /// Find the policy in the tree rooted at `root`.
    pub fn lookup<'a>(&self, root: &'a ConfigGroup) -> Result<&'a ConfigPolicy> {
        Ok(root.descend(&self.group)?.policy(&self.name)?)
    }
}

impl fmt::Display for PolicyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", group_path(&self.group), self.name)
    }
}
