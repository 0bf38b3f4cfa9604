//! Addresses of individual entries in a config tree.

use chanconf_tree::schema::CHANNEL_GROUP_KEY;
use std::collections::BTreeSet;
use std::fmt;

/// The three kinds of tree entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EntryKind {
    Group,
    Value,
    Policy,
}

/// One named entry: the group path holding it, its kind and its name.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntryPath {
    /// Group names below the root group.
    pub group: Vec<String>,
    pub kind: EntryKind,
    pub name: String,
}

/// Entries removed and re-added within one edit session. The diff treats
/// them as fresh additions rather than modifications.
pub type Replacements = BTreeSet<EntryPath>;

impl EntryPath {
    pub fn new<S: AsRef<str>>(group: &[S], kind: EntryKind, name: impl Into<String>) -> Self {
        Self {
            group: group.iter().map(|s| s.as_ref().to_string()).collect(),
            kind,
            name: name.into(),
        }
    }

    pub fn group<S: AsRef<str>>(parent: &[S], name: impl Into<String>) -> Self {
        Self::new(parent, EntryKind::Group, name)
    }

    pub fn value<S: AsRef<str>>(group: &[S], key: impl Into<String>) -> Self {
        Self::new(group, EntryKind::Value, key)
    }

    pub fn policy<S: AsRef<str>>(group: &[S], key: impl Into<String>) -> Self {
        Self::new(group, EntryKind::Policy, key)
    }

    /// True when this entry lies strictly below the group at `prefix`.
    pub fn is_under<S: AsRef<str>>(&self, prefix: &[S]) -> bool {
        self.group.len() >= prefix.len()
            && self.group.iter().zip(prefix).all(|(a, b)| a == b.as_ref())
    }
}

impl fmt::Display for EntryPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.kind {
            EntryKind::Group => "group",
            EntryKind::Value => "value",
            EntryKind::Policy => "policy",
        };
        write!(f, "{kind} {}/{}", group_path(&self.group), self.name)
    }
}

/// Absolute rendering of a group path, e.g. `/Channel/Application/Org1`.
pub fn group_path<S: AsRef<str>>(group: &[S]) -> String {
    let mut out = format!("/{CHANNEL_GROUP_KEY}");
    for name in group {
        out.push('/');
        out.push_str(name.as_ref());
    }
    out
}

pub(crate) fn is_replaced(
    replaced: &Replacements,
    group: &[String],
    kind: EntryKind,
    name: &str,
) -> bool {
    !replaced.is_empty() && replaced.contains(&EntryPath::new(group, kind, name))
}

/// Whether any replacement lies inside the child group `name` of `group`.
pub(crate) fn replaced_under(replaced: &Replacements, group: &[String], name: &str) -> bool {
    replaced.iter().any(|entry| {
        entry.group.len() > group.len()
            && entry.group[..group.len()] == *group
            && entry.group[group.len()] == name
    })
}
