//! Edit sessions over a committed config.

use crate::error::{Error, Result};
use crate::organization::optional_payload;
use chanconf_tree::payload::Capabilities;
use chanconf_tree::schema::{ADMINS_POLICY_KEY, CAPABILITIES_KEY};
use chanconf_tree::{Config, ConfigGroup, ConfigPolicy, ConfigUpdate, Policy, Scope, ValuePayload};
use chanconf_update::{group_path, stamp_versions, Differ, EntryKind, EntryPath, Replacements};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info};

/// An edit session: the committed base config plus a working copy.
///
/// Every edit either applies fully or leaves the session as it was. After
/// each edit the working copy is restamped, so [`ConfigTx::updated`] always
/// shows the versions the computed update would commit.
#[derive(Debug, Clone)]
pub struct ConfigTx {
    base: Config,
    session: Session,
}

#[derive(Debug, Clone)]
struct Session {
    working: Config,
    /// Base entries removed in this session.
    removed: BTreeSet<EntryPath>,
    /// Base entries removed and added again.
    replaced: Replacements,
}

/// Mutable view of a session during one edit.
pub(crate) struct Edit<'a> {
    base: &'a ConfigGroup,
    session: &'a mut Session,
}

impl ConfigTx {
    pub fn new(base: Config) -> Self {
        let session = Session {
            working: base.clone(),
            removed: BTreeSet::new(),
            replaced: Replacements::new(),
        };
        Self { base, session }
    }

    /// The committed config the session started from.
    pub fn original(&self) -> &Config {
        &self.base
    }

    /// The working config with every edit so far.
    pub fn updated(&self) -> &Config {
        &self.session.working
    }

    /// The minimal update taking the original config to the working one.
    ///
    /// Fails with [`Error::ChannelMismatch`] when the original config names
    /// a different channel. An original without a channel id accepts any.
    pub fn compute_update(&self, channel_id: &str) -> Result<ConfigUpdate> {
        if !self.base.channel_id.is_empty() && self.base.channel_id != channel_id {
            return Err(Error::ChannelMismatch {
                base: self.base.channel_id.clone(),
                updated: channel_id.to_string(),
            });
        }

        let (read_set, write_set) = Differ::with_replacements(&self.session.replaced)
            .diff_groups(&self.base.channel_group, &self.session.working.channel_group);
        let update = ConfigUpdate {
            channel_id: channel_id.to_string(),
            read_set,
            write_set,
            isolated_data: BTreeMap::new(),
        };

        info!(
            channel = %channel_id,
            replaced = self.session.replaced.len(),
            empty = update.is_empty(),
            "computed config update"
        );
        Ok(update)
    }

    /// Run `f` against a copy of the session and commit it only on success.
    pub(crate) fn edit<T>(
        &mut self,
        what: &str,
        f: impl FnOnce(&mut Edit<'_>) -> Result<T>,
    ) -> Result<T> {
        let mut session = self.session.clone();
        let result = f(&mut Edit {
            base: &self.base.channel_group,
            session: &mut session,
        });

        match result {
            Ok(out) => {
                stamp_versions(
                    &self.base.channel_group,
                    &mut session.working.channel_group,
                    &session.replaced,
                );
                self.session = session;
                debug!(edit = what, "applied config edit");
                Ok(out)
            }
            Err(err) => {
                debug!(edit = what, error = %err, "config edit rejected");
                Err(err)
            }
        }
    }

    /// Group at `path` in the working config.
    pub(crate) fn group(&self, path: &[&str]) -> Result<&ConfigGroup> {
        Ok(self.session.working.channel_group.descend(path)?)
    }

    pub(crate) fn policies_at(&self, path: &[&str]) -> Result<BTreeMap<String, Policy>> {
        Ok(self.group(path)?.policy_bodies())
    }

    /// Capabilities at `path`; none when the value is absent.
    pub(crate) fn capabilities_at(&self, path: &[&str]) -> Result<Vec<String>> {
        let group = self.group(path)?;
        match optional_payload(group, scope_of(path)?, CAPABILITIES_KEY)? {
            Some(payload) => Ok(payload
                .into_capabilities()?
                .capabilities
                .into_keys()
                .collect()),
            None => Ok(Vec::new()),
        }
    }
}

pub(crate) fn scope_of(path: &[&str]) -> Result<Scope> {
    Scope::of(path)
        .ok_or_else(|| Error::Validation(format!("{} is outside the channel hierarchy", group_path(path))))
}

impl Edit<'_> {
    pub(crate) fn group(&self, path: &[&str]) -> Result<&ConfigGroup> {
        Ok(self.session.working.channel_group.descend(path)?)
    }

    pub(crate) fn group_mut(&mut self, path: &[&str]) -> Result<&mut ConfigGroup> {
        Ok(self.session.working.channel_group.descend_mut(path)?)
    }

    pub(crate) fn add_group(&mut self, parent: &[&str], name: &str, group: ConfigGroup) -> Result<()> {
        self.group_mut(parent)?.insert_group(name, group)?;
        self.added(EntryPath::group(parent, name));
        Ok(())
    }

    pub(crate) fn remove_group(&mut self, parent: &[&str], name: &str) -> Result<()> {
        self.group_mut(parent)?.remove_group(name)?;

        let mut inside = parent.to_vec();
        inside.push(name);
        self.session.removed.retain(|entry| !entry.is_under(inside.as_slice()));
        self.session.replaced.retain(|entry| !entry.is_under(inside.as_slice()));
        self.removed(EntryPath::group(parent, name));
        Ok(())
    }

    pub(crate) fn add_policy(
        &mut self,
        path: &[&str],
        mod_policy: &str,
        name: &str,
        policy: Policy,
    ) -> Result<()> {
        self.group_mut(path)?
            .insert_policy(name, ConfigPolicy::new(mod_policy, policy))?;
        self.added(EntryPath::policy(path, name));
        Ok(())
    }

    pub(crate) fn remove_policy(&mut self, path: &[&str], name: &str) -> Result<()> {
        self.group_mut(path)?.remove_policy(name)?;
        self.removed(EntryPath::policy(path, name));
        Ok(())
    }

    /// Decoded payload at `key`, or `None` when absent or a placeholder.
    pub(crate) fn payload(&self, path: &[&str], key: &str) -> Result<Option<ValuePayload>> {
        optional_payload(self.group(path)?, scope_of(path)?, key)
    }

    /// Write a payload, keeping the value's mod policy when it exists and
    /// using `default_mod_policy` when it is new.
    pub(crate) fn put_payload(
        &mut self,
        path: &[&str],
        key: &str,
        payload: &ValuePayload,
        default_mod_policy: &str,
    ) -> Result<()> {
        let scope = scope_of(path)?;
        let group = self.group_mut(path)?;
        let existing = group.values.get(key).map(|v| v.mod_policy.clone());
        let mod_policy = existing.as_deref().unwrap_or(default_mod_policy);
        group.set_payload(scope, key, payload, mod_policy)?;

        if existing.is_none() {
            self.added(EntryPath::value(path, key));
        }
        Ok(())
    }

    pub(crate) fn remove_value(&mut self, path: &[&str], key: &str) -> Result<()> {
        self.group_mut(path)?.remove_value(key)?;
        self.removed(EntryPath::value(path, key));
        Ok(())
    }

    pub(crate) fn add_capability(&mut self, path: &[&str], capability: &str) -> Result<()> {
        let mut capabilities = self.capabilities(path)?;
        if capabilities.capabilities.contains_key(capability) {
            return Err(Error::already_exists("capability", capability));
        }
        capabilities
            .capabilities
            .insert(capability.to_string(), Default::default());
        self.put_payload(
            path,
            CAPABILITIES_KEY,
            &ValuePayload::Capabilities(capabilities),
            ADMINS_POLICY_KEY,
        )
    }

    pub(crate) fn remove_capability(&mut self, path: &[&str], capability: &str) -> Result<()> {
        let mut capabilities = self.capabilities(path)?;
        if capabilities.capabilities.remove(capability).is_none() {
            return Err(Error::not_found("capability", capability));
        }
        self.put_payload(
            path,
            CAPABILITIES_KEY,
            &ValuePayload::Capabilities(capabilities),
            ADMINS_POLICY_KEY,
        )
    }

    fn capabilities(&self, path: &[&str]) -> Result<Capabilities> {
        match self.payload(path, CAPABILITIES_KEY)? {
            Some(payload) => Ok(payload.into_capabilities()?),
            None => Ok(Capabilities::default()),
        }
    }

    /// Record an addition; a base entry removed earlier becomes a
    /// replacement.
    fn added(&mut self, entry: EntryPath) {
        if self.session.removed.remove(&entry) {
            debug!(%entry, "re-added removed entry");
            self.session.replaced.insert(entry);
        }
    }

    fn removed(&mut self, entry: EntryPath) {
        if self.base_has(&entry) {
            self.session.replaced.remove(&entry);
            self.session.removed.insert(entry);
        }
    }

    fn base_has(&self, entry: &EntryPath) -> bool {
        self.base.descend(entry.group.as_slice()).is_ok_and(|group| match entry.kind {
            EntryKind::Group => group.groups.contains_key(&entry.name),
            EntryKind::Value => group.values.contains_key(&entry.name),
            EntryKind::Policy => group.policies.contains_key(&entry.name),
        })
    }
}
