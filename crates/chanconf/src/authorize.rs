//! Checking an update against the policies it needs.

use crate::config_tx::ConfigTx;
use crate::error::Result;
use chanconf_policy::{required_policies, Evaluator, PolicyPath, SignatureSatisfier};
use chanconf_tree::{Config, ConfigUpdate};
use tracing::{debug, warn};

/// Outcome of evaluating an update's required policies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Authorization {
    /// Every policy the update needs, sorted.
    pub required: Vec<PolicyPath>,
    /// The subset that the supplied signatures do not satisfy.
    pub unsatisfied: Vec<PolicyPath>,
}

impl Authorization {
    pub fn is_authorized(&self) -> bool {
        self.unsatisfied.is_empty()
    }
}

/// Evaluate the policies `update` needs against `base`, deciding leaf
/// signature policies with `satisfier`.
pub fn authorize_update<S: SignatureSatisfier>(
    base: &Config,
    update: &ConfigUpdate,
    satisfier: S,
) -> Result<Authorization> {
    let required = required_policies(&base.channel_group, update)?;
    let evaluator = Evaluator::new(&base.channel_group, satisfier);
    let unsatisfied: Vec<PolicyPath> = evaluator
        .unsatisfied(&required)?
        .into_iter()
        .cloned()
        .collect();

    if unsatisfied.is_empty() {
        debug!(channel = %update.channel_id, required = required.len(), "update authorized");
    } else {
        warn!(
            channel = %update.channel_id,
            unsatisfied = unsatisfied.len(),
            first = %unsatisfied[0],
            "update not authorized"
        );
    }
    Ok(Authorization {
        required,
        unsatisfied,
    })
}

impl ConfigTx {
    /// Absolute paths of every policy the session's update needs.
    pub fn required_policies(&self, channel_id: &str) -> Result<Vec<PolicyPath>> {
        let update = self.compute_update(channel_id)?;
        Ok(required_policies(&self.original().channel_group, &update)?)
    }

    /// Evaluate the session's update against the original config.
    pub fn authorize<S: SignatureSatisfier>(
        &self,
        channel_id: &str,
        satisfier: S,
    ) -> Result<Authorization> {
        let update = self.compute_update(channel_id)?;
        authorize_update(self.original(), &update, satisfier)
    }
}
