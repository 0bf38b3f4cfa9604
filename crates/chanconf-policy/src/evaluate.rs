//! Policy evaluation over a config tree.

use crate::error::{Error, Result};
use crate::resolve::PolicyPath;
use crate::threshold::{meets_rule, signatures_needed};
use chanconf_tree::{ConfigGroup, Policy, SignaturePolicy};
use tracing::debug;

/// Decides leaf signature policies.
///
/// Any `Fn(&PolicyPath, &SignaturePolicy) -> bool` closure qualifies.
pub trait SignatureSatisfier {
    fn is_satisfied(&self, path: &PolicyPath, policy: &SignaturePolicy) -> bool;
}

impl<F> SignatureSatisfier for F
where
    F: Fn(&PolicyPath, &SignaturePolicy) -> bool,
{
    fn is_satisfied(&self, path: &PolicyPath, policy: &SignaturePolicy) -> bool {
        self(path, policy)
    }
}

/// Evaluates policies in one config tree.
pub struct Evaluator<'a, S> {
    root: &'a ConfigGroup,
    satisfier: S,
}

impl<'a, S: SignatureSatisfier> Evaluator<'a, S> {
    pub fn new(root: &'a ConfigGroup, satisfier: S) -> Self {
        Self { root, satisfier }
    }

    /// Evaluate the policy at `path`.
    pub fn evaluate(&self, path: &PolicyPath) -> Result<bool> {
        let group = self.root.descend(&path.group)?;
        self.evaluate_in(group, &mut path.group.clone(), &path.name)
    }

    /// Resolve `reference` from `owner` and evaluate it.
    pub fn evaluate_ref<P: AsRef<str>>(&self, reference: &str, owner: &[P]) -> Result<bool> {
        self.evaluate(&PolicyPath::resolve(reference, owner)?)
    }

    /// The subset of `paths` that are not satisfied.
    pub fn unsatisfied<'p>(&self, paths: &'p [PolicyPath]) -> Result<Vec<&'p PolicyPath>> {
        let mut failed = Vec::new();
        for path in paths {
            if !self.evaluate(path)? {
                failed.push(path);
            }
        }
        Ok(failed)
    }

    fn evaluate_in(&self, group: &ConfigGroup, path: &mut Vec<String>, name: &str) -> Result<bool> {
        let here = PolicyPath {
            group: path.clone(),
            name: name.to_string(),
        };
        let body = group
            .policy(name)?
            .policy
            .as_ref()
            .ok_or_else(|| Error::MissingBody {
                path: here.to_string(),
            })?;

        let satisfied = match body {
            Policy::Signature(signature) => self.satisfier.is_satisfied(&here, signature),
            Policy::ImplicitMeta(meta) => {
                let mut total = 0;
                let mut satisfied = 0;
                for (child_name, child) in &group.groups {
                    if !child.policies.contains_key(&meta.sub_policy) {
                        continue;
                    }
                    total += 1;
                    path.push(child_name.clone());
                    let result = self.evaluate_in(child, path, &meta.sub_policy);
                    path.pop();
                    if result? {
                        satisfied += 1;
                    }
                }
                let met = meets_rule(meta.rule, satisfied, total);
                debug!(
                    policy = %here,
                    rule = meta.rule.as_str(),
                    satisfied,
                    total,
                    needed = ?signatures_needed(meta.rule, satisfied, total),
                    met,
                    "evaluated implicit meta policy"
                );
                met
            }
        };
        Ok(satisfied)
    }
}
