//! Threshold rules of implicit meta policies.
//!
//! With n child groups exposing the sub-policy:
//! - ANY → 1 required
//! - ALL → n required
//! - MAJORITY → n / 2 + 1 required
//!
//! A policy over zero children is never satisfied.

use chanconf_tree::ImplicitMetaRule;

/// Number of satisfied sub-policies `rule` needs out of `total`.
///
/// # Examples
///
/// ```
/// use chanconf_policy::required_count;
/// use chanconf_tree::ImplicitMetaRule;
///
/// assert_eq!(required_count(ImplicitMetaRule::Any, 5), 1);
/// assert_eq!(required_count(ImplicitMetaRule::Majority, 4), 3);
/// assert_eq!(required_count(ImplicitMetaRule::All, 3), 3);
/// ```
pub const fn required_count(rule: ImplicitMetaRule, total: usize) -> usize {
    match rule {
        ImplicitMetaRule::Any => 1,
        ImplicitMetaRule::All => total,
        ImplicitMetaRule::Majority => total / 2 + 1,
    }
}

/// Check if `satisfied` of `total` sub-policies meet `rule`.
pub const fn meets_rule(rule: ImplicitMetaRule, satisfied: usize, total: usize) -> bool {
    if total == 0 {
        return false;
    }
    satisfied >= required_count(rule, total)
}

/// How many more satisfied sub-policies `rule` needs, or `None` when no
/// number of signatures can meet it because there are no children.
pub const fn signatures_needed(rule: ImplicitMetaRule, satisfied: usize, total: usize) -> Option<usize> {
    if total == 0 {
        return None;
    }
    let required = required_count(rule, total);
    if satisfied >= required {
        Some(0)
    } else {
        Some(required - satisfied)
    }
}
