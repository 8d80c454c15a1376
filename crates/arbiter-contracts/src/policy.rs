//! Rule-matcher contract types.
//!
//! The rule engine consumes the request and produces at most one
//! [`RuleMatch`]. In precedence resolution the match participates as a single
//! contributor named [`POLICY_CONTRIBUTOR`], evaluated before any gate.

use serde::{Deserialize, Serialize};

use crate::action::DecisionAction;

/// Contributor name under which the rule matcher appears in decisions.
pub const POLICY_CONTRIBUTOR: &str = "policy";

/// The first policy rule whose conditions were fully satisfied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleMatch {
    /// Name of the matched rule, unique within its policy.
    pub rule_name: String,
    /// The action the rule prescribes.
    pub action: DecisionAction,
    /// The rule author's reason, or a generated default.
    pub reason: String,
}

/// Identity of a loaded policy document, stamped onto every decision made
/// under it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyInfo {
    pub name: String,
    pub version: String,
}
