//! Decision records: the terminal output of an evaluation and the per-gate
//! verdicts that justify it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::action::DecisionAction;

/// Unique identifier for a single evaluation call.
///
/// Generated fresh per call, never reused, never derived from the input. It
/// exists purely for audit correlation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TraceId(pub uuid::Uuid);

impl TraceId {
    /// Create a new random trace id.
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl Default for TraceId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for TraceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Raw outcome of a single gate evaluation, before the pipeline attaches
/// diagnostic snapshots.
///
/// `action: None` means the gate abstains ("no objection"); the rationale is
/// always non-empty and explains either the objection or the abstention.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GateSignal {
    pub action: Option<DecisionAction>,
    pub rationale: String,
    /// Stable token describing which rule inside the gate fired, used to
    /// build the decision code when this signal wins resolution.
    pub reason_code: Option<String>,
}

impl GateSignal {
    /// A gate objection proposing `action`.
    pub fn trigger(
        action: DecisionAction,
        reason_code: &str,
        rationale: impl Into<String>,
    ) -> Self {
        Self {
            action: Some(action),
            rationale: rationale.into(),
            reason_code: Some(reason_code.to_string()),
        }
    }

    /// An abstention with an explanatory rationale.
    pub fn abstain(rationale: impl Into<String>) -> Self {
        Self {
            action: None,
            rationale: rationale.into(),
            reason_code: None,
        }
    }
}

/// Audit record for one contributor (the policy rule matcher or a gate),
/// kept for every contributor regardless of the final outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GateVerdict {
    /// Contributor name: "policy" or the gate's stable name.
    pub gate_name: String,
    /// Proposed action, or `None` for an abstention.
    pub suggested_action: Option<DecisionAction>,
    pub rationale: String,
    /// Snapshot of the configuration the contributor evaluated under.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config_used: Option<Value>,
    /// Redacted slice of the inputs the contributor read.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_summary: Option<Value>,
}

/// The terminal, immutable result of one pipeline evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    /// The resolved governance action.
    pub action: DecisionAction,
    /// All non-abstaining contributor rationales joined with `" | "` in
    /// evaluation order, or a fixed default when nothing objected.
    pub rationale: String,
    pub trace_id: TraceId,
    /// Stable machine-readable code, `{PREFIX}_{ACTION}_{REASON}`.
    pub decision_code: String,
    /// The contributor whose proposal won resolution. `None` only when the
    /// action is ALLOW and no contributor proposed anything.
    pub final_gate: Option<String>,
    /// Verdicts for every contributor in evaluation order.
    pub gate_decisions: Vec<GateVerdict>,
    /// Compact description of what was evaluated, for audit review.
    pub evidence_summary: Value,
    /// Fixed operator guidance. Non-empty only for ESCALATE and STOP.
    pub required_steps: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub policy_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub policy_version: Option<String>,
    pub timestamp: DateTime<Utc>,
}

// ── Decision codes ───────────────────────────────────────────────────────────

/// Code prefix for a contributor name. Gates map to their domain prefix, the
/// rule matcher to POLICY, and anything else to GOVERNANCE.
pub fn code_prefix(contributor: &str) -> &'static str {
    match contributor {
        "safety" => "SAFETY",
        "fact_verifiability" => "FACTS",
        "uncertainty" => "UNCERTAINTY",
        "responsibility" => "RESPONSIBILITY",
        "policy" => "POLICY",
        _ => "GOVERNANCE",
    }
}

/// Build the stable decision code for a resolved action.
///
/// `winner` is the winning contributor's name and reason token; `None` means
/// no contributor objected and the default code applies.
pub fn build_decision_code(action: DecisionAction, winner: Option<(&str, &str)>) -> String {
    match winner {
        Some((contributor, reason)) => format!(
            "{}_{}_{}",
            code_prefix(contributor),
            action.as_str(),
            sanitize_reason(reason)
        ),
        None => format!("GOVERNANCE_{}_DEFAULT", action.as_str()),
    }
}

/// Uppercase a reason token and replace anything outside `[A-Z0-9]` with an
/// underscore, so rule names survive as code suffixes.
fn sanitize_reason(reason: &str) -> String {
    let mut out = String::with_capacity(reason.len());
    for ch in reason.chars() {
        if ch.is_ascii_alphanumeric() {
            out.extend(ch.to_uppercase());
        } else {
            out.push('_');
        }
    }
    if out.is_empty() {
        out.push_str("TRIGGERED");
    }
    out
}

/// Fixed operator guidance keyed by the resolved action.
pub fn required_steps(action: DecisionAction) -> Vec<String> {
    match action {
        DecisionAction::Escalate => {
            vec!["Route this request to a human reviewer before any action is taken.".to_string()]
        }
        DecisionAction::Stop => {
            vec!["Do not execute this request; no downstream action may proceed.".to_string()]
        }
        DecisionAction::Allow | DecisionAction::Restrict => Vec::new(),
    }
}
