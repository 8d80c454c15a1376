//! Precedence resolution: merging every contributor's proposal into one
//! final action.
//!
//! The ordering is total: STOP(3) > ESCALATE(2) > RESTRICT(1) > ALLOW(0),
//! with ALLOW the implicit default when every contributor abstains. Ties on
//! the winning action go to the earliest contributor in evaluation order,
//! which is fixed: policy first, then the gates in their declared order.

use tracing::debug;

use arbiter_contracts::action::DecisionAction;
use arbiter_contracts::decision::{build_decision_code, required_steps};

/// Rationale used when no contributor proposed any action.
pub const DEFAULT_RATIONALE: &str = "No gates triggered";

/// Delimiter between contributor rationales in the joined decision
/// rationale.
pub const RATIONALE_DELIMITER: &str = " | ";

/// One contributor's proposal, in evaluation order.
#[derive(Debug, Clone)]
pub struct Contribution {
    /// Contributor name: "policy" or a gate name.
    pub name: String,
    /// Proposed action, or `None` for an abstention.
    pub action: Option<DecisionAction>,
    pub rationale: String,
    /// Stable token naming the rule that fired inside the contributor.
    pub reason_code: Option<String>,
}

/// The resolver's combined outcome, consumed by the orchestrator when it
/// assembles the final decision record.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub action: DecisionAction,
    /// Name of the winning contributor; `None` only when nothing objected.
    pub final_gate: Option<String>,
    pub rationale: String,
    pub decision_code: String,
    pub required_steps: Vec<String>,
}

/// Merge all contributions into one resolved action.
///
/// The winning action is the maximum precedence present; the winning
/// contributor is the first one in `contributions` holding it. The joined
/// rationale lists every non-abstaining contributor in order, so a decision
/// record explains every objection, not just the winning one.
pub fn resolve(contributions: &[Contribution]) -> Resolution {
    let action = contributions
        .iter()
        .filter_map(|c| c.action)
        .max()
        .unwrap_or(DecisionAction::Allow);

    let winner = contributions.iter().find(|c| c.action == Some(action));

    let objections: Vec<&str> = contributions
        .iter()
        .filter(|c| c.action.is_some())
        .map(|c| c.rationale.as_str())
        .collect();
    let rationale = if objections.is_empty() {
        DEFAULT_RATIONALE.to_string()
    } else {
        objections.join(RATIONALE_DELIMITER)
    };

    let decision_code = build_decision_code(
        action,
        winner.map(|w| {
            (
                w.name.as_str(),
                w.reason_code.as_deref().unwrap_or("TRIGGERED"),
            )
        }),
    );

    debug!(
        action = %action,
        final_gate = winner.map(|w| w.name.as_str()).unwrap_or("<none>"),
        code = %decision_code,
        "precedence resolved"
    );

    Resolution {
        action,
        final_gate: winner.map(|w| w.name.clone()),
        rationale,
        decision_code,
        required_steps: required_steps(action),
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────
