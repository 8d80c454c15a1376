//! The responsibility gate: does answering this commit the organization?

use serde_json::{json, Value};

use arbiter_contracts::action::DecisionAction;
use arbiter_contracts::config::ResponsibilityConfig;
use arbiter_contracts::decision::GateSignal;
use arbiter_contracts::request::{Context, Evidence, Intent};
use arbiter_core::traits::Gate;

/// Stems that suggest the user is asking for money back. Stems, not words,
/// so "compensate"/"compensation" and "reimburse"/"reimbursement" all hit.
const COMPENSATION_MARKERS: &[&str] = &["compensat", "refund", "credit", "discount", "reimburse"];

/// Evaluates the `topic` evidence section together with the policy's intent
/// lists.
///
/// Everything here escalates rather than stops: these requests are
/// legitimate, they just cannot be committed to autonomously. The one
/// exception is a sensitive intent under `stop_on_sensitive`.
pub struct ResponsibilityGate {
    config: ResponsibilityConfig,
}

impl ResponsibilityGate {
    pub fn new(config: ResponsibilityConfig) -> Self {
        Self { config }
    }
}

impl Default for ResponsibilityGate {
    fn default() -> Self {
        Self::new(ResponsibilityConfig::default())
    }
}

impl Gate for ResponsibilityGate {
    fn name(&self) -> &'static str {
        "responsibility"
    }

    fn evaluate(&self, intent: &Intent, _context: &Context, evidence: &Evidence) -> GateSignal {
        let has_financial_impact = evidence.bool_or("topic.has_financial_impact", false);
        let requires_authority = evidence.bool_or("topic.requires_authority", false);
        let is_irreversible = evidence.bool_or("topic.is_irreversible", false);
        let is_sensitive = evidence.bool_or("topic.is_sensitive", false);

        // Rule 1: financial impact.
        if self.config.financial_intents.contains(&intent.name) || has_financial_impact {
            return GateSignal::trigger(
                DecisionAction::Escalate,
                "FINANCIAL",
                format!(
                    "Intent '{}' has financial responsibility - requires human review",
                    intent.name
                ),
            );
        }

        // Rule 2: organizational authority or commitment.
        if self.config.authority_intents.contains(&intent.name) || requires_authority {
            return GateSignal::trigger(
                DecisionAction::Escalate,
                "AUTHORITY",
                format!(
                    "Intent '{}' requires organizational authority - cannot commit autonomously",
                    intent.name
                ),
            );
        }

        // Rule 3: irreversible action.
        if is_irreversible {
            return GateSignal::trigger(
                DecisionAction::Escalate,
                "IRREVERSIBLE",
                format!(
                    "Intent '{}' is irreversible - requires explicit approval",
                    intent.name
                ),
            );
        }

        // Rule 4: sensitive topic.
        if self.config.sensitive_intents.contains(&intent.name) || is_sensitive {
            let action = if self.config.stop_on_sensitive {
                DecisionAction::Stop
            } else {
                DecisionAction::Escalate
            };
            return GateSignal::trigger(
                action,
                "SENSITIVE",
                format!(
                    "Intent '{}' involves sensitive topic - outside autonomous scope",
                    intent.name
                ),
            );
        }

        // Rule 5: compensation language in the parameters, even when the
        // recognized intent itself looks harmless.
        let haystack: String = intent
            .parameters
            .values()
            .filter_map(Value::as_str)
            .map(str::to_lowercase)
            .collect::<Vec<_>>()
            .join(" ");
        if COMPENSATION_MARKERS.iter().any(|m| haystack.contains(m)) {
            return GateSignal::trigger(
                DecisionAction::Escalate,
                "COMPENSATION",
                "User input suggests compensation/financial request - requires human review",
            );
        }

        GateSignal::abstain(format!(
            "Intent '{}' is within responsibility boundaries",
            intent.name
        ))
    }

    fn config_snapshot(&self) -> Option<Value> {
        Some(json!({
            "financial_intents": self.config.financial_intents,
            "authority_intents": self.config.authority_intents,
            "sensitive_intents": self.config.sensitive_intents,
            "stop_on_sensitive": self.config.stop_on_sensitive,
        }))
    }

    fn input_summary(&self, evidence: &Evidence) -> Option<Value> {
        Some(json!({
            "topic": {
                "has_financial_impact": evidence.topic.get("has_financial_impact"),
                "requires_authority": evidence.topic.get("requires_authority"),
                "is_irreversible": evidence.topic.get("is_irreversible"),
                "is_sensitive": evidence.topic.get("is_sensitive"),
            }
        }))
    }
}
