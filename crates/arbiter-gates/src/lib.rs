//! # arbiter-gates
//!
//! The four built-in governance gates:
//!
//! - [`SafetyGate`] — fraud, illegal-activity, and security-attack markers
//! - [`FactVerifiabilityGate`] — can the facts behind the answer be checked?
//! - [`UncertaintyGate`] — is the retrieval confident, consistent, current?
//! - [`ResponsibilityGate`] — does answering commit the organization?
//!
//! Gates are constructed once from their effective configuration (policy
//! overrides merged over defaults) and are immutable afterwards, so a gate
//! lineup can be shared across concurrent evaluations.

pub mod fact_verifiability;
pub mod responsibility;
pub mod safety;
pub mod uncertainty;

pub use fact_verifiability::FactVerifiabilityGate;
pub use responsibility::ResponsibilityGate;
pub use safety::SafetyGate;
pub use uncertainty::UncertaintyGate;

use arbiter_contracts::config::GateOverrides;
use arbiter_core::traits::Gate;

/// Canonical gate evaluation order. Safety runs first so its rationale leads
/// the joined decision rationale, and it wins `final_gate` ties against any
/// other gate proposing the same action.
pub const GATE_ORDER: &[&str] = &[
    "safety",
    "fact_verifiability",
    "uncertainty",
    "responsibility",
];

/// Build the standard gate lineup in canonical order, applying any per-gate
/// overrides from the policy document. Absent overrides mean defaults.
pub fn standard_gates(overrides: &GateOverrides) -> Vec<Box<dyn Gate>> {
    vec![
        Box::new(SafetyGate::new(
            overrides.safety.clone().unwrap_or_default(),
        )),
        Box::new(FactVerifiabilityGate::new(
            overrides.fact_verifiability.clone().unwrap_or_default(),
        )),
        Box::new(UncertaintyGate::new(
            overrides.uncertainty.clone().unwrap_or_default(),
        )),
        Box::new(ResponsibilityGate::new(
            overrides.responsibility.clone().unwrap_or_default(),
        )),
    ]
}

#[cfg(test)]
mod tests {
    use arbiter_contracts::action::DecisionAction;
    use arbiter_contracts::config::UncertaintyConfig;
    use arbiter_contracts::request::{Context, Evidence, Intent};
    use serde_json::json;

    use super::*;

    #[test]
    fn standard_lineup_is_in_canonical_order() {
        let gates = standard_gates(&GateOverrides::default());
        let names: Vec<&str> = gates.iter().map(|g| g.name()).collect();
        assert_eq!(names, GATE_ORDER);
    }

    #[test]
    fn overrides_reach_the_boxed_gate() {
        let overrides = GateOverrides {
            uncertainty: Some(UncertaintyConfig {
                confidence_threshold: 0.95,
                ..UncertaintyConfig::default()
            }),
            ..GateOverrides::default()
        };
        let gates = standard_gates(&overrides);
        let uncertainty = gates.iter().find(|g| g.name() == "uncertainty").unwrap();

        let evidence: Evidence =
            serde_json::from_value(json!({ "rag": { "confidence": 0.9 } })).unwrap();
        let signal = uncertainty.evaluate(
            &Intent::new("order_status_query"),
            &Context::default(),
            &evidence,
        );
        // 0.9 clears the default threshold but not the override.
        assert_eq!(signal.action, Some(DecisionAction::Restrict));
    }

    #[test]
    fn default_lineup_abstains_on_benign_input() {
        let gates = standard_gates(&GateOverrides::default());
        let intent = Intent::new("order_status_query")
            .with_parameter("user_input", json!("Where is my order?"));
        let evidence: Evidence = serde_json::from_value(json!({
            "facts": { "verifiable": true, "verifiable_confidence": 0.95, "source": "order_database" },
            "rag": { "confidence": 0.92 },
            "topic": { "has_financial_impact": false }
        }))
        .unwrap();

        for gate in &gates {
            let signal = gate.evaluate(&intent, &Context::default(), &evidence);
            assert_eq!(signal.action, None, "{} should abstain", gate.name());
        }
    }

    #[test]
    fn every_gate_exposes_a_config_snapshot() {
        for gate in standard_gates(&GateOverrides::default()) {
            assert!(gate.config_snapshot().is_some(), "{}", gate.name());
        }
    }
}
