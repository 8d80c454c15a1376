//! # arbiter-contracts
//!
//! Shared types, schemas, and contracts for the ARBITER governance gate.
//!
//! All crates in the workspace import from here. No business logic lives in
//! this crate, only data definitions, the decision-code scheme, and error
//! types.

pub mod action;
pub mod config;
pub mod decision;
pub mod error;
pub mod policy;
pub mod request;

#[cfg(test)]
mod tests {
    use super::*;
    use action::DecisionAction;
    use chrono::Utc;
    use decision::{Decision, GateVerdict, TraceId};
    use error::ArbiterError;
    use serde_json::json;

    // ── Decision serde ───────────────────────────────────────────────────────

    fn sample_decision() -> Decision {
        Decision {
            action: DecisionAction::Escalate,
            rationale: "Intent 'refund' has financial impact - requires human approval"
                .to_string(),
            trace_id: TraceId::new(),
            decision_code: "RESPONSIBILITY_ESCALATE_FINANCIAL".to_string(),
            final_gate: Some("responsibility".to_string()),
            gate_decisions: vec![
                GateVerdict {
                    gate_name: "safety".to_string(),
                    suggested_action: None,
                    rationale: "No safety risks detected for intent 'refund'".to_string(),
                    config_used: None,
                    input_summary: None,
                },
                GateVerdict {
                    gate_name: "responsibility".to_string(),
                    suggested_action: Some(DecisionAction::Escalate),
                    rationale: "Intent 'refund' has financial impact - requires human approval"
                        .to_string(),
                    config_used: Some(json!({ "financial_intents": ["refund"] })),
                    input_summary: None,
                },
            ],
            evidence_summary: json!({ "intent": "refund" }),
            required_steps: decision::required_steps(DecisionAction::Escalate),
            policy_name: None,
            policy_version: None,
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn decision_round_trips_through_json() {
        let original = sample_decision();
        let encoded = serde_json::to_string(&original).unwrap();
        let decoded: Decision = serde_json::from_str(&encoded).unwrap();
        assert_eq!(original, decoded);
    }

    #[test]
    fn absent_policy_fields_are_omitted_from_wire_form() {
        let decision = sample_decision();
        let value = serde_json::to_value(&decision).unwrap();
        let object = value.as_object().unwrap();
        assert!(!object.contains_key("policy_name"));
        assert!(!object.contains_key("policy_version"));
        // Abstaining verdicts keep an explicit null action for the audit trail.
        assert_eq!(
            value["gate_decisions"][0]["suggested_action"],
            serde_json::Value::Null
        );
    }

    #[test]
    fn gate_decisions_preserve_evaluation_order() {
        let decision = sample_decision();
        let names: Vec<&str> = decision
            .gate_decisions
            .iter()
            .map(|v| v.gate_name.as_str())
            .collect();
        assert_eq!(names, vec!["safety", "responsibility"]);
    }

    // ── Error display messages ───────────────────────────────────────────────

    #[test]
    fn error_policy_not_found_display() {
        let err = ArbiterError::PolicyNotFound {
            path: "policies/missing.yaml".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("policy not found"));
        assert!(msg.contains("policies/missing.yaml"));
    }

    #[test]
    fn error_policy_invalid_display() {
        let err = ArbiterError::PolicyInvalid {
            reason: "unsupported policy version '2.0'".to_string(),
        };
        assert!(err.to_string().contains("policy invalid"));
        assert!(err.to_string().contains("2.0"));
    }

    #[test]
    fn error_invalid_input_display() {
        let err = ArbiterError::InvalidInput {
            reason: "intent confidence 1.5 is outside [0, 1]".to_string(),
        };
        assert!(err.to_string().contains("invalid request"));
        assert!(err.to_string().contains("1.5"));
    }

    #[test]
    fn error_internal_display() {
        let err = ArbiterError::Internal {
            reason: "gate panicked".to_string(),
        };
        assert!(err.to_string().contains("governance failure"));
    }
}
