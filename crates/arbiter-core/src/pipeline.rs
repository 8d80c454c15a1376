//! The governance pipeline: the deterministic two-phase orchestrator.
//!
//! Every evaluation walks the same fixed sequence:
//!
//!   POLICY_PHASE → GATE_PHASE → RESOLVE → Decision
//!
//! The invariant is that every contributor always runs, even when an earlier
//! phase has already proposed STOP. The audit trail (`gate_decisions`) must
//! report on every gate regardless of the outcome, so nothing short-circuits;
//! only the resolver decides.

use chrono::Utc;
use serde_json::{json, Value};
use tracing::{debug, info};

use arbiter_contracts::{
    decision::{Decision, GateVerdict, TraceId},
    policy::POLICY_CONTRIBUTOR,
    request::{Context, Evidence, Intent},
};

use crate::resolver::{resolve, Contribution};
use crate::traits::{Gate, RuleEngine};

/// Rationale recorded for the policy contributor when no rule matched.
pub const NO_RULES_MATCHED: &str = "No policy rules matched";

/// The pipeline orchestrator.
///
/// Construct one pipeline per gate lineup; the pipeline is immutable and may
/// be shared freely across threads, since evaluation touches no shared
/// mutable state. Gate order is declaration order and determines both
/// rationale ordering and `final_gate` tie-breaks.
pub struct GovernancePipeline {
    gates: Vec<Box<dyn Gate>>,
}

impl GovernancePipeline {
    /// Create a pipeline over an ordered list of gates.
    pub fn new(gates: Vec<Box<dyn Gate>>) -> Self {
        Self { gates }
    }

    /// Names of the gates in evaluation order.
    pub fn gate_names(&self) -> Vec<&'static str> {
        self.gates.iter().map(|g| g.name()).collect()
    }

    /// Run one full evaluation.
    ///
    /// `rules` is the compiled policy rule engine, when a policy document was
    /// supplied; without one, only the gates contribute. The returned
    /// [`Decision`] is terminal: action, joined rationale, decision code,
    /// per-contributor verdicts, and a fresh trace id.
    pub fn evaluate(
        &self,
        intent: &Intent,
        context: &Context,
        evidence: &Evidence,
        rules: Option<&dyn RuleEngine>,
    ) -> Decision {
        let trace_id = TraceId::new();

        debug!(
            trace_id = %trace_id,
            intent = %intent.name,
            confidence = intent.confidence,
            "governance evaluation starting"
        );

        let mut contributions: Vec<Contribution> = Vec::with_capacity(self.gates.len() + 1);
        let mut verdicts: Vec<GateVerdict> = Vec::with_capacity(self.gates.len() + 1);

        // ── Phase 1: policy rules ────────────────────────────────────────────
        //
        // The rule matcher is one contributor, evaluated before any gate so a
        // policy author's verdict wins declaration-order ties.
        if let Some(engine) = rules {
            match engine.first_match(intent, context, evidence) {
                Some(matched) => {
                    debug!(
                        trace_id = %trace_id,
                        rule = %matched.rule_name,
                        action = %matched.action,
                        "policy rule matched"
                    );
                    verdicts.push(GateVerdict {
                        gate_name: POLICY_CONTRIBUTOR.to_string(),
                        suggested_action: Some(matched.action),
                        rationale: matched.reason.clone(),
                        config_used: Some(json!({ "matched_rule": matched.rule_name })),
                        input_summary: None,
                    });
                    contributions.push(Contribution {
                        name: POLICY_CONTRIBUTOR.to_string(),
                        action: Some(matched.action),
                        rationale: matched.reason,
                        reason_code: Some(matched.rule_name),
                    });
                }
                None => {
                    verdicts.push(GateVerdict {
                        gate_name: POLICY_CONTRIBUTOR.to_string(),
                        suggested_action: None,
                        rationale: NO_RULES_MATCHED.to_string(),
                        config_used: None,
                        input_summary: None,
                    });
                    contributions.push(Contribution {
                        name: POLICY_CONTRIBUTOR.to_string(),
                        action: None,
                        rationale: NO_RULES_MATCHED.to_string(),
                        reason_code: None,
                    });
                }
            }
        }

        // ── Phase 2: gates ───────────────────────────────────────────────────
        //
        // Every gate runs unconditionally; an earlier STOP never suppresses a
        // later gate's verdict from the audit trail.
        for gate in &self.gates {
            let signal = gate.evaluate(intent, context, evidence);
            match signal.action {
                Some(action) => debug!(
                    trace_id = %trace_id,
                    gate = gate.name(),
                    action = %action,
                    "gate objected"
                ),
                None => debug!(trace_id = %trace_id, gate = gate.name(), "gate abstained"),
            }

            verdicts.push(GateVerdict {
                gate_name: gate.name().to_string(),
                suggested_action: signal.action,
                rationale: signal.rationale.clone(),
                config_used: gate.config_snapshot(),
                input_summary: gate.input_summary(evidence),
            });
            contributions.push(Contribution {
                name: gate.name().to_string(),
                action: signal.action,
                rationale: signal.rationale,
                reason_code: signal.reason_code,
            });
        }

        // ── Phase 3: resolve ─────────────────────────────────────────────────
        let resolution = resolve(&contributions);

        info!(
            trace_id = %trace_id,
            action = %resolution.action,
            code = %resolution.decision_code,
            final_gate = resolution.final_gate.as_deref().unwrap_or("<none>"),
            "governance decision"
        );

        let policy_info = rules.map(|engine| engine.describe());

        Decision {
            action: resolution.action,
            rationale: resolution.rationale,
            trace_id,
            decision_code: resolution.decision_code,
            final_gate: resolution.final_gate,
            gate_decisions: verdicts,
            evidence_summary: evidence_summary(intent, context, evidence),
            required_steps: resolution.required_steps,
            policy_name: policy_info.as_ref().map(|p| p.name.clone()),
            policy_version: policy_info.map(|p| p.version),
            timestamp: Utc::now(),
        }
    }
}

/// Compact description of what was evaluated: the intent, the identifying
/// context fields, and which evidence keys were present per section. Key
/// names only; evidence values never enter the summary.
fn evidence_summary(intent: &Intent, context: &Context, evidence: &Evidence) -> Value {
    let keys = |section: &serde_json::Map<String, Value>| -> Vec<String> {
        section.keys().cloned().collect()
    };
    json!({
        "intent": intent.name,
        "context": {
            "channel": context.channel,
            "user_id": context.user_id,
        },
        "evidence_keys": {
            "facts": keys(&evidence.facts),
            "rag": keys(&evidence.rag),
            "topic": keys(&evidence.topic),
        },
    })
}

// ── Tests ────────────────────────────────────────────────────────────────────
