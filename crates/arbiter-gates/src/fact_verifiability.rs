//! The fact-verifiability gate: can the facts behind this answer be checked?

use serde_json::{json, Value};

use arbiter_contracts::action::DecisionAction;
use arbiter_contracts::config::FactVerifiabilityConfig;
use arbiter_contracts::decision::GateSignal;
use arbiter_contracts::request::{Context, Evidence, Intent};
use arbiter_core::traits::Gate;

/// Sources that count as untrusted for realtime-dependent intents.
const UNTRUSTED_SOURCES: &[&str] = &["unknown", "untrusted", "user_provided"];

/// Freshness labels that mean the facts need a refresh before use.
const STALE_FRESHNESS: &[&str] = &["stale", "outdated", "expired"];

/// Evaluates the `facts` evidence section.
///
/// Verdicts sharpen when the intent is realtime-dependent: an intent listed
/// in `require_realtime_facts` (or evidence saying `facts.requires_realtime`)
/// cannot be served from unverifiable, low-confidence, or untrusted facts.
/// For other intents the same signals only earn an advisory abstention.
pub struct FactVerifiabilityGate {
    config: FactVerifiabilityConfig,
}

impl FactVerifiabilityGate {
    pub fn new(config: FactVerifiabilityConfig) -> Self {
        Self { config }
    }
}

impl Default for FactVerifiabilityGate {
    fn default() -> Self {
        Self::new(FactVerifiabilityConfig::default())
    }
}

impl Gate for FactVerifiabilityGate {
    fn name(&self) -> &'static str {
        "fact_verifiability"
    }

    fn evaluate(&self, intent: &Intent, _context: &Context, evidence: &Evidence) -> GateSignal {
        let verifiable = evidence.bool_or("facts.verifiable", true);
        let confidence = evidence.f64_or("facts.verifiable_confidence", 1.0);

        // Evidence may override the policy's realtime judgement per request.
        let needs_realtime = self.config.require_realtime_facts.contains(&intent.name);
        let realtime = evidence.bool_or("facts.requires_realtime", needs_realtime);

        let source = evidence.str_or("facts.source", "unknown");
        let freshness = evidence.str_or("facts.freshness", "unknown");

        // Rule 1: facts are explicitly not verifiable.
        if !verifiable {
            if realtime {
                let action = if self.config.stop_on_unverifiable {
                    DecisionAction::Stop
                } else {
                    DecisionAction::Restrict
                };
                return GateSignal::trigger(
                    action,
                    "UNVERIFIABLE",
                    format!(
                        "Intent '{}' requires real-time facts but facts are not verifiable (source: {source}, freshness: {freshness})",
                        intent.name
                    ),
                );
            }
            return GateSignal::trigger(
                DecisionAction::Restrict,
                "UNVERIFIABLE",
                format!("Facts are not verifiable (source: {source}, confidence: {confidence:.2})"),
            );
        }

        // Rule 2: verifiability confidence below threshold. Only realtime
        // intents are restricted; others get an advisory note and the later
        // rules do not run.
        if confidence < self.config.verifiable_threshold {
            if realtime {
                return GateSignal::trigger(
                    DecisionAction::Restrict,
                    "LOW_CONFIDENCE",
                    format!(
                        "Intent '{}' requires high-confidence facts, but confidence is {confidence:.2} (threshold: {:.2})",
                        intent.name, self.config.verifiable_threshold
                    ),
                );
            }
            return GateSignal::abstain(format!(
                "Fact verifiability confidence is {confidence:.2} (below threshold {:.2})",
                self.config.verifiable_threshold
            ));
        }

        // Rule 3: untrusted source.
        if UNTRUSTED_SOURCES.contains(&source) {
            if realtime {
                return GateSignal::trigger(
                    DecisionAction::Restrict,
                    "UNTRUSTED_SOURCE",
                    format!(
                        "Intent '{}' requires trusted sources, but source is '{source}'",
                        intent.name
                    ),
                );
            }
            return GateSignal::abstain(format!(
                "Fact source is '{source}' - consider verification"
            ));
        }

        // Rule 4: stale facts restrict regardless of realtime dependence.
        if STALE_FRESHNESS.contains(&freshness) {
            return GateSignal::trigger(
                DecisionAction::Restrict,
                "STALE",
                format!("Facts may be stale (freshness: {freshness}) - recommend refresh"),
            );
        }

        GateSignal::abstain(format!(
            "Facts are verifiable (confidence: {confidence:.2}, source: {source})"
        ))
    }

    fn config_snapshot(&self) -> Option<Value> {
        Some(json!({
            "verifiable_threshold": self.config.verifiable_threshold,
            "require_realtime_facts": self.config.require_realtime_facts,
            "stop_on_unverifiable": self.config.stop_on_unverifiable,
        }))
    }

    fn input_summary(&self, evidence: &Evidence) -> Option<Value> {
        Some(json!({
            "facts": {
                "verifiable": evidence.facts.get("verifiable"),
                "verifiable_confidence": evidence.facts.get("verifiable_confidence"),
                "source": evidence.facts.get("source"),
                "freshness": evidence.facts.get("freshness"),
                "requires_realtime": evidence.facts.get("requires_realtime"),
            }
        }))
    }
}
