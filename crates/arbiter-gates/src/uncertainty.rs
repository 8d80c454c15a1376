//! The uncertainty gate: is the retrieval behind this answer trustworthy?

use serde_json::{json, Value};

use arbiter_contracts::action::DecisionAction;
use arbiter_contracts::config::UncertaintyConfig;
use arbiter_contracts::decision::GateSignal;
use arbiter_contracts::request::{Context, Evidence, Intent};
use arbiter_core::traits::Gate;

/// Evaluates the `rag` evidence section.
///
/// Rules run in a fixed order and the first hit wins within the gate:
/// confidence, conflicts, knowledge-base age, tool disagreement, coverage.
pub struct UncertaintyGate {
    config: UncertaintyConfig,
}

impl UncertaintyGate {
    pub fn new(config: UncertaintyConfig) -> Self {
        Self { config }
    }
}

impl Default for UncertaintyGate {
    fn default() -> Self {
        Self::new(UncertaintyConfig::default())
    }
}

impl Gate for UncertaintyGate {
    fn name(&self) -> &'static str {
        "uncertainty"
    }

    fn evaluate(&self, _intent: &Intent, _context: &Context, evidence: &Evidence) -> GateSignal {
        let confidence = evidence.f64_or("rag.confidence", 1.0);
        let source = evidence.str_or("rag.source", "unknown");

        // Rule 1: low retrieval confidence.
        if confidence < self.config.confidence_threshold {
            return GateSignal::trigger(
                DecisionAction::Restrict,
                "LOW_CONFIDENCE",
                format!(
                    "Retrieval confidence {confidence:.2} is below threshold {:.2} (source: {source})",
                    self.config.confidence_threshold
                ),
            );
        }

        // Rule 2: conflicting retrieval results.
        let has_conflicts = evidence.bool_or("rag.has_conflicts", false);
        let conflict_count = evidence.f64_or("rag.conflict_count", 0.0) as i64;
        if has_conflicts || conflict_count > 0 {
            let action = if self.config.stop_on_conflict {
                DecisionAction::Stop
            } else {
                DecisionAction::Restrict
            };
            return GateSignal::trigger(
                action,
                "CONFLICTS",
                format!(
                    "Retrieval has {conflict_count} conflicting results - cannot determine correct answer"
                ),
            );
        }

        // Rule 3: outdated knowledge base.
        let kb_version = evidence.str_or("rag.kb_version", "unknown");
        let kb_age_days = evidence.f64_or("rag.kb_age_days", 0.0) as i64;
        if kb_age_days > self.config.outdated_version_days {
            return GateSignal::trigger(
                DecisionAction::Restrict,
                "OUTDATED_KB",
                format!(
                    "Knowledge base version {kb_version} is {kb_age_days} days old (outdated threshold: {} days)",
                    self.config.outdated_version_days
                ),
            );
        }

        // Rule 4: tools disagree. A machine cannot break that tie.
        if evidence.bool_or("rag.tool_disagreement", false) {
            return GateSignal::trigger(
                DecisionAction::Escalate,
                "TOOL_DISAGREEMENT",
                "Multiple tools provided conflicting results - requires human review",
            );
        }

        // Rule 5: incomplete coverage. The threshold rides in with the
        // evidence because coverage expectations are collector-specific.
        let coverage = evidence.f64_or("rag.coverage", 1.0);
        let coverage_threshold = evidence.f64_or("rag.coverage_threshold", 0.8);
        if coverage < coverage_threshold {
            return GateSignal::trigger(
                DecisionAction::Restrict,
                "LOW_COVERAGE",
                format!(
                    "Retrieval coverage {coverage:.2} is incomplete (threshold: {coverage_threshold:.2})"
                ),
            );
        }

        GateSignal::abstain(format!(
            "Uncertainty is acceptable (confidence: {confidence:.2}, coverage: {coverage:.2})"
        ))
    }

    fn config_snapshot(&self) -> Option<Value> {
        Some(json!({
            "confidence_threshold": self.config.confidence_threshold,
            "stop_on_conflict": self.config.stop_on_conflict,
            "outdated_version_days": self.config.outdated_version_days,
        }))
    }

    fn input_summary(&self, evidence: &Evidence) -> Option<Value> {
        Some(json!({
            "rag": {
                "confidence": evidence.rag.get("confidence"),
                "source": evidence.rag.get("source"),
                "has_conflicts": evidence.rag.get("has_conflicts"),
                "conflict_count": evidence.rag.get("conflict_count"),
                "kb_version": evidence.rag.get("kb_version"),
                "kb_age_days": evidence.rag.get("kb_age_days"),
                "coverage": evidence.rag.get("coverage"),
                "tool_disagreement": evidence.rag.get("tool_disagreement"),
            }
        }))
    }
}
