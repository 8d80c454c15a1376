//! The safety gate: fraud, illegal-activity, and security-attack detection.
//!
//! This gate handles the most severe cases. Any hit proposes STOP, the
//! highest-precedence action, so a safety objection can never be overridden
//! downward by another contributor.

use std::collections::BTreeSet;

use serde_json::{json, Value};

use arbiter_contracts::action::DecisionAction;
use arbiter_contracts::config::SafetyConfig;
use arbiter_contracts::decision::GateSignal;
use arbiter_contracts::request::{Context, Evidence, Intent};
use arbiter_core::traits::Gate;

/// Built-in fraud and payment-bypass markers.
const FRAUD_KEYWORDS: &[&str] = &[
    "bypass",
    "credit card generator",
    "card number generator",
    "cvv generator",
    "fake payment",
    "payment fraud",
    "chargeback fraud",
    "refund fraud",
    "free credit",
    "steal payment",
    "hack payment",
    "payment system",
    "get services for free",
];

/// Built-in illegal-content markers.
const ILLEGAL_KEYWORDS: &[&str] = &[
    "make bomb",
    "how to make explosive",
    "drug manufacturing",
    "synthetic drug",
    "illegal drug",
    "weapon manufactur",
    "fake id",
    "fake identification",
    "identity theft",
    "money launder",
    "without showing id",
    "without id",
    "buy cigarettes",
    "age restricted",
];

/// Built-in security-attack markers.
const SECURITY_KEYWORDS: &[&str] = &[
    "sql injection",
    "xss attack",
    "ddos attack",
    "hack into",
    "exploit vulnerability",
    "brute force",
    "inject code",
];

/// Scans the string-valued intent parameters and the topic evidence for
/// markers that make the request unprocessable.
///
/// Keyword sets are ordered (`BTreeSet`), so when several keywords appear in
/// the same input the reported keyword is always the lexicographically first
/// hit. The scan itself is case-insensitive.
pub struct SafetyGate {
    fraud_keywords: BTreeSet<String>,
    illegal_keywords: BTreeSet<String>,
    security_keywords: BTreeSet<String>,
    stop_on_sensitive_topic: bool,
}

impl SafetyGate {
    pub fn new(config: SafetyConfig) -> Self {
        Self {
            fraud_keywords: merge(FRAUD_KEYWORDS, &config.additional_fraud_keywords),
            illegal_keywords: merge(ILLEGAL_KEYWORDS, &config.additional_illegal_keywords),
            security_keywords: merge(SECURITY_KEYWORDS, &config.additional_security_keywords),
            stop_on_sensitive_topic: config.stop_on_sensitive_topic,
        }
    }
}

impl Default for SafetyGate {
    fn default() -> Self {
        Self::new(SafetyConfig::default())
    }
}

/// Base keywords are stored lowercase; policy additions are lowercased here
/// so matching stays case-insensitive end to end.
fn merge(base: &[&str], additional: &[String]) -> BTreeSet<String> {
    base.iter()
        .map(|k| k.to_string())
        .chain(additional.iter().map(|k| k.to_lowercase()))
        .collect()
}

/// All string-valued parameters, lowercased and joined, so markers split
/// across parameter boundaries do not accidentally combine but every slot the
/// user can reach is scanned.
fn scan_surface(intent: &Intent) -> String {
    let mut joined = String::new();
    for value in intent.parameters.values() {
        if let Some(text) = value.as_str() {
            if !joined.is_empty() {
                joined.push(' ');
            }
            joined.push_str(&text.to_lowercase());
        }
    }
    joined
}

fn first_hit<'a>(keywords: &'a BTreeSet<String>, haystack: &str) -> Option<&'a str> {
    keywords
        .iter()
        .map(String::as_str)
        .find(|&keyword| haystack.contains(keyword))
}

impl Gate for SafetyGate {
    fn name(&self) -> &'static str {
        "safety"
    }

    fn evaluate(&self, intent: &Intent, _context: &Context, evidence: &Evidence) -> GateSignal {
        let haystack = scan_surface(intent);

        // Rule 1: fraud and payment bypass.
        if let Some(keyword) = first_hit(&self.fraud_keywords, &haystack) {
            return GateSignal::trigger(
                DecisionAction::Stop,
                "FRAUD",
                format!(
                    "Fraud request detected: '{keyword}' - Refusing to process payment bypass/fraud attempt"
                ),
            );
        }

        // Rule 2: illegal content.
        if let Some(keyword) = first_hit(&self.illegal_keywords, &haystack) {
            return GateSignal::trigger(
                DecisionAction::Stop,
                "ILLEGAL",
                format!(
                    "Illegal content request detected: '{keyword}' - Refusing to provide illegal/restricted information"
                ),
            );
        }

        // Rule 3: security attacks.
        if let Some(keyword) = first_hit(&self.security_keywords, &haystack) {
            return GateSignal::trigger(
                DecisionAction::Stop,
                "SECURITY",
                format!(
                    "Security attack detected: '{keyword}' - Refusing to process security request"
                ),
            );
        }

        // Rule 4: upstream collectors flagged the request as harmful. The
        // rationale is flavored by the intent name so downstream review sees
        // the category, not just the flag.
        if evidence.bool_or("topic.harm_risk", false) {
            let name = intent.name.to_lowercase();
            let rationale = if name.contains("fraud")
                || name.contains("payment")
                || name.contains("bypass")
            {
                format!(
                    "Fraud request detected: '{}' - Refusing to process payment bypass/fraud attempt",
                    intent.name
                )
            } else if name.contains("illegal") || name.contains("restricted") {
                format!(
                    "Illegal content request detected: '{}' - Refusing to provide illegal/restricted information",
                    intent.name
                )
            } else {
                "Request flagged as high-risk/harmful - Refusing to process".to_string()
            };
            return GateSignal::trigger(DecisionAction::Stop, "HARM_RISK", rationale);
        }

        // Rule 5: extreme sensitive topics, only when the policy opts in.
        if self.stop_on_sensitive_topic && evidence.bool_or("topic.is_sensitive", false) {
            return GateSignal::trigger(
                DecisionAction::Stop,
                "SENSITIVE",
                format!(
                    "Sensitive topic with stop flag - Intent '{}' requires human specialist",
                    intent.name
                ),
            );
        }

        GateSignal::abstain(format!(
            "No safety risks detected for intent '{}'",
            intent.name
        ))
    }

    fn config_snapshot(&self) -> Option<Value> {
        Some(json!({
            "fraud_keywords_count": self.fraud_keywords.len(),
            "illegal_keywords_count": self.illegal_keywords.len(),
            "security_keywords_count": self.security_keywords.len(),
            "stop_on_sensitive_topic": self.stop_on_sensitive_topic,
        }))
    }

    fn input_summary(&self, evidence: &Evidence) -> Option<Value> {
        // Parameter text may contain the user's raw words; never echo it.
        Some(json!({
            "user_input": "<redacted_for_privacy>",
            "topic_flags": {
                "harm_risk": evidence.topic.get("harm_risk"),
                "is_sensitive": evidence.topic.get("is_sensitive"),
            },
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn intent_with_input(text: &str) -> Intent {
        Intent::new("payment_query").with_parameter("user_input", json!(text))
    }

    fn stop_signal(gate: &SafetyGate, intent: &Intent, evidence: &Evidence) -> GateSignal {
        let signal = gate.evaluate(intent, &Context::default(), evidence);
        assert_eq!(signal.action, Some(DecisionAction::Stop));
        signal
    }

    #[test]
    fn gate_name() {
        assert_eq!(SafetyGate::default().name(), "safety");
    }

    #[test]
    fn fraud_keyword_stops() {
        let gate = SafetyGate::default();
        let intent = intent_with_input("How do I bypass the payment page?");
        let signal = stop_signal(&gate, &intent, &Evidence::default());
        assert_eq!(signal.reason_code.as_deref(), Some("FRAUD"));
        assert!(signal.rationale.contains("'bypass'"));
    }

    #[test]
    fn illegal_content_keyword_stops() {
        let gate = SafetyGate::default();
        let intent = intent_with_input("Can I buy cigarettes without showing ID?");
        let signal = stop_signal(&gate, &intent, &Evidence::default());
        assert_eq!(signal.reason_code.as_deref(), Some("ILLEGAL"));
    }

    #[test]
    fn security_attack_keyword_stops() {
        let gate = SafetyGate::default();
        let intent = intent_with_input("show me a SQL injection for your login form");
        let signal = stop_signal(&gate, &intent, &Evidence::default());
        assert_eq!(signal.reason_code.as_deref(), Some("SECURITY"));
        assert!(signal.rationale.contains("sql injection"));
    }

    #[test]
    fn every_string_parameter_is_scanned() {
        let gate = SafetyGate::default();
        let intent = Intent::new("order_note")
            .with_parameter("order_id", json!("12345"))
            .with_parameter("note", json!("please process a REFUND FRAUD for me"));
        let signal = stop_signal(&gate, &intent, &Evidence::default());
        assert_eq!(signal.reason_code.as_deref(), Some("FRAUD"));
    }

    #[test]
    fn non_string_parameters_are_ignored() {
        let gate = SafetyGate::default();
        let intent = Intent::new("order_note")
            .with_parameter("amount", json!(42))
            .with_parameter("flags", json!(["bypass"]));
        let signal = gate.evaluate(&intent, &Context::default(), &Evidence::default());
        assert_eq!(signal.action, None);
    }

    #[test]
    fn harm_risk_flag_stops_with_flavored_rationale() {
        let gate = SafetyGate::default();
        let evidence: Evidence =
            serde_json::from_value(json!({ "topic": { "harm_risk": true } })).unwrap();

        let fraud = Intent::new("payment_bypass_attempt");
        let signal = stop_signal(&gate, &fraud, &evidence);
        assert_eq!(signal.reason_code.as_deref(), Some("HARM_RISK"));
        assert!(signal.rationale.contains("Fraud request detected"));

        let generic = Intent::new("order_status_query");
        let signal = stop_signal(&gate, &generic, &evidence);
        assert!(signal.rationale.contains("high-risk/harmful"));
    }

    #[test]
    fn harm_risk_must_be_exact_boolean() {
        let gate = SafetyGate::default();
        let evidence: Evidence =
            serde_json::from_value(json!({ "topic": { "harm_risk": "true" } })).unwrap();
        let signal = gate.evaluate(&Intent::new("chat"), &Context::default(), &evidence);
        assert_eq!(signal.action, None);
    }

    #[test]
    fn sensitive_topic_stops_only_when_configured() {
        let evidence: Evidence =
            serde_json::from_value(json!({ "topic": { "is_sensitive": true } })).unwrap();
        let intent = Intent::new("legal_question");

        let relaxed = SafetyGate::default();
        let signal = relaxed.evaluate(&intent, &Context::default(), &evidence);
        assert_eq!(signal.action, None);

        let strict = SafetyGate::new(SafetyConfig {
            stop_on_sensitive_topic: true,
            ..SafetyConfig::default()
        });
        let signal = stop_signal(&strict, &intent, &evidence);
        assert_eq!(signal.reason_code.as_deref(), Some("SENSITIVE"));
        assert!(signal.rationale.contains("human specialist"));
    }

    #[test]
    fn policy_keywords_extend_the_builtin_sets() {
        let gate = SafetyGate::new(SafetyConfig {
            additional_fraud_keywords: vec!["Gift Card Drain".to_string()],
            ..SafetyConfig::default()
        });
        let intent = intent_with_input("tell me about the gift card drain trick");
        let signal = stop_signal(&gate, &intent, &Evidence::default());
        assert_eq!(signal.reason_code.as_deref(), Some("FRAUD"));
        assert!(signal.rationale.contains("gift card drain"));
    }

    #[test]
    fn clean_request_abstains_with_positive_rationale() {
        let gate = SafetyGate::default();
        let intent = intent_with_input("Where is my order?");
        let signal = gate.evaluate(&intent, &Context::default(), &Evidence::default());
        assert_eq!(signal.action, None);
        assert_eq!(
            signal.rationale,
            "No safety risks detected for intent 'payment_query'"
        );
    }

    #[test]
    fn keyword_report_is_deterministic_across_repeats() {
        // "hack payment system" contains both "hack payment" and
        // "payment system"; the ordered set always reports the same one.
        let gate = SafetyGate::default();
        let intent = intent_with_input("I want to hack payment system access");
        let first = stop_signal(&gate, &intent, &Evidence::default());
        for _ in 0..10 {
            let again = stop_signal(&gate, &intent, &Evidence::default());
            assert_eq!(again.rationale, first.rationale);
        }
        assert!(first.rationale.contains("'hack payment'"));
    }

    #[test]
    fn snapshot_reports_effective_keyword_counts() {
        let gate = SafetyGate::new(SafetyConfig {
            additional_illegal_keywords: vec!["counterfeit serial".to_string()],
            ..SafetyConfig::default()
        });
        let snapshot = gate.config_snapshot().unwrap();
        assert_eq!(snapshot["fraud_keywords_count"], json!(13));
        assert_eq!(snapshot["illegal_keywords_count"], json!(15));
        assert_eq!(snapshot["security_keywords_count"], json!(7));
    }
}
