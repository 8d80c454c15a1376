//! Per-gate configuration, overridable from the `gates:` section of a policy
//! document.
//!
//! Every field has a default, so an absent section or field means "gate
//! default", and unknown field names are rejected at parse time to keep typos
//! from silently reverting a threshold.

use serde::{Deserialize, Serialize};

/// Overrides for the safety gate.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SafetyConfig {
    /// Extra fraud markers merged into the built-in keyword set.
    pub additional_fraud_keywords: Vec<String>,
    /// Extra illegal-activity markers merged into the built-in keyword set.
    pub additional_illegal_keywords: Vec<String>,
    /// Extra security-attack markers merged into the built-in keyword set.
    pub additional_security_keywords: Vec<String>,
    /// When set, `topic.is_sensitive` stops the request at the safety gate
    /// instead of leaving sensitivity to the responsibility gate.
    pub stop_on_sensitive_topic: bool,
}

/// Overrides for the fact-verifiability gate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FactVerifiabilityConfig {
    /// Intents that must be answered from verifiable, current facts.
    pub require_realtime_facts: Vec<String>,
    /// Minimum acceptable `facts.verifiable_confidence` for realtime intents.
    pub verifiable_threshold: f64,
    /// Escalate unverifiable realtime facts to STOP instead of RESTRICT.
    pub stop_on_unverifiable: bool,
}

impl Default for FactVerifiabilityConfig {
    fn default() -> Self {
        Self {
            require_realtime_facts: Vec::new(),
            verifiable_threshold: 0.7,
            stop_on_unverifiable: false,
        }
    }
}

/// Overrides for the uncertainty gate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct UncertaintyConfig {
    /// Minimum acceptable `rag.confidence`.
    pub confidence_threshold: f64,
    /// Turn retrieval conflicts into STOP instead of RESTRICT.
    pub stop_on_conflict: bool,
    /// Knowledge-base age in days beyond which retrieval is considered
    /// outdated.
    pub outdated_version_days: i64,
}

impl Default for UncertaintyConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: 0.6,
            stop_on_conflict: false,
            outdated_version_days: 30,
        }
    }
}

/// Overrides for the responsibility gate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ResponsibilityConfig {
    /// Intents that carry financial responsibility and always escalate.
    pub financial_intents: Vec<String>,
    /// Intents that commit the organization and always escalate.
    pub authority_intents: Vec<String>,
    /// Intents touching regulated advice domains.
    pub sensitive_intents: Vec<String>,
    /// Turn sensitive intents/topics into STOP instead of ESCALATE.
    pub stop_on_sensitive: bool,
}

impl Default for ResponsibilityConfig {
    fn default() -> Self {
        Self {
            financial_intents: to_strings(&[
                "refund",
                "compensation",
                "discount_approval",
                "credit_request",
                "payment_adjustment",
            ]),
            authority_intents: to_strings(&[
                "policy_change",
                "contract_modification",
                "commitment",
                "guarantee",
            ]),
            sensitive_intents: to_strings(&[
                "legal_advice",
                "medical_advice",
                "regulatory_compliance",
            ]),
            stop_on_sensitive: false,
        }
    }
}

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// The full `gates:` section of a policy document. Absent entries mean the
/// gate runs with its defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GateOverrides {
    pub safety: Option<SafetyConfig>,
    pub fact_verifiability: Option<FactVerifiabilityConfig>,
    pub uncertainty: Option<UncertaintyConfig>,
    pub responsibility: Option<ResponsibilityConfig>,
}
