//! The YAML policy document: schema types, loading, and validation.
//!
//! A document carries the policy's identity, optional per-gate configuration
//! overrides, and the ordered rule list. Parsing is strict (`deny_unknown_fields`
//! everywhere, actions must use their canonical spellings), while
//! [`PolicyDocument::validate`] collects every remaining schema violation in
//! one pass so an author sees the full list instead of the first failure.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use arbiter_contracts::{
    action::DecisionAction,
    config::GateOverrides,
    error::{ArbiterError, ArbiterResult},
    policy::PolicyInfo,
};

use crate::conditions;

/// A complete governance policy as authored in YAML.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PolicyDocument {
    /// Schema version. Only the `1.x` line is understood.
    pub version: String,
    /// Policy name, stamped onto every decision made under this document.
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Per-gate overrides. An absent section runs that gate on defaults.
    #[serde(default)]
    pub gates: GateOverrides,
    /// Rules in declaration order. Declaration order breaks priority ties.
    pub rules: Vec<RuleDef>,
    /// Free-form annotations carried along but never evaluated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
}

/// One entry of the document's `rules:` list.
///
/// `action` must use a canonical spelling (`ALLOW`, `RESTRICT`, `ESCALATE`,
/// `STOP`); anything else fails at parse time rather than validation time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuleDef {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Higher priorities are evaluated first.
    #[serde(default)]
    pub priority: i64,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// field-path -> { operator -> operand }. All entries must hold (AND);
    /// an empty map always matches.
    pub conditions: BTreeMap<String, BTreeMap<String, Value>>,
    pub action: DecisionAction,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

fn default_enabled() -> bool {
    true
}

impl PolicyDocument {
    /// Parse a document from YAML text without validating it.
    pub fn from_yaml_str(text: &str) -> ArbiterResult<Self> {
        serde_yaml::from_str(text).map_err(|e| ArbiterError::PolicyParse {
            reason: e.to_string(),
        })
    }

    /// Read and parse a document from disk.
    pub fn from_file(path: &Path) -> ArbiterResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => ArbiterError::PolicyNotFound {
                path: path.display().to_string(),
            },
            _ => ArbiterError::PolicyParse {
                reason: format!("failed to read policy file '{}': {e}", path.display()),
            },
        })?;
        Self::from_yaml_str(&text)
    }

    /// Read, parse, and validate in one step. This is the entry point the
    /// evaluation service uses; callers that want the individual violations
    /// use [`PolicyDocument::from_file`] plus [`PolicyDocument::validate`].
    pub fn load(path: &Path) -> ArbiterResult<Self> {
        let doc = Self::from_file(path)?;
        let violations = doc.validate();
        if violations.is_empty() {
            Ok(doc)
        } else {
            Err(ArbiterError::PolicyInvalid {
                reason: violations.join("; "),
            })
        }
    }

    /// Every schema violation in the document. Empty means valid.
    pub fn validate(&self) -> Vec<String> {
        let mut violations = Vec::new();

        if !self.version.starts_with("1.") {
            violations.push(format!(
                "unsupported schema version '{}' (expected 1.x)",
                self.version
            ));
        }
        if self.name.trim().is_empty() {
            violations.push("policy name must not be empty".to_string());
        }

        let mut seen = BTreeSet::new();
        for (index, rule) in self.rules.iter().enumerate() {
            let label = if rule.name.trim().is_empty() {
                violations.push(format!("rule #{index}: name must not be empty"));
                format!("#{index}")
            } else {
                format!("'{}'", rule.name)
            };

            if !rule.name.trim().is_empty() && !seen.insert(rule.name.clone()) {
                violations.push(format!("duplicate rule name {label}"));
            }
            if rule.priority < 0 {
                violations.push(format!("rule {label}: priority must be non-negative"));
            }

            for (path, operators) in &rule.conditions {
                if operators.is_empty() {
                    violations.push(format!(
                        "rule {label}: condition '{path}' has no operators"
                    ));
                }
                for (operator, operand) in operators {
                    if !conditions::is_known_operator(operator) {
                        violations.push(format!(
                            "rule {label}: unknown operator '{operator}' on '{path}'"
                        ));
                    } else if let Some(problem) = conditions::operand_problem(operator, operand) {
                        violations.push(format!("rule {label}, condition '{path}': {problem}"));
                    }
                }
            }
        }

        violations
    }

    /// The identity stamped onto decisions made under this document.
    pub fn info(&self) -> PolicyInfo {
        PolicyInfo {
            name: self.name.clone(),
            version: self.version.clone(),
        }
    }

    /// Names of the gates this document overrides, in evaluation order.
    pub fn gates_configured(&self) -> Vec<&'static str> {
        let mut configured = Vec::new();
        if self.gates.safety.is_some() {
            configured.push("safety");
        }
        if self.gates.fact_verifiability.is_some() {
            configured.push("fact_verifiability");
        }
        if self.gates.uncertainty.is_some() {
            configured.push("uncertainty");
        }
        if self.gates.responsibility.is_some() {
            configured.push("responsibility");
        }
        configured
    }

    /// Count of rules with `enabled: true`.
    pub fn enabled_rule_count(&self) -> usize {
        self.rules.iter().filter(|r| r.enabled).count()
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────
