//! The governance service: the boundary in front of the pipeline.
//!
//! The service owns everything a transport should not have to think about:
//! request validation, policy path resolution, document loading, gate
//! construction from policy overrides, failure-mode handling, latency
//! measurement, and best-effort audit recording. One instance serves any
//! number of callers; evaluation holds no shared mutable state.

use std::env;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use serde::Serialize;
use serde_json::json;
use tracing::{debug, warn};

use arbiter_contracts::{
    action::DecisionAction,
    config::GateOverrides,
    decision::{build_decision_code, required_steps, Decision, GateVerdict, TraceId},
    error::{ArbiterError, ArbiterResult},
};
use arbiter_core::traits::AuditSink;
use arbiter_core::GovernancePipeline;
use arbiter_gates::standard_gates;
use arbiter_policy::{PolicyDocument, PolicyEvaluator};

use crate::request::GovernanceRequest;
use crate::response::DecisionResponse;

/// Environment variable naming the directory relative policy paths resolve
/// against.
pub const POLICY_DIR_ENV: &str = "ARBITER_POLICY_DIR";

/// Environment variable selecting the failure mode.
pub const FAILURE_MODE_ENV: &str = "ARBITER_FAILURE_MODE";

/// Contributor name stamped on synthetic failure decisions. Not a gate, so
/// its decision codes carry the GOVERNANCE prefix.
pub const SERVICE_CONTRIBUTOR: &str = "service";

// ── Failure mode ─────────────────────────────────────────────────────────────

/// What the service answers when evaluation itself fails (a policy document
/// that cannot be read, parsed, or validated).
///
/// A well-formed request always gets a decision; the mode only picks which
/// one. Malformed requests are rejected outright and never reach this path.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FailureMode {
    /// Escalate to a human. The conservative default.
    #[default]
    FailClosed,
    /// Degrade to a restricted response.
    FailOpen,
}

impl FailureMode {
    /// The wire/env spelling.
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureMode::FailClosed => "fail_closed",
            FailureMode::FailOpen => "fail_open",
        }
    }

    /// The action a synthetic failure decision carries under this mode.
    fn fallback_action(&self) -> DecisionAction {
        match self {
            FailureMode::FailClosed => DecisionAction::Escalate,
            FailureMode::FailOpen => DecisionAction::Restrict,
        }
    }
}

impl std::str::FromStr for FailureMode {
    type Err = ArbiterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "fail_closed" => Ok(FailureMode::FailClosed),
            "fail_open" => Ok(FailureMode::FailOpen),
            other => Err(ArbiterError::Internal {
                reason: format!(
                    "unknown failure mode '{other}' (expected 'fail_closed' or 'fail_open')"
                ),
            }),
        }
    }
}

impl std::fmt::Display for FailureMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Configuration ────────────────────────────────────────────────────────────

/// Boundary configuration, sourced from the environment or built directly.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Directory that relative `policy_path`s resolve against.
    pub policy_dir: PathBuf,
    /// What happens when a policy cannot be loaded.
    pub failure_mode: FailureMode,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            policy_dir: PathBuf::from("./policies"),
            failure_mode: FailureMode::default(),
        }
    }
}

impl ServiceConfig {
    /// Read configuration from [`POLICY_DIR_ENV`] and [`FAILURE_MODE_ENV`].
    ///
    /// Unset variables keep their defaults. A malformed failure mode is an
    /// error rather than a silent fallback: an operator who asked for a mode
    /// and got the default instead would be running under the wrong policy
    /// posture without knowing it.
    pub fn from_env() -> ArbiterResult<Self> {
        let mut config = Self::default();
        if let Ok(dir) = env::var(POLICY_DIR_ENV) {
            if !dir.trim().is_empty() {
                config.policy_dir = PathBuf::from(dir);
            }
        }
        if let Ok(mode) = env::var(FAILURE_MODE_ENV) {
            config.failure_mode = mode.parse()?;
        }
        Ok(config)
    }
}

// ── Policy validation summary ────────────────────────────────────────────────

/// Result of standalone policy validation, reported without evaluating
/// anything.
#[derive(Debug, Clone, Serialize)]
pub struct PolicySummary {
    pub valid: bool,
    /// The resolved path that was checked.
    pub path: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    pub rule_count: usize,
    pub enabled_rule_count: usize,
    /// Gates the document overrides, in evaluation order.
    pub gates_configured: Vec<String>,
    /// Empty when `valid`; otherwise every violation found.
    pub errors: Vec<String>,
}

// ── Service ──────────────────────────────────────────────────────────────────

/// The boundary service in front of the pipeline.
pub struct GovernanceService {
    config: ServiceConfig,
    audit: Option<Arc<dyn AuditSink>>,
}

impl GovernanceService {
    /// Create a service without an audit sink.
    pub fn new(config: ServiceConfig) -> Self {
        Self {
            config,
            audit: None,
        }
    }

    /// Attach an audit sink. Recording is best-effort: a failing sink is
    /// logged and never blocks the decision.
    pub fn with_audit(mut self, audit: Arc<dyn AuditSink>) -> Self {
        self.audit = Some(audit);
        self
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Evaluate one request end to end.
    ///
    /// Only a malformed request is an `Err`. Policy problems produce a
    /// synthetic decision per the configured failure mode, so every
    /// well-formed request receives a governance answer.
    pub fn decide(&self, request: &GovernanceRequest) -> ArbiterResult<DecisionResponse> {
        request.validate()?;
        let started = Instant::now();

        let decision = match self.evaluate(request) {
            Ok(decision) => decision,
            Err(error) => {
                warn!(
                    error = %error,
                    mode = self.config.failure_mode.as_str(),
                    "evaluation failed, issuing synthetic decision"
                );
                self.synthetic_decision(&error)
            }
        };

        if let Some(sink) = &self.audit {
            if let Err(audit_error) = sink.append(&decision) {
                warn!(
                    error = %audit_error,
                    trace_id = %decision.trace_id,
                    "audit append failed, decision still returned"
                );
            }
        }

        Ok(DecisionResponse {
            decision,
            latency_ms: Some(started.elapsed().as_millis() as u64),
        })
    }

    /// Load and validate a policy without evaluating anything. Relative paths
    /// resolve against the configured policy directory, like evaluation.
    pub fn validate_policy(&self, path: &Path) -> PolicySummary {
        let resolved = self.resolve_policy_path(path);
        match PolicyDocument::from_file(&resolved) {
            Ok(document) => {
                let violations = document.validate();
                PolicySummary {
                    valid: violations.is_empty(),
                    path: resolved,
                    name: Some(document.name.clone()),
                    version: Some(document.version.clone()),
                    rule_count: document.rules.len(),
                    enabled_rule_count: document.enabled_rule_count(),
                    gates_configured: document
                        .gates_configured()
                        .iter()
                        .map(|gate| gate.to_string())
                        .collect(),
                    errors: violations,
                }
            }
            Err(error) => PolicySummary {
                valid: false,
                path: resolved,
                name: None,
                version: None,
                rule_count: 0,
                enabled_rule_count: 0,
                gates_configured: Vec::new(),
                errors: vec![error.to_string()],
            },
        }
    }

    /// Run the pipeline. No `policy_path` means a gates-only evaluation on
    /// default configurations; with one, the document's overrides shape the
    /// gate lineup and its rules join as the policy contributor.
    fn evaluate(&self, request: &GovernanceRequest) -> ArbiterResult<Decision> {
        let resolved = request
            .policy_path
            .as_deref()
            .map(|path| self.resolve_policy_path(path));

        match resolved {
            None => {
                let pipeline =
                    GovernancePipeline::new(standard_gates(&GateOverrides::default()));
                Ok(pipeline.evaluate(&request.intent, &request.context, &request.evidence, None))
            }
            Some(path) => {
                debug!(policy = %path.display(), "loading policy document");
                let document = PolicyDocument::load(&path)?;
                let pipeline = GovernancePipeline::new(standard_gates(&document.gates));
                let engine = PolicyEvaluator::new(&document);
                Ok(pipeline.evaluate(
                    &request.intent,
                    &request.context,
                    &request.evidence,
                    Some(&engine),
                ))
            }
        }
    }

    fn resolve_policy_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.config.policy_dir.join(path)
        }
    }

    /// Build the decision issued when evaluation itself fails. The synthetic
    /// contributor is [`SERVICE_CONTRIBUTOR`], never a real gate, so audit
    /// reviewers can tell a governed outcome from a degraded one at a glance.
    fn synthetic_decision(&self, error: &ArbiterError) -> Decision {
        let action = self.config.failure_mode.fallback_action();
        let stance = match self.config.failure_mode {
            FailureMode::FailClosed => "Failing closed",
            FailureMode::FailOpen => "Failing open",
        };
        let rationale = format!("Evaluation failed: {error}. {stance}.");

        Decision {
            action,
            rationale: rationale.clone(),
            trace_id: TraceId::new(),
            decision_code: build_decision_code(
                action,
                Some((SERVICE_CONTRIBUTOR, "EVALUATION_FAILURE")),
            ),
            final_gate: Some(SERVICE_CONTRIBUTOR.to_string()),
            gate_decisions: vec![GateVerdict {
                gate_name: SERVICE_CONTRIBUTOR.to_string(),
                suggested_action: Some(action),
                rationale,
                config_used: Some(json!({
                    "failure_mode": self.config.failure_mode.as_str()
                })),
                input_summary: None,
            }],
            evidence_summary: json!({ "failure": error.to_string() }),
            required_steps: required_steps(action),
            policy_name: None,
            policy_version: None,
            timestamp: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use arbiter_contracts::request::Intent;

    use super::*;
    use crate::request::GovernanceRequest;

    fn service_with(failure_mode: FailureMode) -> GovernanceService {
        GovernanceService::new(ServiceConfig {
            policy_dir: PathBuf::from("/srv/arbiter/policies"),
            failure_mode,
        })
    }

    #[test]
    fn failure_mode_spellings_round_trip() {
        assert_eq!(
            "fail_closed".parse::<FailureMode>().unwrap(),
            FailureMode::FailClosed
        );
        assert_eq!(
            "fail_open".parse::<FailureMode>().unwrap(),
            FailureMode::FailOpen
        );
        assert_eq!(FailureMode::FailClosed.as_str(), "fail_closed");
        assert_eq!(FailureMode::FailOpen.as_str(), "fail_open");

        let err = "explode".parse::<FailureMode>().unwrap_err();
        assert!(matches!(err, ArbiterError::Internal { .. }));
        assert!(err.to_string().contains("explode"));
    }

    #[test]
    fn relative_policy_paths_resolve_against_the_policy_dir() {
        let service = service_with(FailureMode::FailClosed);
        assert_eq!(
            service.resolve_policy_path(Path::new("customer_support.yaml")),
            PathBuf::from("/srv/arbiter/policies/customer_support.yaml")
        );
        // Absolute paths pass through untouched.
        assert_eq!(
            service.resolve_policy_path(Path::new("/etc/arbiter/strict.yaml")),
            PathBuf::from("/etc/arbiter/strict.yaml")
        );
    }

    /// One test covers all environment reads so no parallel test mutates the
    /// process environment underneath another.
    #[test]
    fn environment_overrides_are_read() {
        env::set_var(POLICY_DIR_ENV, "/opt/policies");
        env::set_var(FAILURE_MODE_ENV, "fail_open");
        let config = ServiceConfig::from_env().unwrap();
        assert_eq!(config.policy_dir, PathBuf::from("/opt/policies"));
        assert_eq!(config.failure_mode, FailureMode::FailOpen);

        env::set_var(FAILURE_MODE_ENV, "explode");
        assert!(ServiceConfig::from_env().is_err());

        env::remove_var(POLICY_DIR_ENV);
        env::remove_var(FAILURE_MODE_ENV);
        let config = ServiceConfig::from_env().unwrap();
        assert_eq!(config.policy_dir, PathBuf::from("./policies"));
        assert_eq!(config.failure_mode, FailureMode::FailClosed);
    }

    #[test]
    fn fail_closed_synthesizes_an_escalation() {
        let service = service_with(FailureMode::FailClosed);
        let mut request = GovernanceRequest::new(Intent::new("order_status_query"));
        request.policy_path = Some(PathBuf::from("does_not_exist.yaml"));

        let response = service.decide(&request).unwrap();
        let decision = &response.decision;

        assert_eq!(decision.action, DecisionAction::Escalate);
        assert_eq!(
            decision.decision_code,
            "GOVERNANCE_ESCALATE_EVALUATION_FAILURE"
        );
        assert_eq!(decision.final_gate.as_deref(), Some(SERVICE_CONTRIBUTOR));
        assert_eq!(decision.gate_decisions.len(), 1);
        assert_eq!(decision.gate_decisions[0].gate_name, SERVICE_CONTRIBUTOR);
        assert!(decision.rationale.contains("policy not found"));
        assert!(decision.rationale.contains("Failing closed"));
        assert!(!decision.required_steps.is_empty());
        assert!(decision.policy_name.is_none());
        assert!(response.latency_ms.is_some());
    }

    #[test]
    fn fail_open_synthesizes_a_restriction() {
        let service = service_with(FailureMode::FailOpen);
        let mut request = GovernanceRequest::new(Intent::new("order_status_query"));
        request.policy_path = Some(PathBuf::from("does_not_exist.yaml"));

        let decision = service.decide(&request).unwrap().decision;

        assert_eq!(decision.action, DecisionAction::Restrict);
        assert_eq!(
            decision.decision_code,
            "GOVERNANCE_RESTRICT_EVALUATION_FAILURE"
        );
        assert!(decision.rationale.contains("Failing open"));
        // RESTRICT carries no operator steps.
        assert!(decision.required_steps.is_empty());
    }

    #[test]
    fn malformed_requests_never_become_decisions() {
        let service = service_with(FailureMode::FailClosed);
        let request = GovernanceRequest::new(Intent::new("   "));
        assert!(matches!(
            service.decide(&request),
            Err(ArbiterError::InvalidInput { .. })
        ));
    }
}
