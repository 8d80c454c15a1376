//! Core trait definitions for the governance pipeline.
//!
//! Three traits define the seams of the gate:
//!
//! - `Gate`       — one domain heuristic (safety, facts, uncertainty, ...)
//! - `RuleEngine` — the policy-author rule matcher, evaluated before gates
//! - `AuditSink`  — optional append-only record of finished decisions
//!
//! Every implementation must be deterministic and free of I/O: the pipeline
//! promises that repeated evaluation of the same inputs produces the same
//! action, decision code, and final gate. Anything slow or fallible belongs
//! outside, in the boundary collaborator that feeds the pipeline.

use serde_json::Value;

use arbiter_contracts::{
    decision::{Decision, GateSignal},
    error::ArbiterResult,
    policy::{PolicyInfo, RuleMatch},
    request::{Context, Evidence, Intent},
};

/// A single-responsibility evaluator that inspects the request and may
/// propose a governance action.
///
/// Gates hold their configuration immutably from construction; `evaluate`
/// never mutates anything, never performs I/O, and never fails. A missing
/// evidence key is "unknown", which each gate treats as non-triggering
/// unless its documented rule says otherwise.
pub trait Gate: Send + Sync {
    /// Stable name used in audit records and decision codes
    /// (e.g. "safety", "fact_verifiability").
    fn name(&self) -> &'static str;

    /// Inspect the request and either propose an action or abstain.
    ///
    /// The returned rationale is always non-empty: it explains the objection
    /// or the abstention, and is joined into the decision rationale when the
    /// gate proposes the winning action.
    fn evaluate(&self, intent: &Intent, context: &Context, evidence: &Evidence) -> GateSignal;

    /// Snapshot of the configuration this gate evaluates under, recorded
    /// alongside its verdict for audit review.
    fn config_snapshot(&self) -> Option<Value> {
        None
    }

    /// Redacted slice of the evidence this gate read. Implementations must
    /// not echo raw user input here.
    fn input_summary(&self, evidence: &Evidence) -> Option<Value> {
        let _ = evidence;
        None
    }
}

/// The policy-rule matcher: applies author-defined rules before any gate
/// runs.
///
/// Implementations are trusted and must be deterministic. A malformed
/// condition inside a rule is the author's mistake and degrades to "rule
/// does not match"; it must never surface as an error from `first_match`.
pub trait RuleEngine: Send + Sync {
    /// Identity of the policy this engine was compiled from, stamped onto
    /// every decision made under it.
    fn describe(&self) -> PolicyInfo;

    /// Return the highest-priority enabled rule whose conditions are fully
    /// satisfied, or `None` when no rule matches.
    fn first_match(
        &self,
        intent: &Intent,
        context: &Context,
        evidence: &Evidence,
    ) -> Option<RuleMatch>;
}

/// An append-only sink for finished decisions.
///
/// The pipeline itself never writes audit records (it stays pure); the
/// boundary service appends each decision after evaluation. Implementations
/// must treat `append` as append-only: records are never modified or
/// deleted.
pub trait AuditSink: Send + Sync {
    /// Append one decision to the log.
    fn append(&self, decision: &Decision) -> ArbiterResult<()>;
}
