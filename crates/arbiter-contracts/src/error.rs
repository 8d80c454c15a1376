//! Error types shared across the ARBITER crates.
//!
//! Two classes of failure deliberately never appear here: malformed policy
//! conditions degrade to "rule does not match" inside the rule matcher, and
//! gates never fail on missing evidence. What remains are boundary errors:
//! policy documents that cannot be used, requests that cannot be accepted,
//! and faults the service maps to a synthetic fail-closed decision.

use thiserror::Error;

/// The unified error type for the ARBITER workspace.
#[derive(Debug, Error)]
pub enum ArbiterError {
    /// The referenced policy document does not exist.
    #[error("policy not found: {path}")]
    PolicyNotFound { path: String },

    /// The policy document could not be read or parsed.
    #[error("policy parse error: {reason}")]
    PolicyParse { reason: String },

    /// The policy document parsed but violates the schema rules
    /// (unsupported version, duplicate rule names, unknown operators, ...).
    #[error("policy invalid: {reason}")]
    PolicyInvalid { reason: String },

    /// The evaluation request itself is malformed (missing intent name,
    /// out-of-range confidence). Rejected at the boundary, never turned into
    /// a decision.
    #[error("invalid request: {reason}")]
    InvalidInput { reason: String },

    /// The audit sink could not record a decision.
    #[error("audit write failed: {reason}")]
    AuditWriteFailed { reason: String },

    /// An unexpected internal fault during evaluation.
    #[error("governance failure: {reason}")]
    Internal { reason: String },
}

/// Convenience alias used throughout the ARBITER crates.
pub type ArbiterResult<T> = Result<T, ArbiterError>;
