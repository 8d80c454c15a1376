//! # arbiter-service
//!
//! The boundary service in front of the ARBITER pipeline: request validation,
//! policy loading, failure modes, latency measurement, and best-effort audit
//! recording.
//!
//! ## Overview
//!
//! Transports (the CLI, an HTTP adapter) hand a [`GovernanceRequest`] to
//! [`GovernanceService::decide`] and get back a [`DecisionResponse`]. The
//! service resolves the request's `policy_path` against its configured policy
//! directory, loads and compiles the document, builds the gate lineup from
//! the document's overrides, and runs the pipeline. Without a `policy_path`
//! the gates run alone on their defaults.
//!
//! A request that fails validation is an error. A policy that cannot be used
//! is not: the service answers with a synthetic decision per its configured
//! [`FailureMode`], so callers always receive a governance answer for
//! well-formed input.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use arbiter_contracts::request::Intent;
//! use arbiter_service::{GovernanceRequest, GovernanceService, ServiceConfig};
//!
//! let service = GovernanceService::new(ServiceConfig::from_env()?);
//! let mut request = GovernanceRequest::new(Intent::new("order_status_query"));
//! request.policy_path = Some("customer_support.yaml".into());
//!
//! let response = service.decide(&request)?;
//! println!("{} ({})", response.decision.action, response.decision.decision_code);
//! ```

pub mod request;
pub mod response;
pub mod service;

pub use request::GovernanceRequest;
pub use response::DecisionResponse;
pub use service::{
    FailureMode, GovernanceService, PolicySummary, ServiceConfig, FAILURE_MODE_ENV,
    POLICY_DIR_ENV, SERVICE_CONTRIBUTOR,
};

// ── Tests ─────────────────────────────────────────────────────────────────────
