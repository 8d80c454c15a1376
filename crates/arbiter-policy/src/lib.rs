//! # arbiter-policy
//!
//! YAML policy documents and the rule matcher for the ARBITER governance
//! gate.
//!
//! ## Overview
//!
//! A policy document names the policy, optionally overrides per-gate
//! configuration, and declares an ordered list of rules. [`PolicyDocument`]
//! parses and validates the YAML; [`PolicyEvaluator`] compiles the enabled
//! rules into priority order and implements the
//! [`RuleEngine`](arbiter_core::traits::RuleEngine) trait the pipeline
//! consumes. The highest-priority rule whose conditions all hold wins;
//! declaration order breaks ties.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use std::path::Path;
//! use arbiter_policy::{PolicyDocument, PolicyEvaluator};
//!
//! let document = PolicyDocument::load(Path::new("policies/customer_support.yaml"))?;
//! let engine = PolicyEvaluator::new(&document);
//! // Pass `&engine` to `GovernancePipeline::evaluate(...)`.
//! ```
//!
//! ## Conditions
//!
//! A rule's `conditions` map field paths (e.g. `evidence.rag.confidence`)
//! to `{operator: operand}` entries; all entries must hold. The
//! [`conditions`] module documents the twenty operators. A condition that
//! cannot be evaluated (missing path, wrong types, uncompilable regex)
//! simply does not match; rule evaluation never fails.

pub mod conditions;
pub mod document;
pub mod evaluator;

pub use document::{PolicyDocument, RuleDef};
pub use evaluator::PolicyEvaluator;

// ── Tests ─────────────────────────────────────────────────────────────────────
