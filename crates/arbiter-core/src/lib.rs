//! # arbiter-core
//!
//! The deterministic evaluation engine for the ARBITER governance gate.
//!
//! This crate provides:
//! - The three core traits (`Gate`, `RuleEngine`, `AuditSink`)
//! - The `resolve` function that turns contributor signals into one outcome
//! - The `GovernancePipeline` that wires policy rules and gates together in
//!   the correct evaluation order
//!
//! ## Usage
//!
//! ```rust,ignore
//! use arbiter_core::{GovernancePipeline, traits::{Gate, RuleEngine, AuditSink}};
//! ```

pub mod pipeline;
pub mod resolver;
pub mod traits;

pub use pipeline::GovernancePipeline;
