//! The evaluation response handed back to a transport.

use serde::{Deserialize, Serialize};

use arbiter_contracts::decision::Decision;

/// A finished decision plus boundary telemetry.
///
/// The decision fields flatten into the response object, so transports
/// serialize the wire shape directly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionResponse {
    #[serde(flatten)]
    pub decision: Decision,
    /// Wall-clock time the boundary spent on this call, including policy
    /// loading. Absent when the caller did not ask for timing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,
}
