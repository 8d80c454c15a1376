//! Audit entry and log types.
//!
//! `AuditEntry` pairs one finished `Decision` with its position in a stream
//! and the two SHA-256 digests that chain it to its neighbors. `AuditLog`
//! is a point-in-time export of a whole stream.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use arbiter_contracts::decision::Decision;

/// A single link in the SHA-256 hash chain of one decision stream.
///
/// Every entry names its predecessor's hash in `prev_hash`, so the stream
/// only grows at the tail. Edit any field, the embedded `decision`
/// included, and `this_hash` no longer recomputes, nor does any later
/// entry's `prev_hash` line up; `verify_chain` catches both.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    /// Zero-based position in the chain; strictly increasing.
    pub sequence: u64,

    /// The decision stream this entry belongs to.
    pub stream: String,

    /// The decision exactly as the pipeline produced it.
    pub decision: Decision,

    /// Hex SHA-256 of the preceding entry; `GENESIS_HASH` at sequence 0.
    pub prev_hash: String,

    /// Hex SHA-256 of this entry, as computed by `hash_entry()` from the
    /// stream name, the sequence, `prev_hash`, and the decision's canonical
    /// JSON.
    pub this_hash: String,
}

impl AuditEntry {
    /// Sentinel `prev_hash` for sequence 0.
    ///
    /// Sixty-four hex zeros. SHA-256 never produces this digest for real
    /// input, so the start of a chain is unmistakable.
    pub const GENESIS_HASH: &'static str =
        "0000000000000000000000000000000000000000000000000000000000000000";
}

/// One stream's audit trail, exported through
/// `InMemoryDecisionLog::export_log()`.
///
/// `terminal_hash` commits to everything before it: re-verifying the chain
/// and comparing the final hash against a previously published
/// `terminal_hash` proves the log has not been rewritten since.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditLog {
    /// The stream whose decisions are recorded here.
    pub stream: String,

    /// Entries ordered by sequence, 0 first.
    pub entries: Vec<AuditEntry>,

    /// UTC time of the export.
    pub finalized_at: DateTime<Utc>,

    /// `this_hash` of the final entry, or the empty string for an empty log.
    pub terminal_hash: String,
}
