//! Hash-chain primitives: entry hashing and chain verification.
//!
//! An entry's digest is SHA-256 over a fixed byte layout. Spelling the
//! layout out here keeps the committed fields auditable:
//!
//!   1. the stream name, UTF-8
//!   2. the sequence number, 8 bytes little-endian
//!   3. the previous hash, UTF-8 (64 ASCII hex chars)
//!   4. the decision as compact serde_json output

use sha2::{Digest, Sha256};

use arbiter_contracts::decision::Decision;

use crate::entry::AuditEntry;

/// SHA-256 digest for one audit entry, as a lowercase 64-char hex string.
///
/// The digest commits the entry to its stream, its chain position, its
/// predecessor, and the decision payload itself.
///
/// # Panics
///
/// Panics if `decision` fails JSON serialization, which the `Decision`
/// type never does.
pub fn hash_entry(stream: &str, sequence: u64, decision: &Decision, prev_hash: &str) -> String {
    // Compact serde_json output is deterministic for a given value, so the
    // same decision always hashes to the same digest.
    let decision_json =
        serde_json::to_vec(decision).expect("Decision must always be serializable to JSON");

    let mut hasher = Sha256::new();
    hasher.update(stream.as_bytes());
    hasher.update(sequence.to_le_bytes());
    hasher.update(prev_hash.as_bytes());
    hasher.update(&decision_json);

    hex::encode(hasher.finalize())
}

/// Walk a chain and confirm it is intact.
///
/// Two checks apply to every entry: its `prev_hash` must equal the
/// predecessor's `this_hash` (`GENESIS_HASH` at sequence 0), and its
/// `this_hash` must equal a fresh recomputation over its own fields. The
/// first mismatch returns `false`; a chain with no entries passes.
pub fn verify_chain(entries: &[AuditEntry]) -> bool {
    let mut expected_prev = AuditEntry::GENESIS_HASH.to_string();

    for entry in entries {
        // Linkage: the stored prev_hash must continue the chain.
        if entry.prev_hash != expected_prev {
            return false;
        }

        // Correctness: this_hash must match a fresh recomputation.
        let recomputed =
            hash_entry(&entry.stream, entry.sequence, &entry.decision, &entry.prev_hash);
        if entry.this_hash != recomputed {
            return false;
        }

        expected_prev = entry.this_hash.clone();
    }

    true
}
