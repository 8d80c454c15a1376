//! In-memory implementation of `AuditSink`.
//!
//! `InMemoryDecisionLog` holds the whole chain in a mutex-guarded `Vec`, so
//! the service can append decisions while another thread exports or checks
//! the same log. `export_log()` snapshots the chain into an `AuditLog`;
//! `verify_integrity()` re-walks it in place.

use std::sync::{Arc, Mutex};

use chrono::Utc;
use tracing::info;

use arbiter_contracts::{
    decision::Decision,
    error::{ArbiterError, ArbiterResult},
};
use arbiter_core::traits::AuditSink;

use crate::{
    chain::{hash_entry, verify_chain},
    entry::{AuditEntry, AuditLog},
};

// ── Internal mutable state ────────────────────────────────────────────────────

/// What lives behind the log's `Arc<Mutex<_>>`.
pub(crate) struct InMemoryState {
    /// The chain so far, in append order.
    pub(crate) entries: Vec<AuditEntry>,

    /// Sequence number the next append will receive.
    pub(crate) sequence: u64,

    /// `this_hash` of the newest entry; `GENESIS_HASH` while the chain is
    /// still empty, which makes the first entry's `prev_hash` come out right
    /// with no special case.
    pub(crate) last_hash: String,
}

// ── Public log ────────────────────────────────────────────────────────────────

/// An in-memory, append-only decision log backed by a SHA-256 hash chain.
///
/// # Thread safety
///
/// All methods lock the shared state internally; callers need no outside
/// synchronization to append from one thread and export from another.
pub struct InMemoryDecisionLog {
    stream: String,
    pub(crate) state: Arc<Mutex<InMemoryState>>,
}

impl InMemoryDecisionLog {
    /// Open an empty log for the named decision stream.
    pub fn new(stream: impl Into<String>) -> Self {
        let stream = stream.into();
        let state = InMemoryState {
            entries: Vec::new(),
            sequence: 0,
            last_hash: AuditEntry::GENESIS_HASH.to_string(),
        };
        Self {
            stream,
            state: Arc::new(Mutex::new(state)),
        }
    }

    /// Snapshot every entry appended so far into a sealed `AuditLog`.
    ///
    /// `terminal_hash` comes from the newest entry and is empty for a log
    /// with no entries.
    pub fn export_log(&self) -> AuditLog {
        let state = self.state.lock().expect("audit state lock poisoned");
        let terminal_hash = state
            .entries
            .last()
            .map(|e| e.this_hash.clone())
            .unwrap_or_default();

        info!(
            stream = %self.stream,
            entry_count = state.entries.len(),
            terminal_hash = %terminal_hash,
            "audit log exported"
        );

        AuditLog {
            stream: self.stream.clone(),
            entries: state.entries.clone(),
            finalized_at: Utc::now(),
            terminal_hash,
        }
    }

    /// Run `verify_chain` over the live entries: linkage plus hash
    /// correctness for each one.
    pub fn verify_integrity(&self) -> bool {
        let state = self.state.lock().expect("audit state lock poisoned");
        verify_chain(&state.entries)
    }

    /// Number of entries appended so far.
    pub fn len(&self) -> usize {
        self.state.lock().expect("audit state lock poisoned").entries.len()
    }

    /// True when nothing has been appended yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// ── AuditSink impl ────────────────────────────────────────────────────────────

impl AuditSink for InMemoryDecisionLog {
    /// Append one decision to the hash chain.
    ///
    /// Hashes the decision against the current chain tip, pushes the new
    /// `AuditEntry`, and moves the tip forward. The only error is
    /// `AuditWriteFailed` from a poisoned mutex, which a healthy process
    /// never produces.
    fn append(&self, decision: &Decision) -> ArbiterResult<()> {
        let mut state = self.state.lock().map_err(|e| ArbiterError::AuditWriteFailed {
            reason: format!("audit state lock poisoned: {}", e),
        })?;

        let prev_hash = state.last_hash.clone();
        let sequence = state.sequence;

        let this_hash = hash_entry(&self.stream, sequence, decision, &prev_hash);

        let entry = AuditEntry {
            sequence,
            stream: self.stream.clone(),
            decision: decision.clone(),
            prev_hash,
            this_hash: this_hash.clone(),
        };

        state.entries.push(entry);
        state.sequence += 1;
        state.last_hash = this_hash;

        Ok(())
    }
}
