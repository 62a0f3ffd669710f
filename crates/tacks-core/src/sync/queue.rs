//! Pending-change queue bookkeeping.
//!
//! The queue is FIFO and keyed by `(id, queued_at)` so multiple edits to
//! the same record stay distinct and ordered. Delivery itself lives in the
//! engine; this type only tracks entries, retries, and abandonment.

use std::collections::HashSet;

use crate::models::{ChangeDraft, ChangeKey, PendingChange};
use crate::util::unix_timestamp_ms;

/// Outcome of recording a failed delivery attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureOutcome {
    /// Kept for a later drain pass; carries the new retry count
    Requeued(u32),
    /// Retry ceiling reached; the entry was dropped
    Abandoned,
}

/// FIFO queue of mutations awaiting durable confirmation.
#[derive(Debug, Default)]
pub struct PendingQueue {
    entries: Vec<PendingChange>,
    delivered: HashSet<ChangeKey>,
    abandoned: Vec<PendingChange>,
}

impl PendingQueue {
    /// Append a change, stamping its queue timestamp and zero retries.
    pub fn push(&mut self, draft: ChangeDraft) -> ChangeKey {
        let change = PendingChange {
            entity: draft.entity,
            action: draft.action,
            id: draft.id,
            data: draft.data,
            queued_at: unix_timestamp_ms(),
            retry_count: 0,
        };
        let key = change.key();
        self.entries.push(change);
        key
    }

    /// Number of queued entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the queue has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Copy of the entries in delivery order, for one drain pass.
    #[must_use]
    pub fn snapshot(&self) -> Vec<PendingChange> {
        self.entries.clone()
    }

    /// Mark a change as delivered; it is removed on the next [`Self::sweep`].
    pub fn record_success(&mut self, key: ChangeKey) {
        self.delivered.insert(key);
    }

    /// Record a failed delivery attempt.
    ///
    /// Bumps the retry count; once it reaches `retry_limit` the entry is
    /// dropped immediately and remembered on the abandoned list.
    pub fn record_failure(&mut self, key: ChangeKey, retry_limit: u32) -> FailureOutcome {
        let Some(index) = self.entries.iter().position(|entry| entry.key() == key) else {
            // Entry vanished mid-pass (reset or duplicate bookkeeping).
            return FailureOutcome::Abandoned;
        };

        self.entries[index].retry_count += 1;
        let retry_count = self.entries[index].retry_count;
        if retry_count < retry_limit {
            FailureOutcome::Requeued(retry_count)
        } else {
            let abandoned = self.entries.remove(index);
            tracing::warn!(
                entity = %abandoned.entity,
                id = %abandoned.id,
                attempts = abandoned.retry_count,
                "pending change abandoned after exhausting retries"
            );
            self.abandoned.push(abandoned);
            FailureOutcome::Abandoned
        }
    }

    /// Remove every entry marked delivered during the pass.
    ///
    /// Returns how many entries were removed.
    pub fn sweep(&mut self) -> usize {
        if self.delivered.is_empty() {
            return 0;
        }
        let before = self.entries.len();
        let delivered = std::mem::take(&mut self.delivered);
        self.entries.retain(|entry| !delivered.contains(&entry.key()));
        before - self.entries.len()
    }

    /// Drain the abandoned-change list, handing ownership to the caller.
    pub fn take_abandoned(&mut self) -> Vec<PendingChange> {
        std::mem::take(&mut self.abandoned)
    }

    /// Discard all state (sign-out teardown).
    pub fn clear(&mut self) {
        self.entries.clear();
        self.delivered.clear();
        self.abandoned.clear();
    }
}
