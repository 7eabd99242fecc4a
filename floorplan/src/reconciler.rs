//! Persistence reconciler: optimistic saves with rollback.
//!
//! DESIGN
//! ======
//! A commit is a two-step command. The controller first applies the local
//! history transition, then asks the reconciler to `begin` a save, which
//! flips the indicator to `saving` and returns a `SaveRequest` for the host to
//! send. The host reports the response with `complete`:
//! - success: indicator `saved` (cleared by `tick` after the flash timeout)
//!   and the undo history is cleared, since the saved state is now canonical;
//! - failure: the history is hard-reset to the snapshot captured before the
//!   commit and the indicator drops straight back to `idle`.
//!
//! CONCURRENCY
//! ===========
//! Saves are never queued: a glyph can be dragged again while its previous
//! save is in flight, so several requests per table may be outstanding and
//! their responses can arrive in any order. Every request carries a per-table
//! monotonic `seq`. Under `StalePolicy::Apply` every response is applied as it
//! arrives (the last response wins, and an old failure can roll back over a
//! newer success). `StalePolicy::DiscardStale` drops responses older than the
//! newest request issued.

#[cfg(test)]
#[path = "reconciler_test.rs"]
mod reconciler_test;

use std::collections::BTreeMap;

use tracing::{debug, warn};

use crate::doc::{TableId, TableState, TableUpdate};
use crate::history::UndoHistory;
use crate::store::{StoreError, TableStore};

/// Tri-state save indicator shown on a glyph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SaveIndicator {
    #[default]
    Idle,
    Saving,
    Saved,
}

/// Handling of responses that are older than the newest request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StalePolicy {
    /// Apply every response in arrival order.
    #[default]
    Apply,
    /// Ignore responses whose `seq` is older than the newest issued request.
    DiscardStale,
}

/// A geometry commit the host must send to the store.
#[derive(Debug, Clone, PartialEq)]
pub struct SaveRequest {
    pub table_id: TableId,
    /// Per-table monotonic request number, starting at 1.
    pub seq: u64,
    /// The snapshot being persisted.
    pub next: TableState,
    /// The last known-good snapshot to restore on failure.
    pub previous: Option<TableState>,
    /// Wire body built from `next`.
    pub update: TableUpdate,
}

impl SaveRequest {
    /// Send this request to `store`.
    ///
    /// # Errors
    ///
    /// Returns the store's error unchanged; callers report it back through
    /// `complete` rather than propagating it.
    pub async fn send(&self, store: &dyn TableStore) -> Result<(), StoreError> {
        debug!(table_id = self.table_id, seq = self.seq, "sending table update");
        store.update_table(self.table_id, &self.update).await
    }
}

/// What `complete` did with a response.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SaveOutcome {
    /// Saved; history cleared.
    Saved,
    /// Failed; history reset to the carried snapshot.
    RolledBack(TableState),
    /// Failed with no snapshot to restore.
    Failed,
    /// Ignored as stale under `StalePolicy::DiscardStale`.
    Discarded,
    /// No such request in flight (already completed or never issued).
    Unknown,
}

/// Save bookkeeping for one table.
#[derive(Debug, Clone)]
pub struct Reconciler {
    table_id: TableId,
    policy: StalePolicy,
    saved_flash_ms: i64,
    indicator: SaveIndicator,
    saved_at_ms: Option<i64>,
    last_seq: u64,
    in_flight: BTreeMap<u64, Option<TableState>>,
}

impl Reconciler {
    #[must_use]
    pub fn new(table_id: TableId, policy: StalePolicy, saved_flash_ms: i64) -> Self {
        Self {
            table_id,
            policy,
            saved_flash_ms,
            indicator: SaveIndicator::Idle,
            saved_at_ms: None,
            last_seq: 0,
            in_flight: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn indicator(&self) -> SaveIndicator {
        self.indicator
    }

    /// Number of requests issued but not yet completed.
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    /// Start a save of `next`. Sets the indicator to `saving`.
    pub fn begin(&mut self, next: TableState, previous: Option<TableState>) -> SaveRequest {
        self.last_seq += 1;
        let seq = self.last_seq;
        self.in_flight.insert(seq, previous);
        self.indicator = SaveIndicator::Saving;
        self.saved_at_ms = None;
        debug!(table_id = self.table_id, seq, "save started");
        SaveRequest { table_id: self.table_id, seq, next, previous, update: TableUpdate::from_state(&next) }
    }

    /// Apply the store's response to request `seq`.
    ///
    /// Never fails: errors are absorbed into a rollback and an indicator reset.
    pub fn complete(
        &mut self,
        seq: u64,
        result: Result<(), StoreError>,
        history: &mut UndoHistory,
        now_ms: i64,
    ) -> SaveOutcome {
        let Some(previous) = self.in_flight.remove(&seq) else {
            debug!(table_id = self.table_id, seq, "response for unknown request ignored");
            return SaveOutcome::Unknown;
        };

        if self.policy == StalePolicy::DiscardStale && seq < self.last_seq {
            debug!(table_id = self.table_id, seq, latest = self.last_seq, "stale response discarded");
            return SaveOutcome::Discarded;
        }

        match result {
            Ok(()) => {
                self.indicator = SaveIndicator::Saved;
                self.saved_at_ms = Some(now_ms);
                history.clear();
                debug!(table_id = self.table_id, seq, "save confirmed");
                SaveOutcome::Saved
            }
            Err(e) => {
                self.indicator = SaveIndicator::Idle;
                self.saved_at_ms = None;
                warn!(table_id = self.table_id, seq, error = %e, "save failed; rolling back");
                match previous {
                    Some(snapshot) => {
                        history.set(snapshot);
                        SaveOutcome::RolledBack(snapshot)
                    }
                    None => SaveOutcome::Failed,
                }
            }
        }
    }

    /// Clear the `saved` flash once its timeout elapsed. Returns true when
    /// the indicator changed.
    pub fn tick(&mut self, now_ms: i64) -> bool {
        let Some(saved_at) = self.saved_at_ms else {
            return false;
        };
        if self.indicator != SaveIndicator::Saved || now_ms - saved_at < self.saved_flash_ms {
            return false;
        }
        self.indicator = SaveIndicator::Idle;
        self.saved_at_ms = None;
        true
    }
}
