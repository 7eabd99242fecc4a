#![allow(clippy::float_cmp)]

use std::sync::Mutex;

use super::*;
use crate::doc::Table;

fn state(x: f64) -> TableState {
    TableState { pos_x: x, pos_y: 10.0, width: 5.0, height: 5.0, rotation: 0.0 }
}

fn reconciler(policy: StalePolicy) -> Reconciler {
    Reconciler::new(1, policy, 1200)
}

fn network_error() -> Result<(), StoreError> {
    Err(StoreError::Request("connection reset".into()))
}

// =========================================================================
// MockStore
// =========================================================================

struct MockStore {
    updates: Mutex<Vec<(TableId, TableUpdate)>>,
    fail: bool,
}

#[async_trait::async_trait]
impl TableStore for MockStore {
    async fn load_tables(&self) -> Result<Vec<Table>, StoreError> {
        Ok(Vec::new())
    }

    async fn update_table(&self, id: TableId, update: &TableUpdate) -> Result<(), StoreError> {
        self.updates.lock().unwrap().push((id, update.clone()));
        if self.fail { Err(StoreError::Status { status: 500, body: "boom".into() }) } else { Ok(()) }
    }
}

// =========================================================================
// begin
// =========================================================================

#[test]
fn begin_sets_saving_and_numbers_requests() {
    let mut r = reconciler(StalePolicy::Apply);
    let first = r.begin(state(1.0), Some(state(0.0)));
    let second = r.begin(state(2.0), Some(state(1.0)));
    assert_eq!(first.seq, 1);
    assert_eq!(second.seq, 2);
    assert_eq!(r.indicator(), SaveIndicator::Saving);
    assert_eq!(r.in_flight(), 2);
}

#[test]
fn begin_builds_two_place_update() {
    let mut r = reconciler(StalePolicy::Apply);
    let request = r.begin(state(20.0), None);
    assert_eq!(request.table_id, 1);
    assert_eq!(request.update.pos_x.as_deref(), Some("20.00"));
    assert_eq!(request.update.pos_y.as_deref(), Some("10.00"));
    assert_eq!(request.update.rotation.as_deref(), Some("0.00"));
}

// =========================================================================
// complete: success
// =========================================================================

#[test]
fn success_flashes_saved_and_clears_history() {
    let mut r = reconciler(StalePolicy::Apply);
    let mut history = UndoHistory::new(state(0.0));
    history.push(state(1.0));
    let request = r.begin(state(1.0), Some(state(0.0)));

    let outcome = r.complete(request.seq, Ok(()), &mut history, 5000);
    assert_eq!(outcome, SaveOutcome::Saved);
    assert_eq!(r.indicator(), SaveIndicator::Saved);
    assert_eq!(history.present(), state(1.0));
    assert!(history.past().is_empty());
    assert_eq!(history.undo(), None);
}

#[test]
fn saved_indicator_clears_after_flash() {
    let mut r = reconciler(StalePolicy::Apply);
    let mut history = UndoHistory::new(state(0.0));
    let request = r.begin(state(1.0), None);
    r.complete(request.seq, Ok(()), &mut history, 1000);

    assert!(!r.tick(2199));
    assert_eq!(r.indicator(), SaveIndicator::Saved);
    assert!(r.tick(2200));
    assert_eq!(r.indicator(), SaveIndicator::Idle);
    assert!(!r.tick(9999));
}

#[test]
fn new_save_cancels_pending_flash() {
    let mut r = reconciler(StalePolicy::Apply);
    let mut history = UndoHistory::new(state(0.0));
    let first = r.begin(state(1.0), None);
    r.complete(first.seq, Ok(()), &mut history, 1000);
    r.begin(state(2.0), None);
    assert!(!r.tick(5000));
    assert_eq!(r.indicator(), SaveIndicator::Saving);
}

// =========================================================================
// complete: failure
// =========================================================================

#[test]
fn failure_rolls_back_and_goes_idle_without_flash() {
    let mut r = reconciler(StalePolicy::Apply);
    let mut history = UndoHistory::new(state(0.0));
    history.push(state(1.0));
    let request = r.begin(state(1.0), Some(state(0.0)));

    let outcome = r.complete(request.seq, network_error(), &mut history, 100);
    assert_eq!(outcome, SaveOutcome::RolledBack(state(0.0)));
    assert_eq!(r.indicator(), SaveIndicator::Idle);
    assert_eq!(history.present(), state(0.0));
    assert!(!history.can_undo());
    assert!(!r.tick(10_000));
}

#[test]
fn failure_without_previous_keeps_history() {
    let mut r = reconciler(StalePolicy::Apply);
    let mut history = UndoHistory::new(state(0.0));
    history.push(state(1.0));
    let request = r.begin(state(1.0), None);

    assert_eq!(r.complete(request.seq, network_error(), &mut history, 0), SaveOutcome::Failed);
    assert_eq!(history.present(), state(1.0));
    assert_eq!(r.indicator(), SaveIndicator::Idle);
}

#[test]
fn unknown_seq_is_ignored() {
    let mut r = reconciler(StalePolicy::Apply);
    let mut history = UndoHistory::new(state(0.0));
    assert_eq!(r.complete(42, Ok(()), &mut history, 0), SaveOutcome::Unknown);
    assert_eq!(r.indicator(), SaveIndicator::Idle);
}

#[test]
fn duplicate_response_is_ignored() {
    let mut r = reconciler(StalePolicy::Apply);
    let mut history = UndoHistory::new(state(0.0));
    let request = r.begin(state(1.0), Some(state(0.0)));
    r.complete(request.seq, Ok(()), &mut history, 0);
    assert_eq!(r.complete(request.seq, network_error(), &mut history, 0), SaveOutcome::Unknown);
    assert_eq!(history.present(), state(0.0));
}

// =========================================================================
// Out-of-order responses
// =========================================================================

#[test]
fn apply_policy_lets_old_failure_roll_back_over_newer_success() {
    let mut r = reconciler(StalePolicy::Apply);
    let mut history = UndoHistory::new(state(0.0));

    history.push(state(1.0));
    let first = r.begin(state(1.0), Some(state(0.0)));
    history.push(state(2.0));
    let second = r.begin(state(2.0), Some(state(1.0)));

    // The newer request lands first and succeeds...
    assert_eq!(r.complete(second.seq, Ok(()), &mut history, 10), SaveOutcome::Saved);
    assert_eq!(history.present(), state(2.0));
    // ...then the older one fails and drags the glyph back to its own baseline.
    assert_eq!(r.complete(first.seq, network_error(), &mut history, 20), SaveOutcome::RolledBack(state(0.0)));
    assert_eq!(history.present(), state(0.0));
    assert_eq!(r.indicator(), SaveIndicator::Idle);
}

#[test]
fn apply_policy_last_response_owns_the_flash() {
    let mut r = reconciler(StalePolicy::Apply);
    let mut history = UndoHistory::new(state(0.0));
    let first = r.begin(state(1.0), Some(state(0.0)));
    let second = r.begin(state(2.0), Some(state(1.0)));

    r.complete(second.seq, network_error(), &mut history, 10);
    assert_eq!(r.indicator(), SaveIndicator::Idle);
    r.complete(first.seq, Ok(()), &mut history, 20);
    assert_eq!(r.indicator(), SaveIndicator::Saved);
}

#[test]
fn discard_policy_ignores_older_response() {
    let mut r = reconciler(StalePolicy::DiscardStale);
    let mut history = UndoHistory::new(state(0.0));

    history.push(state(1.0));
    let first = r.begin(state(1.0), Some(state(0.0)));
    history.push(state(2.0));
    let second = r.begin(state(2.0), Some(state(1.0)));

    assert_eq!(r.complete(second.seq, Ok(()), &mut history, 10), SaveOutcome::Saved);
    assert_eq!(r.complete(first.seq, network_error(), &mut history, 20), SaveOutcome::Discarded);
    assert_eq!(history.present(), state(2.0));
    assert_eq!(r.indicator(), SaveIndicator::Saved);
    assert_eq!(r.in_flight(), 0);
}

#[test]
fn discard_policy_applies_newest_response() {
    let mut r = reconciler(StalePolicy::DiscardStale);
    let mut history = UndoHistory::new(state(0.0));
    history.push(state(1.0));
    let only = r.begin(state(1.0), Some(state(0.0)));
    assert_eq!(r.complete(only.seq, network_error(), &mut history, 0), SaveOutcome::RolledBack(state(0.0)));
}

// =========================================================================
// send
// =========================================================================

#[tokio::test]
async fn send_forwards_update_to_store() {
    let store = MockStore { updates: Mutex::new(Vec::new()), fail: false };
    let mut r = reconciler(StalePolicy::Apply);
    let request = r.begin(state(20.0), None);

    request.send(&store).await.unwrap();
    let updates = store.updates.lock().unwrap();
    assert_eq!(updates.len(), 1);
    assert_eq!(updates[0].0, 1);
    assert_eq!(updates[0].1.pos_x.as_deref(), Some("20.00"));
}

#[tokio::test]
async fn send_surfaces_store_error() {
    let store = MockStore { updates: Mutex::new(Vec::new()), fail: true };
    let mut r = reconciler(StalePolicy::Apply);
    let request = r.begin(state(20.0), None);

    let err = request.send(&store).await.unwrap_err();
    assert_eq!(err, StoreError::Status { status: 500, body: "boom".into() });
}
