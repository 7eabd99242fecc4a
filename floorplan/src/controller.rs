//! Table interaction controller: the gesture state machine for one glyph.
//!
//! Each controller owns two geometries at different cadences:
//! - live: pixel geometry updated on every pointer move while a gesture runs;
//! - committed: the percent snapshot at the head of the undo history,
//!   updated once per gesture on release (and by undo/redo/rollback).
//!
//! Pixel geometry is always derived from the committed snapshot and the
//! current `PlanSize`, which callers pass in read-only; nothing here writes
//! back into the percent model on a resize.

#[cfg(test)]
#[path = "controller_test.rs"]
mod controller_test;

use tracing::{debug, warn};

use crate::config::EditorConfig;
use crate::consts::{MIN_SIZE_RATIO, ROTATION_SNAP_DEG};
use crate::doc::{Table, TableId, TableState, round_persisted};
use crate::hit::ResizeAnchor;
use crate::history::UndoHistory;
use crate::input::{Gesture, LiveGeometry, Modifiers};
use crate::reconciler::{Reconciler, SaveIndicator, SaveOutcome, SaveRequest};
use crate::store::StoreError;
use crate::transform::{PixelRect, PlanSize, Point};

/// Gesture and persistence state for one mounted table glyph.
#[derive(Debug, Clone)]
pub struct TableController {
    table: Table,
    history: UndoHistory,
    gesture: Gesture,
    live: Option<LiveGeometry>,
    reconciler: Reconciler,
}

impl TableController {
    /// Mount a glyph, seeding its history from the persisted geometry.
    #[must_use]
    pub fn new(table: Table, config: &EditorConfig) -> Self {
        let history = UndoHistory::new(table.state());
        let reconciler = Reconciler::new(table.id, config.stale_policy, config.saved_flash_ms);
        Self { table, history, gesture: Gesture::Idle, live: None, reconciler }
    }

    // --- Queries ---

    #[must_use]
    pub fn id(&self) -> TableId {
        self.table.id
    }

    /// The table record as last loaded.
    #[must_use]
    pub fn table(&self) -> &Table {
        &self.table
    }

    #[must_use]
    pub fn history(&self) -> &UndoHistory {
        &self.history
    }

    #[must_use]
    pub fn gesture(&self) -> &Gesture {
        &self.gesture
    }

    /// The committed snapshot (head of the undo history).
    #[must_use]
    pub fn committed(&self) -> TableState {
        self.history.present()
    }

    /// Uncommitted geometry of the running gesture, if any.
    #[must_use]
    pub fn live(&self) -> Option<LiveGeometry> {
        self.live
    }

    #[must_use]
    pub fn indicator(&self) -> SaveIndicator {
        self.reconciler.indicator()
    }

    /// Whether leaving now could lose work: undoable commits exist or a save
    /// has not round-tripped yet.
    #[must_use]
    pub fn has_unsaved_history(&self) -> bool {
        self.history.can_undo() || self.reconciler.in_flight() > 0
    }

    /// Geometry to draw: live while a gesture runs, else the projection of
    /// the committed snapshot.
    #[must_use]
    pub fn geometry(&self, plan: PlanSize) -> LiveGeometry {
        self.live.unwrap_or_else(|| self.committed_geometry(plan))
    }

    fn committed_geometry(&self, plan: PlanSize) -> LiveGeometry {
        let committed = self.committed();
        LiveGeometry { rect: committed.to_pixels(self.table.shape, plan), rotation: committed.rotation }
    }

    // --- Gestures ---

    /// Start dragging the body, grabbed at `pointer`.
    pub fn begin_drag(&mut self, pointer: Point, plan: PlanSize) {
        let start = self.committed_geometry(plan);
        let grab = Point::new(pointer.x - start.rect.x, pointer.y - start.rect.y);
        self.gesture = Gesture::Dragging { grab, start: start.rect };
        self.live = Some(start);
        debug!(table_id = self.id(), "drag started");
    }

    /// Start resizing from `anchor`, grabbed at `pointer`.
    pub fn begin_resize(&mut self, anchor: ResizeAnchor, pointer: Point, plan: PlanSize) {
        let start = self.committed_geometry(plan);
        self.gesture = Gesture::Resizing { anchor, start_pointer: pointer, start: start.rect };
        self.live = Some(start);
        debug!(table_id = self.id(), ?anchor, "resize started");
    }

    /// Start rotating, grabbed at `pointer`.
    pub fn begin_rotate(&mut self, pointer: Point, plan: PlanSize) {
        let start = self.committed_geometry(plan);
        let center = start.rect.center();
        self.gesture = Gesture::Rotating {
            center,
            start_angle: pointer_angle(center, pointer),
            orig_rotation: start.rotation,
        };
        self.live = Some(start);
        debug!(table_id = self.id(), "rotate started");
    }

    /// Update the live geometry. Returns true when a gesture is running.
    pub fn pointer_move(&mut self, pointer: Point, modifiers: Modifiers, plan: PlanSize) -> bool {
        let Some(live) = self.live else {
            return false;
        };
        let next = match self.gesture {
            Gesture::Idle => return false,
            Gesture::Dragging { grab, start } => LiveGeometry { rect: drag_rect(start, grab, pointer, plan), ..live },
            Gesture::Resizing { anchor, start_pointer, start } => {
                let delta = Point::new(pointer.x - start_pointer.x, pointer.y - start_pointer.y);
                let rect = resize_rect(start, anchor, delta, self.table.shape.keeps_ratio(), plan);
                LiveGeometry { rect, ..live }
            }
            Gesture::Rotating { center, start_angle, orig_rotation } => {
                let mut rotation = orig_rotation + pointer_angle(center, pointer) - start_angle;
                if modifiers.shift {
                    rotation = (rotation / ROTATION_SNAP_DEG).round() * ROTATION_SNAP_DEG;
                }
                LiveGeometry { rotation, ..live }
            }
        };
        self.live = Some(next);
        true
    }

    /// Finish the gesture at `pointer` and commit it.
    ///
    /// Returns the save the host must send, or `None` when nothing changed or
    /// the final angle could not be read.
    pub fn pointer_up(&mut self, pointer: Point, modifiers: Modifiers, plan: PlanSize) -> Option<SaveRequest> {
        if !self.gesture.is_active() {
            return None;
        }
        self.pointer_move(pointer, modifiers, plan);
        let gesture = std::mem::take(&mut self.gesture);
        let live = self.live.take()?;

        let Some(rotation) = normalize_degrees(live.rotation) else {
            warn!(table_id = self.id(), rotation = live.rotation, "unreadable rotation; commit skipped");
            return None;
        };

        let previous = self.committed();
        let next = match gesture {
            // Only the angle changes on rotate; the stored box is kept as is.
            Gesture::Rotating { .. } => {
                TableState { rotation: normalize_degrees(round_persisted(rotation)).unwrap_or(0.0), ..previous }
            }
            _ => TableState::from_pixels(live.rect, previous.rotation, self.table.shape, plan),
        };

        if !next.differs_from(&previous) {
            debug!(table_id = self.id(), gesture = gesture.label(), "gesture ended without change");
            return None;
        }

        self.history.push(next);
        debug!(table_id = self.id(), gesture = gesture.label(), "gesture committed");
        Some(self.reconciler.begin(next, Some(previous)))
    }

    /// Abandon the running gesture. Returns true if one was running.
    pub fn cancel(&mut self) -> bool {
        let was_active = self.gesture.is_active();
        self.gesture = Gesture::Idle;
        self.live = None;
        was_active
    }

    // --- History ---

    /// Step back and persist the restored snapshot.
    pub fn undo(&mut self) -> Option<SaveRequest> {
        if self.gesture.is_active() {
            return None;
        }
        let previous = self.committed();
        let next = self.history.undo()?;
        Some(self.reconciler.begin(next, Some(previous)))
    }

    /// Step forward and persist the restored snapshot.
    pub fn redo(&mut self) -> Option<SaveRequest> {
        if self.gesture.is_active() {
            return None;
        }
        let previous = self.committed();
        let next = self.history.redo()?;
        Some(self.reconciler.begin(next, Some(previous)))
    }

    // --- Persistence ---

    /// Report the store's response to save `seq`.
    pub fn complete_save(&mut self, seq: u64, result: Result<(), StoreError>, now_ms: i64) -> SaveOutcome {
        let outcome = self.reconciler.complete(seq, result, &mut self.history, now_ms);
        if outcome == SaveOutcome::Saved {
            let committed = self.committed();
            self.table.apply_state(&committed);
        }
        outcome
    }

    /// Advance timers. Returns true when the indicator changed.
    pub fn tick(&mut self, now_ms: i64) -> bool {
        self.reconciler.tick(now_ms)
    }

    /// Take a freshly loaded record for this table.
    ///
    /// Display fields and occupancy always follow the record. Geometry is
    /// re-seeded only when the glyph is idle with no save in flight, so a
    /// reload never yanks a table out from under the pointer.
    pub fn refresh(&mut self, table: Table) {
        let quiet = !self.gesture.is_active() && self.reconciler.in_flight() == 0;
        let persisted = table.state();
        if quiet && persisted.differs_from(&self.committed()) {
            debug!(table_id = self.id(), "geometry re-seeded from reload");
            self.history.set(persisted);
        }
        self.table = table;
    }
}

// =============================================================================
// GEOMETRY
// =============================================================================

/// Drag position for `pointer`, kept inside the plan.
#[must_use]
pub fn drag_rect(start: PixelRect, grab: Point, pointer: Point, plan: PlanSize) -> PixelRect {
    let max_x = (plan.width - start.width).max(0.0);
    let max_y = (plan.height - start.height).max(0.0);
    PixelRect {
        x: (pointer.x - grab.x).clamp(0.0, max_x),
        y: (pointer.y - grab.y).clamp(0.0, max_y),
        ..start
    }
}

/// Grow the span `lo..hi` to at least `min`, staying within `0..limit`.
fn widen_to_floor(lo: f64, hi: f64, min: f64, limit: f64) -> (f64, f64) {
    if hi - lo >= min {
        return (lo, hi);
    }
    let hi = (lo + min).min(limit.max(min));
    (hi - min, hi)
}

/// Resize `start` by dragging `anchor` by `delta`.
///
/// Moving edges stay inside the plan and no side ends up below
/// `MIN_SIZE_RATIO` of the plan's smaller dimension, including a side the
/// handle does not move. With `keep_ratio` the
/// result is square: edge handles follow the dragged axis, corner handles the
/// larger one, and the edges opposite the handle stay fixed.
#[must_use]
pub fn resize_rect(start: PixelRect, anchor: ResizeAnchor, delta: Point, keep_ratio: bool, plan: PlanSize) -> PixelRect {
    let min = MIN_SIZE_RATIO * plan.min_side();
    let mut left = start.x;
    let mut top = start.y;
    let mut right = start.right();
    let mut bottom = start.bottom();

    if anchor.moves_west() {
        left = (left + delta.x).max(0.0).min(right - min);
    }
    if anchor.moves_east() {
        right = (right + delta.x).min(plan.width).max(left + min);
    }
    if anchor.moves_north() {
        top = (top + delta.y).max(0.0).min(bottom - min);
    }
    if anchor.moves_south() {
        bottom = (bottom + delta.y).min(plan.height).max(top + min);
    }
    if !anchor.moves_west() && !anchor.moves_east() {
        (left, right) = widen_to_floor(left, right, min, plan.width);
    }
    if !anchor.moves_north() && !anchor.moves_south() {
        (top, bottom) = widen_to_floor(top, bottom, min, plan.height);
    }

    if !keep_ratio {
        return PixelRect::from_edges(left, top, right, bottom);
    }

    let width = right - left;
    let height = bottom - top;
    let side = if anchor.is_corner() {
        width.max(height)
    } else if anchor.moves_west() || anchor.moves_east() {
        width
    } else {
        height
    };
    let room_x = if anchor.moves_west() { right } else { plan.width - left };
    let room_y = if anchor.moves_north() { bottom } else { plan.height - top };
    let side = side.min(room_x).min(room_y).max(min);

    if anchor.moves_west() {
        left = right - side;
    } else {
        right = left + side;
    }
    if anchor.moves_north() {
        top = bottom - side;
    } else {
        bottom = top + side;
    }
    PixelRect::from_edges(left, top, right, bottom)
}

/// Angle of `pointer` around `center` in degrees, 0 pointing straight up,
/// growing clockwise.
#[must_use]
pub fn pointer_angle(center: Point, pointer: Point) -> f64 {
    (pointer.y - center.y).atan2(pointer.x - center.x).to_degrees() + 90.0
}

/// Wrap an angle into `[0, 360)`. `None` for non-finite input.
#[must_use]
pub fn normalize_degrees(degrees: f64) -> Option<f64> {
    if !degrees.is_finite() {
        return None;
    }
    let wrapped = degrees.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs.
    Some(if wrapped >= 360.0 { 0.0 } else { wrapped })
}
