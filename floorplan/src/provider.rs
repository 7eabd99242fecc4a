//! Plan provider: the editor's top-level engine.
//!
//! Owns the plan-size observer, one [`TableController`] per table record,
//! single selection, and the editable gate. Every input handler returns a
//! list of [`Action`]s; the host performs the side effects (network, redraw,
//! selection callbacks) and reports save results back through
//! [`PlanProvider::complete_save`].
//!
//! Until the observer has latched a non-zero plan size the provider is not
//! ready: pointer input is ignored and the scene is empty.

#[cfg(test)]
#[path = "provider_test.rs"]
mod provider_test;

use tracing::debug;

use crate::config::EditorConfig;
use crate::controller::TableController;
use crate::doc::{Table, TableId};
use crate::hit::{GlyphBounds, HitPart, hit_test};
use crate::input::{Button, Key, KeyCommand, Modifiers};
use crate::observer::PlanSizeObserver;
use crate::reconciler::{SaveIndicator, SaveOutcome, SaveRequest};
use crate::store::StoreError;
use crate::transform::{PlanSize, Point};

/// Side effects returned from input handlers for the host to process.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Send this update to the store, then call `complete_save`.
    SaveRequested(SaveRequest),
    /// The selection changed.
    Selected(Option<TableId>),
    /// Refetch every table and call `load_tables`.
    ReloadRequested,
    /// A new plan size was latched.
    PlanResized(PlanSize),
    /// A glyph's save indicator changed.
    SaveIndicatorChanged { id: TableId, indicator: SaveIndicator },
    RenderNeeded,
}

/// Editor state for one plan.
#[derive(Debug, Clone)]
pub struct PlanProvider {
    config: EditorConfig,
    observer: PlanSizeObserver,
    controllers: Vec<TableController>,
    selected: Option<TableId>,
    editable: bool,
    /// Table whose gesture is running, if any.
    active: Option<TableId>,
}

impl Default for PlanProvider {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

impl PlanProvider {
    #[must_use]
    pub fn new(config: EditorConfig) -> Self {
        Self {
            config,
            observer: PlanSizeObserver::new(&config),
            controllers: Vec::new(),
            selected: None,
            editable: true,
            active: None,
        }
    }

    // --- Plan measurement ---

    /// Report the container's size at mount.
    pub fn mount(&mut self, measured: PlanSize, now_ms: i64) {
        self.observer.mount(measured, now_ms);
    }

    /// Report a container (or plan image) resize.
    pub fn on_container_resize(&mut self, measured: PlanSize, now_ms: i64) {
        self.observer.on_resize(measured, now_ms);
    }

    /// When the host should next call [`Self::tick`] for a pending plan size.
    #[must_use]
    pub fn next_deadline(&self) -> Option<i64> {
        self.observer.next_deadline()
    }

    /// Advance timers: latch a debounced plan size and expire "saved" flashes.
    pub fn tick(&mut self, now_ms: i64) -> Vec<Action> {
        let mut actions = Vec::new();

        if let Some(size) = self.observer.tick(now_ms) {
            // Live pixels were computed against the old size.
            self.cancel_active();
            actions.push(Action::PlanResized(size));
        }

        for controller in &mut self.controllers {
            if controller.tick(now_ms) {
                actions.push(Action::SaveIndicatorChanged { id: controller.id(), indicator: controller.indicator() });
            }
        }

        if !actions.is_empty() {
            actions.push(Action::RenderNeeded);
        }
        actions
    }

    /// The latched plan size, once measured.
    #[must_use]
    pub fn plan_size(&self) -> Option<PlanSize> {
        self.observer.size()
    }

    /// Whether a non-zero plan size has been latched.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.plan_size().is_some()
    }

    // --- Data ---

    /// Reconcile controllers with a freshly loaded set of table records.
    ///
    /// Existing controllers are kept and refreshed, removed tables are
    /// dropped (late save responses for them are ignored), and new tables get
    /// a fresh controller. Draw order follows `tables`.
    pub fn load_tables(&mut self, tables: Vec<Table>) -> Vec<Action> {
        let mut previous = std::mem::take(&mut self.controllers);
        let mut next = Vec::with_capacity(tables.len());

        for table in tables {
            match previous.iter().position(|c| c.id() == table.id) {
                Some(index) => {
                    let mut controller = previous.swap_remove(index);
                    controller.refresh(table);
                    next.push(controller);
                }
                None => next.push(TableController::new(table, &self.config)),
            }
        }
        for dropped in &previous {
            debug!(table_id = dropped.id(), in_flight = dropped.has_unsaved_history(), "table removed");
        }
        self.controllers = next;

        let mut actions = Vec::new();
        if self.active.is_some_and(|id| self.controller(id).is_none()) {
            self.active = None;
        }
        if self.selected.is_some_and(|id| self.controller(id).is_none()) {
            self.selected = None;
            actions.push(Action::Selected(None));
        }
        actions.push(Action::RenderNeeded);
        actions
    }

    /// Ask the host to refetch every table.
    #[must_use]
    pub fn request_reload(&self) -> Vec<Action> {
        vec![Action::ReloadRequested]
    }

    // --- Selection / editable gate ---

    /// Toggle whether the selected table shows live manipulation handles.
    pub fn set_editable(&mut self, editable: bool) -> Vec<Action> {
        if self.editable == editable {
            return Vec::new();
        }
        self.editable = editable;
        if !editable {
            self.cancel_active();
        }
        vec![Action::RenderNeeded]
    }

    /// Select a table (or clear the selection with `None`).
    ///
    /// Unknown ids are ignored. Selecting another table abandons any gesture
    /// running on the previous one.
    pub fn select(&mut self, id: Option<TableId>) -> Vec<Action> {
        if id.is_some_and(|id| self.controller(id).is_none()) || id == self.selected {
            return Vec::new();
        }
        self.cancel_active();
        self.selected = id;
        debug!(table_id = ?id, "selection changed");
        vec![Action::Selected(id), Action::RenderNeeded]
    }

    // --- Pointer input ---

    /// Pointer pressed at `pt` in container pixels.
    pub fn on_pointer_down(&mut self, pt: Point, button: Button, _modifiers: Modifiers) -> Vec<Action> {
        let Some(plan) = self.plan_size() else {
            return Vec::new();
        };
        if button != Button::Primary {
            return Vec::new();
        }
        self.cancel_active();

        let handles_for = self.selected.filter(|_| self.editable);
        let Some(hit) = hit_test(pt, &self.glyph_bounds(), handles_for) else {
            return self.select(None);
        };

        if Some(hit.table_id) != self.selected {
            return self.select(Some(hit.table_id));
        }
        if !self.editable {
            return Vec::new();
        }

        let Some(controller) = self.controller_mut(hit.table_id) else {
            return Vec::new();
        };
        match hit.part {
            HitPart::Body => controller.begin_drag(pt, plan),
            HitPart::ResizeHandle(anchor) => controller.begin_resize(anchor, pt, plan),
            HitPart::RotateHandle => controller.begin_rotate(pt, plan),
        }
        self.active = Some(hit.table_id);
        vec![Action::RenderNeeded]
    }

    /// Pointer moved to `pt`.
    pub fn on_pointer_move(&mut self, pt: Point, modifiers: Modifiers) -> Vec<Action> {
        let (Some(plan), Some(id)) = (self.plan_size(), self.active) else {
            return Vec::new();
        };
        match self.controller_mut(id).map(|c| c.pointer_move(pt, modifiers, plan)) {
            Some(true) => vec![Action::RenderNeeded],
            _ => Vec::new(),
        }
    }

    /// Pointer released at `pt`. Commits the running gesture.
    pub fn on_pointer_up(&mut self, pt: Point, modifiers: Modifiers) -> Vec<Action> {
        let (Some(plan), Some(id)) = (self.plan_size(), self.active.take()) else {
            return Vec::new();
        };
        let Some(controller) = self.controller_mut(id) else {
            return Vec::new();
        };
        let mut actions = Vec::new();
        if let Some(request) = controller.pointer_up(pt, modifiers, plan) {
            actions.extend(save_actions(request));
        }
        actions.push(Action::RenderNeeded);
        actions
    }

    // --- Keyboard ---

    /// Key pressed.
    pub fn on_key_down(&mut self, key: &Key, modifiers: Modifiers) -> Vec<Action> {
        match KeyCommand::from_key(key, modifiers) {
            Some(KeyCommand::Cancel) => {
                if self.cancel_active() {
                    vec![Action::RenderNeeded]
                } else {
                    self.select(None)
                }
            }
            Some(KeyCommand::Undo) => self.undo(),
            Some(KeyCommand::Redo) => self.redo(),
            None => Vec::new(),
        }
    }

    // --- History ---

    /// Undo the selected table's last commit and persist the restored state.
    pub fn undo(&mut self) -> Vec<Action> {
        self.step_history(TableController::undo)
    }

    /// Redo the selected table's last undone commit and persist it.
    pub fn redo(&mut self) -> Vec<Action> {
        self.step_history(TableController::redo)
    }

    fn step_history(&mut self, step: fn(&mut TableController) -> Option<SaveRequest>) -> Vec<Action> {
        if !self.editable {
            return Vec::new();
        }
        let Some(id) = self.selected else {
            return Vec::new();
        };
        let Some(request) = self.controller_mut(id).and_then(step) else {
            return Vec::new();
        };
        let mut actions = save_actions(request);
        actions.push(Action::RenderNeeded);
        actions
    }

    // --- Persistence ---

    /// Report the store's response to a `SaveRequested` action.
    ///
    /// Responses for tables that were removed since are ignored.
    pub fn complete_save(
        &mut self,
        table_id: TableId,
        seq: u64,
        result: Result<(), StoreError>,
        now_ms: i64,
    ) -> Vec<Action> {
        let Some(controller) = self.controller_mut(table_id) else {
            debug!(table_id, seq, "save response for removed table ignored");
            return Vec::new();
        };
        let before = controller.indicator();
        let outcome = controller.complete_save(seq, result, now_ms);
        let indicator = controller.indicator();
        debug!(table_id, seq, ?outcome, "save completed");

        let mut actions = Vec::new();
        if indicator != before {
            actions.push(Action::SaveIndicatorChanged { id: table_id, indicator });
        }
        if !actions.is_empty() || matches!(outcome, SaveOutcome::RolledBack(_)) {
            actions.push(Action::RenderNeeded);
        }
        actions
    }

    /// Whether navigating away should be confirmed: some table has undoable
    /// commits or a save still in flight.
    #[must_use]
    pub fn should_confirm_leave(&self) -> bool {
        self.controllers.iter().any(TableController::has_unsaved_history)
    }

    // --- Queries ---

    #[must_use]
    pub fn controller(&self, id: TableId) -> Option<&TableController> {
        self.controllers.iter().find(|c| c.id() == id)
    }

    /// Controllers in draw order.
    #[must_use]
    pub fn controllers(&self) -> &[TableController] {
        &self.controllers
    }

    #[must_use]
    pub fn selection(&self) -> Option<TableId> {
        self.selected
    }

    #[must_use]
    pub fn is_editable(&self) -> bool {
        self.editable
    }

    /// Pixel bounds of every glyph in draw order. Empty until ready.
    #[must_use]
    pub fn glyph_bounds(&self) -> Vec<GlyphBounds> {
        let Some(plan) = self.plan_size() else {
            return Vec::new();
        };
        self.controllers
            .iter()
            .map(|c| GlyphBounds { table_id: c.id(), rect: c.geometry(plan).rect, shape: c.table().shape })
            .collect()
    }

    fn controller_mut(&mut self, id: TableId) -> Option<&mut TableController> {
        self.controllers.iter_mut().find(|c| c.id() == id)
    }

    /// Abandon the running gesture, if any. Returns true if one was running.
    fn cancel_active(&mut self) -> bool {
        let Some(id) = self.active.take() else {
            return false;
        };
        self.controller_mut(id).is_some_and(TableController::cancel)
    }
}

fn save_actions(request: SaveRequest) -> Vec<Action> {
    let id = request.table_id;
    vec![Action::SaveRequested(request), Action::SaveIndicatorChanged { id, indicator: SaveIndicator::Saving }]
}
