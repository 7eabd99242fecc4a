//! Edit session. Drives a [`PlanProvider`] against a [`TableStore`].
//!
//! DESIGN
//! ======
//! The session is the host half of the engine contract: it feeds synthetic
//! pointer gestures into the provider, carries out every returned
//! [`Action`] (sending saves, refetching on reload), and reports each save's
//! outcome back with `complete_save`. Time is a logical millisecond clock
//! owned by the session, so replays are deterministic.
//!
//! ERROR HANDLING
//! ==============
//! Loading tables is the only fatal store call. Save failures are handed to
//! the provider, which rolls the table back, and are surfaced in the
//! returned [`GestureReport`] for the caller to print.

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

use std::collections::VecDeque;
use std::sync::Arc;

use floorplan::config::EditorConfig;
use floorplan::doc::{TableId, TableState};
use floorplan::hit::{ResizeAnchor, rotate_handle_position};
use floorplan::input::{Button, LiveGeometry, Modifiers};
use floorplan::provider::{Action, PlanProvider};
use floorplan::reconciler::SaveIndicator;
use floorplan::store::{StoreError, TableStore};
use floorplan::transform::{PlanSize, Point};
use tracing::{debug, info, warn};

/// Errors that stop a session command.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("table {0} is not on the plan")]
    UnknownTable(TableId),

    #[error("plan size {width}x{height} is not usable")]
    NotReady { width: f64, height: f64 },

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Result of one save dispatched during a command.
#[derive(Debug, Clone, PartialEq)]
pub struct SaveReport {
    pub table_id: TableId,
    pub seq: u64,
    pub error: Option<StoreError>,
}

/// What a gesture command did.
#[derive(Debug, Clone, PartialEq)]
pub struct GestureReport {
    pub table_id: TableId,
    pub saves: Vec<SaveReport>,
    /// Committed geometry after every save was reconciled.
    pub committed: TableState,
    pub indicator: SaveIndicator,
}

impl GestureReport {
    /// Whether the gesture produced a save and every save succeeded.
    #[must_use]
    pub fn persisted(&self) -> bool {
        !self.saves.is_empty() && self.saves.iter().all(|s| s.error.is_none())
    }
}

pub struct EditSession {
    store: Arc<dyn TableStore>,
    provider: PlanProvider,
    clock_ms: i64,
}

impl EditSession {
    /// Load the plan's tables and measure the plan at `plan`.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::NotReady`] for a zero-sized plan and
    /// [`SessionError::Store`] if the tables cannot be loaded.
    pub async fn open(store: Arc<dyn TableStore>, config: EditorConfig, plan: PlanSize) -> Result<Self, SessionError> {
        if !plan.is_measured() {
            return Err(SessionError::NotReady { width: plan.width, height: plan.height });
        }
        let tables = store.load_tables().await?;
        info!(count = tables.len(), "tables loaded");

        let mut provider = PlanProvider::new(config);
        let mut actions = provider.load_tables(tables);
        provider.mount(plan, 0);
        actions.extend(provider.tick(config.settle_delay_ms));

        let mut session = Self { store, provider, clock_ms: config.settle_delay_ms };
        session.dispatch(actions).await?;
        Ok(session)
    }

    #[must_use]
    pub fn provider(&self) -> &PlanProvider {
        &self.provider
    }

    /// Refetch every table.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Store`] if the tables cannot be loaded.
    pub async fn reload(&mut self) -> Result<(), SessionError> {
        let actions = self.provider.request_reload();
        self.dispatch(actions).await?;
        Ok(())
    }

    /// Drag a table so its top-left corner lands on `to` (container pixels).
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::UnknownTable`] if `id` is not on the plan.
    pub async fn drag(&mut self, id: TableId, to: Point) -> Result<GestureReport, SessionError> {
        let geometry = self.select(id).await?;
        let grab = geometry.rect.center();
        let release = Point::new(to.x + (grab.x - geometry.rect.x), to.y + (grab.y - geometry.rect.y));
        self.gesture(id, grab, release, Modifiers::default()).await
    }

    /// Drag one resize handle by `delta` pixels.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::UnknownTable`] if `id` is not on the plan.
    pub async fn resize(&mut self, id: TableId, anchor: ResizeAnchor, delta: Point) -> Result<GestureReport, SessionError> {
        let geometry = self.select(id).await?;
        let grab = anchor.position(&geometry.rect);
        let release = Point::new(grab.x + delta.x, grab.y + delta.y);
        self.gesture(id, grab, release, Modifiers::default()).await
    }

    /// Turn a table by `degrees` clockwise using its rotate handle.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::UnknownTable`] if `id` is not on the plan.
    pub async fn rotate(&mut self, id: TableId, degrees: f64) -> Result<GestureReport, SessionError> {
        let geometry = self.select(id).await?;
        let center = geometry.rect.center();
        let grab = rotate_handle_position(&geometry.rect);
        let radius = center.y - grab.y;
        let turn = degrees.to_radians();
        let release = Point::new(center.x + radius * turn.sin(), center.y - radius * turn.cos());
        self.gesture(id, grab, release, Modifiers::default()).await
    }

    /// Select `id` and return its current pixel geometry.
    async fn select(&mut self, id: TableId) -> Result<LiveGeometry, SessionError> {
        let plan = self.plan()?;
        if self.provider.controller(id).is_none() {
            return Err(SessionError::UnknownTable(id));
        }
        let actions = self.provider.select(Some(id));
        self.dispatch(actions).await?;
        self.provider
            .controller(id)
            .map(|c| c.geometry(plan))
            .ok_or(SessionError::UnknownTable(id))
    }

    async fn gesture(
        &mut self,
        id: TableId,
        grab: Point,
        release: Point,
        modifiers: Modifiers,
    ) -> Result<GestureReport, SessionError> {
        let mut actions = self.provider.on_pointer_down(grab, Button::Primary, modifiers);
        actions.extend(self.provider.on_pointer_move(release, modifiers));
        actions.extend(self.provider.on_pointer_up(release, modifiers));
        let saves = self.dispatch(actions).await?;
        self.report(id, saves)
    }

    fn report(&self, id: TableId, saves: Vec<SaveReport>) -> Result<GestureReport, SessionError> {
        let controller = self.provider.controller(id).ok_or(SessionError::UnknownTable(id))?;
        Ok(GestureReport { table_id: id, saves, committed: controller.committed(), indicator: controller.indicator() })
    }

    fn plan(&self) -> Result<PlanSize, SessionError> {
        self.provider.plan_size().ok_or(SessionError::NotReady { width: 0.0, height: 0.0 })
    }

    /// Carry out `actions` and everything they trigger.
    async fn dispatch(&mut self, actions: Vec<Action>) -> Result<Vec<SaveReport>, SessionError> {
        let mut queue: VecDeque<Action> = actions.into();
        let mut saves = Vec::new();

        while let Some(action) = queue.pop_front() {
            match action {
                Action::SaveRequested(request) => {
                    let result = request.send(self.store.as_ref()).await;
                    if let Err(e) = &result {
                        warn!(table_id = request.table_id, seq = request.seq, error = %e, "table update rejected");
                    }
                    saves.push(SaveReport { table_id: request.table_id, seq: request.seq, error: result.clone().err() });
                    queue.extend(self.provider.complete_save(request.table_id, request.seq, result, self.clock_ms));
                }
                Action::ReloadRequested => {
                    let tables = self.store.load_tables().await?;
                    debug!(count = tables.len(), "tables reloaded");
                    queue.extend(self.provider.load_tables(tables));
                }
                Action::Selected(id) => debug!(table_id = ?id, "selected"),
                Action::PlanResized(size) => debug!(width = size.width, height = size.height, "plan resized"),
                Action::SaveIndicatorChanged { id, indicator } => debug!(table_id = id, ?indicator, "save indicator"),
                Action::RenderNeeded => {}
            }
        }
        Ok(saves)
    }
}
