//! Plan-size observer: debounced tracking of the container's pixel size.
//!
//! The host measures the container whenever it mounts or whenever a resize
//! is observed on the container or on the plan image inside it, and reports
//! the measurement here with a millisecond timestamp. Sizes are latched only
//! after a quiet period, so a collapsing sidebar does not make every table
//! re-project on each animation frame. Zero-sized measurements mean "not laid
//! out yet" and are never latched.

#[cfg(test)]
#[path = "observer_test.rs"]
mod observer_test;

use tracing::debug;

use crate::config::EditorConfig;
use crate::transform::PlanSize;

#[derive(Debug, Clone, Copy, PartialEq)]
struct Pending {
    size: PlanSize,
    due_ms: i64,
}

/// Tracks the latched plan size. The only writer of [`PlanSize`].
#[derive(Debug, Clone)]
pub struct PlanSizeObserver {
    settle_delay_ms: i64,
    debounce_ms: i64,
    current: Option<PlanSize>,
    pending: Option<Pending>,
}

impl PlanSizeObserver {
    #[must_use]
    pub fn new(config: &EditorConfig) -> Self {
        Self {
            settle_delay_ms: config.settle_delay_ms,
            debounce_ms: config.resize_debounce_ms,
            current: None,
            pending: None,
        }
    }

    /// The latched size, once one has been measured.
    #[must_use]
    pub fn size(&self) -> Option<PlanSize> {
        self.current
    }

    /// When the host should next call [`Self::tick`], if anything is pending.
    #[must_use]
    pub fn next_deadline(&self) -> Option<i64> {
        self.pending.map(|p| p.due_ms)
    }

    /// Record the first measurement; it is latched after the settle delay.
    pub fn mount(&mut self, measured: PlanSize, now_ms: i64) {
        self.pending = Some(Pending { size: measured, due_ms: now_ms + self.settle_delay_ms });
    }

    /// Record a measurement taken after a resize. Restarts the debounce.
    pub fn on_resize(&mut self, measured: PlanSize, now_ms: i64) {
        self.pending = Some(Pending { size: measured, due_ms: now_ms + self.debounce_ms });
    }

    /// Latch the pending measurement if its quiet period has elapsed.
    ///
    /// Returns the new size when it changed.
    pub fn tick(&mut self, now_ms: i64) -> Option<PlanSize> {
        let pending = self.pending?;
        if now_ms < pending.due_ms {
            return None;
        }
        self.pending = None;

        if !pending.size.is_measured() {
            debug!(width = pending.size.width, height = pending.size.height, "plan not laid out; size ignored");
            return None;
        }
        if self.current == Some(pending.size) {
            return None;
        }

        debug!(width = pending.size.width, height = pending.size.height, "plan size latched");
        self.current = Some(pending.size);
        self.current
    }
}
