//! Editor tuning knobs.
//!
//! Defaults match [`crate::consts`]. Hosts override them from their own
//! configuration layer (environment, flags) before building a provider.

use crate::consts::{RESIZE_DEBOUNCE_MS, SAVED_FLASH_MS, SETTLE_DELAY_MS};
use crate::reconciler::StalePolicy;

/// Timing and reconciliation settings shared by every table on a plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EditorConfig {
    /// Quiet period after the last container resize before a size is latched.
    pub resize_debounce_ms: i64,
    /// Delay between mount and the first latched measurement.
    pub settle_delay_ms: i64,
    /// How long the "saved" indicator is shown after a successful commit.
    pub saved_flash_ms: i64,
    /// What to do with a save response that is older than the newest request.
    pub stale_policy: StalePolicy,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            resize_debounce_ms: RESIZE_DEBOUNCE_MS,
            settle_delay_ms: SETTLE_DELAY_MS,
            saved_flash_ms: SAVED_FLASH_MS,
            stale_policy: StalePolicy::default(),
        }
    }
}
