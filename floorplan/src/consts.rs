//! Shared numeric constants for the floor-plan editor.

// ── History ─────────────────────────────────────────────────────

/// Maximum number of undo snapshots kept per table.
pub const MAX_HISTORY: usize = 20;

// ── Plan measurement ────────────────────────────────────────────

/// Debounce applied to container resize observations, in milliseconds.
///
/// Longer than a sidebar collapse transition so intermediate sizes are
/// never latched.
pub const RESIZE_DEBOUNCE_MS: i64 = 250;

/// Delay between mount and the first latched measurement, in milliseconds.
pub const SETTLE_DELAY_MS: i64 = 100;

// ── Save indicator ──────────────────────────────────────────────

/// How long the "saved" indicator stays visible before returning to idle.
pub const SAVED_FLASH_MS: i64 = 1200;

// ── Geometry ────────────────────────────────────────────────────

/// Minimum glyph side as a fraction of the smaller plan dimension.
pub const MIN_SIZE_RATIO: f64 = 0.03;

/// Decimal places used when persisting geometry.
pub const PERSIST_DECIMALS: usize = 2;

/// Rotation snap step in degrees while Shift is held.
pub const ROTATION_SNAP_DEG: f64 = 15.0;

// ── Hit-testing ─────────────────────────────────────────────────

/// Screen-space hit slop in pixels for resize and rotate handles.
pub const HANDLE_RADIUS_PX: f64 = 8.0;

/// Distance from the glyph's top edge to the rotate handle, in pixels.
pub const ROTATE_HANDLE_OFFSET_PX: f64 = 24.0;

// ── Occupancy ───────────────────────────────────────────────────

/// Glyph opacity of an empty table.
pub const EMPTY_TABLE_OPACITY: f64 = 0.35;
