//! Input model: modifier keys, buttons, keys, and the gesture state machine.
//!
//! `Gesture` is the active manipulation tracked between pointer-down and
//! pointer-up on one table glyph. It carries everything needed to compute the
//! live geometry on each move and the committed geometry on release.
//! `LiveGeometry` is the per-frame projection shown while a gesture runs; it
//! is never persisted.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use crate::hit::ResizeAnchor;
use crate::transform::{PixelRect, Point};

/// Keyboard/mouse modifier keys held during an event.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Copy, Default)]
pub struct Modifiers {
    /// Shift key is held.
    pub shift: bool,
    /// Ctrl key is held.
    pub ctrl: bool,
    /// Alt / Option key is held.
    pub alt: bool,
    /// Meta / Command key is held.
    pub meta: bool,
}

impl Modifiers {
    /// Ctrl on most platforms, Command on macOS.
    #[must_use]
    pub fn command(self) -> bool {
        self.ctrl || self.meta
    }
}

/// Mouse button identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    /// Left mouse button (or single-finger tap).
    Primary,
    /// Middle mouse button (scroll wheel click).
    Middle,
    /// Right mouse button (or two-finger tap).
    Secondary,
}

/// A keyboard key as reported by the host (e.g. `"Escape"`, `"z"`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Key(pub String);

/// Editing command bound to a key chord.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCommand {
    Undo,
    Redo,
    Cancel,
}

impl KeyCommand {
    /// Map a key chord to an editing command.
    #[must_use]
    pub fn from_key(key: &Key, modifiers: Modifiers) -> Option<Self> {
        let name = key.0.as_str();
        if name == "Escape" {
            return Some(Self::Cancel);
        }
        if !modifiers.command() {
            return None;
        }
        match name {
            "z" | "Z" if modifiers.shift => Some(Self::Redo),
            "z" | "Z" => Some(Self::Undo),
            "y" | "Y" => Some(Self::Redo),
            _ => None,
        }
    }
}

/// Gesture state for one table glyph.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Gesture {
    /// No manipulation in progress.
    #[default]
    Idle,
    /// The glyph body is being dragged.
    Dragging {
        /// Pointer offset from the glyph's top-left corner at grab time.
        grab: Point,
        /// Glyph bounds when the drag started.
        start: PixelRect,
    },
    /// A resize handle is being dragged.
    Resizing {
        /// Which corner/edge handle is being dragged.
        anchor: ResizeAnchor,
        /// Pointer position when the resize started.
        start_pointer: Point,
        /// Glyph bounds when the resize started.
        start: PixelRect,
    },
    /// The rotate handle is being dragged.
    Rotating {
        /// Rotation pivot: the glyph center.
        center: Point,
        /// Pointer angle around `center` at grab time, 0 pointing up.
        start_angle: f64,
        /// Rotation in degrees when the gesture started.
        orig_rotation: f64,
    },
}

impl Gesture {
    #[must_use]
    pub fn is_active(&self) -> bool {
        !matches!(self, Self::Idle)
    }

    /// Short name for logs.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Dragging { .. } => "dragging",
            Self::Resizing { .. } => "resizing",
            Self::Rotating { .. } => "rotating",
        }
    }
}

/// Uncommitted pixel geometry shown while a gesture runs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LiveGeometry {
    pub rect: PixelRect,
    /// Rotation in degrees, not yet normalized.
    pub rotation: f64,
}
