//! Hit-testing pointer positions against table glyphs and their handles.
//!
//! Handles sit on the glyph's axis-aligned bounding box; rotation is a visual
//! transform of the body only, so handles never rotate with it.

#[cfg(test)]
#[path = "hit_test.rs"]
mod hit_test;

use crate::consts::{HANDLE_RADIUS_PX, ROTATE_HANDLE_OFFSET_PX};
use crate::doc::{Shape, TableId};
use crate::transform::{PixelRect, Point};

/// Which part of a glyph was hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitPart {
    Body,
    ResizeHandle(ResizeAnchor),
    RotateHandle,
}

/// Anchor position for resize handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizeAnchor {
    N,
    Ne,
    E,
    Se,
    S,
    Sw,
    W,
    Nw,
}

impl ResizeAnchor {
    /// All handles, corners first so they win over edges at the same spot.
    pub const ALL: [ResizeAnchor; 8] = [Self::Nw, Self::Ne, Self::Se, Self::Sw, Self::N, Self::E, Self::S, Self::W];

    /// Whether dragging this handle moves the left edge.
    #[must_use]
    pub fn moves_west(self) -> bool {
        matches!(self, Self::Nw | Self::W | Self::Sw)
    }

    /// Whether dragging this handle moves the right edge.
    #[must_use]
    pub fn moves_east(self) -> bool {
        matches!(self, Self::Ne | Self::E | Self::Se)
    }

    /// Whether dragging this handle moves the top edge.
    #[must_use]
    pub fn moves_north(self) -> bool {
        matches!(self, Self::Nw | Self::N | Self::Ne)
    }

    /// Whether dragging this handle moves the bottom edge.
    #[must_use]
    pub fn moves_south(self) -> bool {
        matches!(self, Self::Sw | Self::S | Self::Se)
    }

    #[must_use]
    pub fn is_corner(self) -> bool {
        matches!(self, Self::Ne | Self::Se | Self::Sw | Self::Nw)
    }

    /// Pixel position of this handle on `rect`.
    #[must_use]
    pub fn position(self, rect: &PixelRect) -> Point {
        let cx = rect.x + rect.width / 2.0;
        let cy = rect.y + rect.height / 2.0;
        match self {
            Self::N => Point::new(cx, rect.y),
            Self::Ne => Point::new(rect.right(), rect.y),
            Self::E => Point::new(rect.right(), cy),
            Self::Se => Point::new(rect.right(), rect.bottom()),
            Self::S => Point::new(cx, rect.bottom()),
            Self::Sw => Point::new(rect.x, rect.bottom()),
            Self::W => Point::new(rect.x, cy),
            Self::Nw => Point::new(rect.x, rect.y),
        }
    }
}

/// Result of a hit test.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hit {
    pub table_id: TableId,
    pub part: HitPart,
}

/// Pixel bounds of one glyph, in draw order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlyphBounds {
    pub table_id: TableId,
    pub rect: PixelRect,
    pub shape: Shape,
}

/// Position of the rotate handle above the top edge's midpoint.
#[must_use]
pub fn rotate_handle_position(rect: &PixelRect) -> Point {
    Point::new(rect.x + rect.width / 2.0, rect.y - ROTATE_HANDLE_OFFSET_PX)
}

/// Test the handles of one glyph. Rotate handle first, then resize handles.
#[must_use]
pub fn handle_at(pt: Point, rect: &PixelRect) -> Option<HitPart> {
    if near(pt, rotate_handle_position(rect)) {
        return Some(HitPart::RotateHandle);
    }
    ResizeAnchor::ALL
        .into_iter()
        .find(|anchor| near(pt, anchor.position(rect)))
        .map(HitPart::ResizeHandle)
}

/// Whether `pt` lies inside the glyph body.
#[must_use]
pub fn body_contains(pt: Point, rect: &PixelRect, shape: Shape) -> bool {
    if rect.width <= 0.0 || rect.height <= 0.0 {
        return false;
    }
    if shape.is_elliptical() {
        let c = rect.center();
        let rx = rect.width / 2.0;
        let ry = rect.height / 2.0;
        let nx = (pt.x - c.x) / rx;
        let ny = (pt.y - c.y) / ry;
        return nx * nx + ny * ny <= 1.0;
    }
    pt.x >= rect.x && pt.x <= rect.right() && pt.y >= rect.y && pt.y <= rect.bottom()
}

/// Find what lies under `pt`.
///
/// When `active` names a glyph whose handles are live, its handles are tested
/// before any body. Bodies are tested topmost (last in `glyphs`) first.
#[must_use]
pub fn hit_test(pt: Point, glyphs: &[GlyphBounds], active: Option<TableId>) -> Option<Hit> {
    if let Some(active_id) = active {
        if let Some(bounds) = glyphs.iter().find(|g| g.table_id == active_id) {
            if let Some(part) = handle_at(pt, &bounds.rect) {
                return Some(Hit { table_id: active_id, part });
            }
        }
    }
    glyphs
        .iter()
        .rev()
        .find(|g| body_contains(pt, &g.rect, g.shape))
        .map(|g| Hit { table_id: g.table_id, part: HitPart::Body })
}

fn near(a: Point, b: Point) -> bool {
    let dx = a.x - b.x;
    let dy = a.y - b.y;
    dx * dx + dy * dy <= HANDLE_RADIUS_PX * HANDLE_RADIUS_PX
}
