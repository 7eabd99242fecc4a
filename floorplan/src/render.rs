//! Rendering: projects editor state into a toolkit-neutral draw list.
//!
//! This module produces one [`GlyphView`] per table in draw order. It reads
//! the provider and never mutates it. Hosts paint the views with whatever
//! toolkit they run on (canvas, native widgets, a terminal table).

#[cfg(test)]
#[path = "render_test.rs"]
mod render_test;

use crate::doc::{Shape, TableId};
use crate::hit::{ResizeAnchor, rotate_handle_position};
use crate::provider::PlanProvider;
use crate::reconciler::SaveIndicator;
use crate::transform::{PixelRect, Point};

/// Everything needed to paint one table glyph.
#[derive(Debug, Clone, PartialEq)]
pub struct GlyphView {
    pub table_id: TableId,
    /// Text drawn inside the glyph.
    pub label: String,
    pub shape: Shape,
    /// Axis-aligned bounds before rotation.
    pub rect: PixelRect,
    /// Clockwise rotation around the rect center, in degrees.
    pub rotation: f64,
    pub fill: String,
    pub opacity: f64,
    pub occupancy: usize,
    pub capacity: u32,
    pub selected: bool,
    /// Rotate handle, present only when the glyph is editable.
    pub rotate_handle: Option<Point>,
    /// Resize handles, empty unless the glyph is editable.
    pub resize_handles: Vec<(ResizeAnchor, Point)>,
    pub indicator: SaveIndicator,
    /// Whether `rect`/`rotation` come from a running gesture.
    pub live: bool,
}

impl GlyphView {
    /// Whether manipulation handles should be drawn.
    #[must_use]
    pub fn handles_visible(&self) -> bool {
        self.rotate_handle.is_some()
    }
}

/// Build the scene. Empty until the plan has been measured.
#[must_use]
pub fn scene(provider: &PlanProvider) -> Vec<GlyphView> {
    let Some(plan) = provider.plan_size() else {
        return Vec::new();
    };
    let editable_id = provider.selection().filter(|_| provider.is_editable());

    provider
        .controllers()
        .iter()
        .map(|controller| {
            let table = controller.table();
            let geometry = controller.geometry(plan);
            let editable = editable_id == Some(table.id);
            GlyphView {
                table_id: table.id,
                label: label(table.numero, table.nom.as_deref()),
                shape: table.shape,
                rect: geometry.rect,
                rotation: geometry.rotation,
                fill: table.fill_color().to_string(),
                opacity: table.fill_opacity(),
                occupancy: table.occupancy(),
                capacity: table.nombre_places_max,
                selected: provider.selection() == Some(table.id),
                rotate_handle: editable.then(|| rotate_handle_position(&geometry.rect)),
                resize_handles: if editable {
                    ResizeAnchor::ALL.iter().map(|a| (*a, a.position(&geometry.rect))).collect()
                } else {
                    Vec::new()
                },
                indicator: controller.indicator(),
                live: controller.live().is_some(),
            }
        })
        .collect()
}

/// "3 · Famille", "3", "Famille", or empty.
fn label(numero: Option<i64>, nom: Option<&str>) -> String {
    let nom = nom.map(str::trim).filter(|n| !n.is_empty());
    match (numero, nom) {
        (Some(n), Some(nom)) => format!("{n} · {nom}"),
        (Some(n), None) => n.to_string(),
        (None, Some(nom)) => nom.to_string(),
        (None, None) => String::new(),
    }
}
