//! Document model: table records, geometry snapshots, and the outbound update.
//!
//! Table records are owned by the data-loading collaborator. The editor reads
//! them as values and only ever sends back a sparse geometry delta
//! (`TableUpdate`). Geometry arrives on the wire as decimal strings and leaves
//! as decimal strings with exactly two places, matching the backend's stored
//! precision so repeated round-trips do not drift.

#[cfg(test)]
#[path = "doc_test.rs"]
mod doc_test;

use serde::{Deserialize, Serialize};

use crate::consts::{EMPTY_TABLE_OPACITY, MIN_SIZE_RATIO, PERSIST_DECIMALS};
use crate::transform::{Dimension, PixelRect, PlanSize, to_percent, to_pixels};

/// Stable identifier of a table record.
pub type TableId = i64;

/// Fill used when a table has no category.
pub const DEFAULT_FILL: &str = "#9E9E9E";

/// Outline of a table glyph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Shape {
    /// Round table. Width and height are always numerically equal.
    #[default]
    Circle,
    /// Ellipse inscribed in the bounding box.
    Oval,
    /// Sharp-cornered rectangle.
    Rectangle,
    /// Rectangle with rounded corners.
    RoundedRectangle,
}

impl Shape {
    /// Whether resizing must keep width and height equal.
    #[must_use]
    pub fn keeps_ratio(self) -> bool {
        matches!(self, Self::Circle)
    }

    /// Whether the glyph body is elliptical for hit-testing.
    #[must_use]
    pub fn is_elliptical(self) -> bool {
        matches!(self, Self::Circle | Self::Oval)
    }
}

/// A guest assigned to a table. Only its presence matters to the editor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Guest {
    pub id: i64,
    #[serde(default)]
    pub nom: Option<String>,
    #[serde(default)]
    pub prenom: Option<String>,
}

/// Table category. The editor only reads its color.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Category {
    #[serde(default)]
    pub couleur: Option<String>,
}

/// A table record as received from the data-loading collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Table {
    pub id: TableId,
    #[serde(default)]
    pub numero: Option<i64>,
    #[serde(default)]
    pub nom: Option<String>,
    #[serde(default)]
    pub shape: Shape,
    /// Left anchor in percent of plan width.
    #[serde(with = "decimal")]
    pub pos_x: f64,
    /// Top anchor in percent of plan height.
    #[serde(with = "decimal")]
    pub pos_y: f64,
    /// Width in percent of plan width.
    #[serde(with = "decimal")]
    pub width: f64,
    /// Height in percent of plan height.
    #[serde(with = "decimal")]
    pub height: f64,
    /// Clockwise rotation in degrees, `[0, 360)`.
    #[serde(with = "decimal")]
    pub rotation: f64,
    pub nombre_places_max: u32,
    #[serde(default)]
    pub personnes: Vec<Guest>,
    #[serde(default)]
    pub categorie: Option<Category>,
}

impl Table {
    /// Number of guests currently seated.
    #[must_use]
    pub fn occupancy(&self) -> usize {
        self.personnes.len()
    }

    /// Occupancy as a fraction of capacity, clamped to `[0, 1]`.
    #[must_use]
    pub fn occupancy_ratio(&self) -> f64 {
        if self.nombre_places_max == 0 {
            return 1.0;
        }
        #[allow(clippy::cast_precision_loss)]
        let seated = self.occupancy() as f64;
        (seated / f64::from(self.nombre_places_max)).clamp(0.0, 1.0)
    }

    /// Glyph opacity: faint when empty, opaque when full.
    #[must_use]
    pub fn fill_opacity(&self) -> f64 {
        EMPTY_TABLE_OPACITY + (1.0 - EMPTY_TABLE_OPACITY) * self.occupancy_ratio()
    }

    /// Category color, or the neutral default.
    #[must_use]
    pub fn fill_color(&self) -> &str {
        self.categorie
            .as_ref()
            .and_then(|c| c.couleur.as_deref())
            .unwrap_or(DEFAULT_FILL)
    }

    /// The persisted geometry of this record.
    #[must_use]
    pub fn state(&self) -> TableState {
        TableState {
            pos_x: self.pos_x,
            pos_y: self.pos_y,
            width: self.width,
            height: if self.shape.keeps_ratio() { self.width } else { self.height },
            rotation: self.rotation,
        }
    }

    /// Overwrite the record's geometry with a snapshot.
    pub fn apply_state(&mut self, state: &TableState) {
        self.pos_x = state.pos_x;
        self.pos_y = state.pos_y;
        self.width = state.width;
        self.height = state.height;
        self.rotation = state.rotation;
    }
}

/// The undo-able geometry of one table, in percent and degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableState {
    pub pos_x: f64,
    pub pos_y: f64,
    pub width: f64,
    pub height: f64,
    pub rotation: f64,
}

impl TableState {
    /// Project onto the plan in pixels.
    ///
    /// Circles use their width for both axes so the glyph stays round on any
    /// aspect ratio.
    #[must_use]
    pub fn to_pixels(&self, shape: Shape, plan: PlanSize) -> PixelRect {
        let width = to_pixels(self.width, Dimension::Width, plan);
        let height = if shape.keeps_ratio() { width } else { to_pixels(self.height, Dimension::Height, plan) };
        PixelRect {
            x: to_pixels(self.pos_x, Dimension::Width, plan),
            y: to_pixels(self.pos_y, Dimension::Height, plan),
            width,
            height,
        }
    }

    /// Build a snapshot from a pixel rectangle, keeping `rotation`.
    ///
    /// Values are rounded to the persisted precision; circles copy their
    /// width percentage into the height. A side that rounding would take
    /// under the minimum size is rounded up to it instead.
    #[must_use]
    pub fn from_pixels(rect: PixelRect, rotation: f64, shape: Shape, plan: PlanSize) -> Self {
        let width = persisted_side(rect.width, Dimension::Width, plan);
        let height = if shape.keeps_ratio() { width } else { persisted_side(rect.height, Dimension::Height, plan) };
        Self {
            pos_x: round_persisted(to_percent(rect.x, Dimension::Width, plan)),
            pos_y: round_persisted(to_percent(rect.y, Dimension::Height, plan)),
            width,
            height,
            rotation: round_persisted(rotation).rem_euclid(360.0),
        }
    }

    /// Whether two snapshots differ once rounded to the persisted precision.
    #[must_use]
    pub fn differs_from(&self, other: &TableState) -> bool {
        format_decimal(self.pos_x) != format_decimal(other.pos_x)
            || format_decimal(self.pos_y) != format_decimal(other.pos_y)
            || format_decimal(self.width) != format_decimal(other.width)
            || format_decimal(self.height) != format_decimal(other.height)
            || format_decimal(self.rotation) != format_decimal(other.rotation)
    }
}

/// Percent size along `dimension`, rounded, and never under the minimum side.
fn persisted_side(px: f64, dimension: Dimension, plan: PlanSize) -> f64 {
    let floor = to_percent(MIN_SIZE_RATIO * plan.min_side(), dimension, plan);
    let side = round_persisted(to_percent(px, dimension, plan));
    if side < floor - FLOOR_EPSILON {
        // Nudged down first so a floor already on the grid is not bumped a step.
        ((floor - FLOOR_EPSILON) * 100.0).ceil() / 100.0
    } else {
        side
    }
}

/// Float noise tolerated when comparing against the minimum side.
const FLOOR_EPSILON: f64 = 1e-9;

/// Sparse geometry update sent to the persistence collaborator.
///
/// Every present field is a decimal string with exactly two places.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pos_x: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pos_y: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotation: Option<String>,
}

impl TableUpdate {
    /// A full geometry update carrying all five fields.
    #[must_use]
    pub fn from_state(state: &TableState) -> Self {
        Self {
            pos_x: Some(format_decimal(state.pos_x)),
            pos_y: Some(format_decimal(state.pos_y)),
            width: Some(format_decimal(state.width)),
            height: Some(format_decimal(state.height)),
            rotation: Some(format_decimal(state.rotation)),
        }
    }
}

// =============================================================================
// DECIMAL STRINGS
// =============================================================================

/// A geometry field could not be read as a finite decimal.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid decimal for {field}: {value:?}")]
pub struct DecimalError {
    pub field: &'static str,
    pub value: String,
}

/// Parse a decimal string from the wire.
///
/// # Errors
///
/// Returns a [`DecimalError`] for empty, malformed, or non-finite input.
pub fn parse_decimal(field: &'static str, raw: &str) -> Result<f64, DecimalError> {
    match raw.trim().parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(DecimalError { field, value: raw.to_string() }),
    }
}

/// Round to the persisted precision.
#[must_use]
pub fn round_persisted(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Format with exactly two decimal places.
#[must_use]
pub fn format_decimal(value: f64) -> String {
    // Adding +0.0 turns a rounded -0.0 into 0.0 so "-0.00" never goes out.
    let rounded = round_persisted(value) + 0.0;
    format!("{:.*}", PERSIST_DECIMALS, rounded)
}

/// Serde adapter: accepts decimal strings or JSON numbers, writes strings.
mod decimal {
    use serde::{Deserialize, Deserializer, Serializer, de};

    use super::{format_decimal, parse_decimal};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(f64),
    }

    pub fn serialize<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format_decimal(*value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        match Raw::deserialize(deserializer)? {
            Raw::Text(s) => parse_decimal("geometry", &s).map_err(de::Error::custom),
            Raw::Number(n) if n.is_finite() => Ok(n),
            Raw::Number(n) => Err(de::Error::custom(format!("non-finite geometry value {n}"))),
        }
    }
}
