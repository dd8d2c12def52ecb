//! Bounding boxes and reference-to-target scale normalization.
//!
//! Templates are authored against a reference first-page size. When a target
//! document's pages differ, every authored box is rescaled by the per-axis
//! ratio before any text is read.

/// Bounding box with top-left origin coordinate system.
///
/// - `x0`: left edge
/// - `top`: top edge (distance from top of page)
/// - `x1`: right edge
/// - `bottom`: bottom edge (distance from top of page)
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BBox {
    pub x0: f64,
    pub top: f64,
    pub x1: f64,
    pub bottom: f64,
}

impl BBox {
    pub fn new(x0: f64, top: f64, x1: f64, bottom: f64) -> Self {
        Self {
            x0,
            top,
            x1,
            bottom,
        }
    }

    /// Build a box from an authored origin plus width and height.
    pub fn from_origin_size(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x0: x,
            top: y,
            x1: x + width,
            bottom: y + height,
        }
    }

    /// Width of the bounding box.
    pub fn width(&self) -> f64 {
        self.x1 - self.x0
    }

    /// Height of the bounding box.
    pub fn height(&self) -> f64 {
        self.bottom - self.top
    }

    /// Compute the union of two bounding boxes.
    pub fn union(&self, other: &BBox) -> BBox {
        BBox {
            x0: self.x0.min(other.x0),
            top: self.top.min(other.top),
            x1: self.x1.max(other.x1),
            bottom: self.bottom.max(other.bottom),
        }
    }

    /// Whether the center point of `other` lies within this box.
    pub fn contains_center(&self, other: &BBox) -> bool {
        let cx = (other.x0 + other.x1) / 2.0;
        let cy = (other.top + other.bottom) / 2.0;
        cx >= self.x0 && cx <= self.x1 && cy >= self.top && cy <= self.bottom
    }

    /// Whether two boxes overlap at all.
    pub fn intersects(&self, other: &BBox) -> bool {
        self.x0 < other.x1 && other.x0 < self.x1 && self.top < other.bottom && other.top < self.bottom
    }
}

/// Orientation of an axis-aligned segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Horizontal,
    Vertical,
    Diagonal,
}

/// Per-axis scale factors mapping template-reference coordinates onto a
/// target page.
///
/// `sx = target_width / reference_width`, `sy = target_height /
/// reference_height`. A zero or unset reference dimension yields an
/// identity factor for that axis instead of dividing by zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleFactors {
    pub sx: f64,
    pub sy: f64,
}

impl ScaleFactors {
    pub fn new(reference_width: f64, reference_height: f64, target_width: f64, target_height: f64) -> Self {
        let sx = if reference_width > 0.0 {
            target_width / reference_width
        } else {
            1.0
        };
        let sy = if reference_height > 0.0 {
            target_height / reference_height
        } else {
            1.0
        };
        Self { sx, sy }
    }

    /// Identity factors (no rescaling).
    pub fn identity() -> Self {
        Self { sx: 1.0, sy: 1.0 }
    }

    /// Rescale all four coordinates of a box.
    pub fn apply(&self, bbox: &BBox) -> BBox {
        BBox {
            x0: bbox.x0 * self.sx,
            top: bbox.top * self.sy,
            x1: bbox.x1 * self.sx,
            bottom: bbox.bottom * self.sy,
        }
    }
}
