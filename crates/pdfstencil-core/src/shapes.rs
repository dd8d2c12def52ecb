//! Line and rectangle primitives used for table-structure detection.
//!
//! Coordinates use the top-left origin system throughout.

use crate::geometry::Orientation;

/// A line segment painted on the page (or injected synthetically).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Line {
    /// Left x coordinate.
    pub x0: f64,
    /// Top y coordinate (distance from top of page).
    pub top: f64,
    /// Right x coordinate.
    pub x1: f64,
    /// Bottom y coordinate (distance from top of page).
    pub bottom: f64,
    /// Stroke width.
    pub line_width: f64,
}

impl Line {
    /// Build a line from two points, normalizing coordinate order.
    pub fn from_points(p0: (f64, f64), p1: (f64, f64), line_width: f64) -> Self {
        Self {
            x0: p0.0.min(p1.0),
            top: p0.1.min(p1.1),
            x1: p0.0.max(p1.0),
            bottom: p0.1.max(p1.1),
            line_width,
        }
    }

    /// Classify the orientation of this segment.
    pub fn orientation(&self) -> Orientation {
        classify_orientation(self.x0, self.top, self.x1, self.bottom)
    }
}

/// A stroked or filled rectangle painted on the page.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rect {
    /// Left x coordinate.
    pub x0: f64,
    /// Top y coordinate (distance from top of page).
    pub top: f64,
    /// Right x coordinate.
    pub x1: f64,
    /// Bottom y coordinate (distance from top of page).
    pub bottom: f64,
}

impl Rect {
    pub fn new(x0: f64, top: f64, x1: f64, bottom: f64) -> Self {
        Self {
            x0,
            top,
            x1,
            bottom,
        }
    }
}

/// Tolerance for floating-point comparison when classifying orientation.
const AXIS_TOLERANCE: f64 = 1e-6;

/// Classify orientation from two corner coordinates.
pub(crate) fn classify_orientation(x0: f64, y0: f64, x1: f64, y1: f64) -> Orientation {
    let dx = (x1 - x0).abs();
    let dy = (y1 - y0).abs();
    if dy < AXIS_TOLERANCE {
        Orientation::Horizontal
    } else if dx < AXIS_TOLERANCE {
        Orientation::Vertical
    } else {
        Orientation::Diagonal
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_from_points_normalizes_order() {
        let line = Line::from_points((100.0, 50.0), (10.0, 50.0), 1.0);
        assert_eq!(line.x0, 10.0);
        assert_eq!(line.x1, 100.0);
        assert_eq!(line.orientation(), Orientation::Horizontal);
    }

    #[test]
    fn test_line_orientation_classification() {
        let v = Line::from_points((50.0, 0.0), (50.0, 100.0), 1.0);
        assert_eq!(v.orientation(), Orientation::Vertical);
        let d = Line::from_points((0.0, 0.0), (50.0, 100.0), 1.0);
        assert_eq!(d.orientation(), Orientation::Diagonal);
    }
}
