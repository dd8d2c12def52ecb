//! Edge derivation from page primitives.
//!
//! Edges are the line segments the table detector works on. They are derived
//! from painted lines and rectangle sides; synthetic edges come from
//! injected ruling lines and text-alignment clustering.

use crate::geometry::Orientation;
use crate::shapes::{Line, Rect, classify_orientation};

/// Source of an edge, tracking which primitive it came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeSource {
    /// Derived directly from a painted line.
    Line,
    /// Top edge of a rect.
    RectTop,
    /// Bottom edge of a rect.
    RectBottom,
    /// Left edge of a rect.
    RectLeft,
    /// Right edge of a rect.
    RectRight,
    /// Generated from text alignment clustering (Text strategy).
    Text,
    /// From caller-supplied explicit line coordinates.
    Explicit,
    /// From a ruling line injected onto a throwaway page copy.
    Synthetic,
}

/// A line segment used for table detection.
#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    /// Left x coordinate.
    pub x0: f64,
    /// Top y coordinate (distance from top of page).
    pub top: f64,
    /// Right x coordinate.
    pub x1: f64,
    /// Bottom y coordinate (distance from top of page).
    pub bottom: f64,
    /// Edge orientation.
    pub orientation: Orientation,
    /// Where this edge was derived from.
    pub source: EdgeSource,
}

impl Edge {
    /// Length along the edge's primary axis.
    pub fn length(&self) -> f64 {
        let dx = self.x1 - self.x0;
        let dy = self.bottom - self.top;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Derive an edge from a line, carrying through the given source tag.
pub fn edge_from_line(line: &Line, source: EdgeSource) -> Edge {
    Edge {
        x0: line.x0,
        top: line.top,
        x1: line.x1,
        bottom: line.bottom,
        orientation: classify_orientation(line.x0, line.top, line.x1, line.bottom),
        source,
    }
}

/// Derive the four side edges of a rect.
pub fn edges_from_rect(rect: &Rect) -> Vec<Edge> {
    vec![
        Edge {
            x0: rect.x0,
            top: rect.top,
            x1: rect.x1,
            bottom: rect.top,
            orientation: Orientation::Horizontal,
            source: EdgeSource::RectTop,
        },
        Edge {
            x0: rect.x0,
            top: rect.bottom,
            x1: rect.x1,
            bottom: rect.bottom,
            orientation: Orientation::Horizontal,
            source: EdgeSource::RectBottom,
        },
        Edge {
            x0: rect.x0,
            top: rect.top,
            x1: rect.x0,
            bottom: rect.bottom,
            orientation: Orientation::Vertical,
            source: EdgeSource::RectLeft,
        },
        Edge {
            x0: rect.x1,
            top: rect.top,
            x1: rect.x1,
            bottom: rect.bottom,
            orientation: Orientation::Vertical,
            source: EdgeSource::RectRight,
        },
    ]
}

/// Derive all edges for a page's lines and rects.
///
/// `synthetic_from` marks how many trailing lines were injected rather than
/// painted; their edges carry [`EdgeSource::Synthetic`] so strict strategies
/// can still see them while content extraction ignores them entirely.
pub fn derive_edges(lines: &[Line], rects: &[Rect], synthetic_from: usize) -> Vec<Edge> {
    let mut edges = Vec::with_capacity(lines.len() + rects.len() * 4);
    for (i, line) in lines.iter().enumerate() {
        let source = if i >= synthetic_from {
            EdgeSource::Synthetic
        } else {
            EdgeSource::Line
        };
        edges.push(edge_from_line(line, source));
    }
    for rect in rects {
        edges.extend(edges_from_rect(rect));
    }
    edges
}
