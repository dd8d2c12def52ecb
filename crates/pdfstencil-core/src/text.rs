//! Character primitives extracted from a PDF page.

use crate::geometry::BBox;

/// A single positioned character.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Char {
    /// The text content of this character.
    pub text: String,
    /// Bounding box in top-left origin coordinates.
    pub bbox: BBox,
    /// Font name, when the backend knows it.
    #[cfg_attr(feature = "serde", serde(default))]
    pub fontname: String,
    /// Font size in points.
    #[cfg_attr(feature = "serde", serde(default))]
    pub size: f64,
}

impl Char {
    pub fn new(text: impl Into<String>, bbox: BBox) -> Self {
        Self {
            text: text.into(),
            bbox,
            fontname: String::new(),
            size: 0.0,
        }
    }

    /// Whether this character is whitespace only.
    pub fn is_blank(&self) -> bool {
        self.text.chars().all(|c| c.is_whitespace())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_char_is_blank() {
        assert!(Char::new(" ", BBox::new(0.0, 0.0, 1.0, 1.0)).is_blank());
        assert!(Char::new("\t", BBox::new(0.0, 0.0, 1.0, 1.0)).is_blank());
        assert!(!Char::new("a", BBox::new(0.0, 0.0, 1.0, 1.0)).is_blank());
    }
}
