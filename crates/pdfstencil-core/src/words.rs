//! Grouping characters into words and words into rows.

use crate::geometry::BBox;
use crate::text::Char;

/// Options for word extraction.
#[derive(Debug, Clone)]
pub struct WordOptions {
    /// Maximum horizontal gap between characters grouped into one word.
    pub x_tolerance: f64,
    /// Maximum vertical offset between characters grouped into one word.
    pub y_tolerance: f64,
    /// If true, blank characters join words instead of splitting them.
    pub keep_blank_chars: bool,
}

impl Default for WordOptions {
    fn default() -> Self {
        Self {
            x_tolerance: 3.0,
            y_tolerance: 3.0,
            keep_blank_chars: false,
        }
    }
}

/// A word grouped from adjacent characters.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Word {
    /// The text content of this word.
    pub text: String,
    /// Bounding box encompassing all constituent characters.
    pub bbox: BBox,
}

/// Groups characters into words by spatial proximity.
pub struct WordExtractor;

impl WordExtractor {
    /// Extract words from the given characters.
    ///
    /// Characters are sorted top-to-bottom, left-to-right, then grouped:
    /// a character starts a new word when it is further than `x_tolerance`
    /// from the previous character's right edge, sits more than
    /// `y_tolerance` off the previous character's baseline row, or is
    /// whitespace (unless `keep_blank_chars`).
    pub fn extract(chars: &[Char], options: &WordOptions) -> Vec<Word> {
        if chars.is_empty() {
            return Vec::new();
        }

        let mut sorted: Vec<&Char> = chars.iter().collect();
        sorted.sort_by(|a, b| {
            a.bbox
                .top
                .partial_cmp(&b.bbox.top)
                .unwrap()
                .then(a.bbox.x0.partial_cmp(&b.bbox.x0).unwrap())
        });

        let mut words = Vec::new();
        let mut current: Vec<&Char> = Vec::new();

        for ch in sorted {
            if ch.is_blank() && !options.keep_blank_chars {
                if !current.is_empty() {
                    words.push(Self::make_word(&current));
                    current.clear();
                }
                continue;
            }

            if let Some(last) = current.last() {
                let x_gap = ch.bbox.x0 - last.bbox.x1;
                let y_off = (ch.bbox.top - last.bbox.top).abs();
                if x_gap > options.x_tolerance || x_gap < -options.x_tolerance || y_off > options.y_tolerance {
                    words.push(Self::make_word(&current));
                    current.clear();
                }
            }
            current.push(ch);
        }

        if !current.is_empty() {
            words.push(Self::make_word(&current));
        }

        words
    }

    fn make_word(chars: &[&Char]) -> Word {
        let mut bbox = chars[0].bbox;
        let mut text = String::new();
        for ch in chars {
            bbox = bbox.union(&ch.bbox);
            text.push_str(&ch.text);
        }
        Word { text, bbox }
    }
}

/// Default y-proximity tolerance when grouping words into rows.
pub const ROW_Y_TOLERANCE: f64 = 5.0;

/// Group words into rows by y-coordinate proximity, ordering each row
/// left-to-right.
///
/// A word joins the current row when its top is within `y_tolerance` of
/// the row's first word; otherwise it starts a new row. Rows come back
/// top-to-bottom, so repeated runs over the same words produce identical
/// ordering.
pub fn group_words_into_rows(words: &[Word], y_tolerance: f64) -> Vec<Vec<Word>> {
    if words.is_empty() {
        return Vec::new();
    }

    let mut sorted: Vec<&Word> = words.iter().collect();
    sorted.sort_by(|a, b| {
        a.bbox
            .top
            .partial_cmp(&b.bbox.top)
            .unwrap()
            .then(a.bbox.x0.partial_cmp(&b.bbox.x0).unwrap())
    });

    let mut rows: Vec<Vec<Word>> = Vec::new();
    for word in sorted {
        match rows.last_mut() {
            Some(row) if (word.bbox.top - row[0].bbox.top).abs() <= y_tolerance => {
                row.push(word.clone());
            }
            _ => rows.push(vec![word.clone()]),
        }
    }

    for row in &mut rows {
        row.sort_by(|a, b| a.bbox.x0.partial_cmp(&b.bbox.x0).unwrap());
    }

    rows
}
