//! Document access.
//!
//! The engine never parses PDF bytes itself. The host hands it pre-parsed
//! page structures ([`PageContent`]) behind the [`DocumentAccessor`] trait;
//! [`InMemoryDocument`] is the standard implementation and doubles as the
//! JSON hand-off format.

use pdfstencil_core::{BBox, Char, Line, PageIndex, Rect, WordExtractor, WordOptions, group_words_into_rows};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Pre-parsed content of a single page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageContent {
    /// Page width in points.
    pub width: f64,
    /// Page height in points.
    pub height: f64,
    #[serde(default)]
    pub chars: Vec<Char>,
    #[serde(default)]
    pub lines: Vec<Line>,
    #[serde(default)]
    pub rects: Vec<Rect>,
}

/// Document access failure.
#[derive(Debug, Error)]
pub enum DocumentError {
    /// The document could not be read as page structures.
    #[error("corrupt document: {0}")]
    Corrupt(String),

    /// The document has no pages.
    #[error("document has no pages")]
    Empty,

    /// A page index past the end of the document.
    #[error("page {page} out of range: document has {page_count} pages")]
    PageOutOfRange { page: usize, page_count: usize },

    /// This accessor cannot rasterize pages.
    #[error("page rendering is not supported by this document accessor")]
    RenderUnsupported,
}

/// Read access to a document's pages.
pub trait DocumentAccessor {
    /// Number of pages in the document.
    fn page_count(&self) -> usize;

    /// Content of one page.
    fn page(&self, index: PageIndex) -> Result<&PageContent, DocumentError>;

    /// Rasterize a region of one page, for OCR hand-off. `region` is in
    /// target page coordinates; `scale` multiplies the region's native
    /// dimensions.
    fn render_region(&self, index: PageIndex, region: &BBox, scale: f64) -> Result<Vec<u8>, DocumentError>;

    /// Plain text within a region of a page.
    ///
    /// Characters whose bbox center falls inside the region are grouped
    /// into words and rows; rows join with newlines, words with spaces.
    fn text_in_region(&self, index: PageIndex, region: &BBox) -> Result<String, DocumentError> {
        let page = self.page(index)?;
        let chars: Vec<Char> = page
            .chars
            .iter()
            .filter(|ch| region.contains_center(&ch.bbox))
            .cloned()
            .collect();

        let options = WordOptions::default();
        let words = WordExtractor::extract(&chars, &options);
        let rows = group_words_into_rows(&words, options.y_tolerance);
        let text = rows
            .iter()
            .map(|row| {
                row.iter()
                    .map(|w| w.text.as_str())
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .collect::<Vec<_>>()
            .join("\n");
        Ok(text)
    }
}

/// Processing state of a registered document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentStatus {
    #[default]
    New,
    Processing,
    Processed,
    Error,
}

/// Metadata recorded about a document, populated on first inspection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    pub status: DocumentStatus,
    pub page_count: Option<usize>,
    pub byte_size: Option<u64>,
}

/// A document held entirely in memory as parsed page structures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InMemoryDocument {
    pages: Vec<PageContent>,
    #[serde(default)]
    byte_size: Option<u64>,
}

impl InMemoryDocument {
    pub fn new(pages: Vec<PageContent>) -> Self {
        Self {
            pages,
            byte_size: None,
        }
    }

    /// Record the source file size, when the host knows it.
    pub fn with_byte_size(mut self, byte_size: u64) -> Self {
        self.byte_size = Some(byte_size);
        self
    }

    /// Inspect the document, filling in page count and size.
    pub fn metadata(&self) -> DocumentMetadata {
        DocumentMetadata {
            status: if self.pages.is_empty() {
                DocumentStatus::Error
            } else {
                DocumentStatus::New
            },
            page_count: Some(self.pages.len()),
            byte_size: self.byte_size,
        }
    }
}

impl DocumentAccessor for InMemoryDocument {
    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn page(&self, index: PageIndex) -> Result<&PageContent, DocumentError> {
        self.pages.get(index.0).ok_or(DocumentError::PageOutOfRange {
            page: index.0,
            page_count: self.pages.len(),
        })
    }

    fn render_region(&self, _index: PageIndex, _region: &BBox, _scale: f64) -> Result<Vec<u8>, DocumentError> {
        Err(DocumentError::RenderUnsupported)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pdfstencil_core::BBox;

    fn page_with_text() -> PageContent {
        PageContent {
            width: 612.0,
            height: 792.0,
            chars: vec![
                Char::new("H", BBox::new(100.0, 100.0, 108.0, 112.0)),
                Char::new("i", BBox::new(108.0, 100.0, 112.0, 112.0)),
                Char::new("X", BBox::new(400.0, 400.0, 408.0, 412.0)),
            ],
            lines: vec![],
            rects: vec![],
        }
    }

    #[test]
    fn test_page_lookup() {
        let doc = InMemoryDocument::new(vec![page_with_text()]);
        assert_eq!(doc.page_count(), 1);
        assert!(doc.page(PageIndex(0)).is_ok());
        assert!(matches!(
            doc.page(PageIndex(1)),
            Err(DocumentError::PageOutOfRange {
                page: 1,
                page_count: 1
            })
        ));
    }

    #[test]
    fn test_text_in_region_clips_to_region() {
        let doc = InMemoryDocument::new(vec![page_with_text()]);
        let region = BBox::new(90.0, 90.0, 200.0, 120.0);
        assert_eq!(doc.text_in_region(PageIndex(0), &region).unwrap(), "Hi");
    }

    #[test]
    fn test_text_in_region_empty_when_nothing_inside() {
        let doc = InMemoryDocument::new(vec![page_with_text()]);
        let region = BBox::new(0.0, 0.0, 50.0, 50.0);
        assert_eq!(doc.text_in_region(PageIndex(0), &region).unwrap(), "");
    }

    #[test]
    fn test_render_is_unsupported() {
        let doc = InMemoryDocument::new(vec![page_with_text()]);
        let region = BBox::new(0.0, 0.0, 100.0, 100.0);
        assert!(matches!(
            doc.render_region(PageIndex(0), &region, 2.0),
            Err(DocumentError::RenderUnsupported)
        ));
    }

    #[test]
    fn test_metadata_inspection() {
        let doc = InMemoryDocument::new(vec![page_with_text()]).with_byte_size(1024);
        let meta = doc.metadata();
        assert_eq!(meta.status, DocumentStatus::New);
        assert_eq!(meta.page_count, Some(1));
        assert_eq!(meta.byte_size, Some(1024));

        let empty = InMemoryDocument::new(vec![]);
        assert_eq!(empty.metadata().status, DocumentStatus::Error);
    }

    #[test]
    fn test_deserializes_from_host_json() {
        let json = r#"{
            "pages": [{
                "width": 612.0,
                "height": 792.0,
                "chars": [{"text": "A", "bbox": {"x0": 1.0, "top": 2.0, "x1": 3.0, "bottom": 4.0}}]
            }]
        }"#;
        let doc: InMemoryDocument = serde_json::from_str(json).unwrap();
        assert_eq!(doc.page_count(), 1);
        assert_eq!(doc.page(PageIndex(0)).unwrap().chars[0].text, "A");
    }
}
