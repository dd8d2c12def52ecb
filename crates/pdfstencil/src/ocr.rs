//! OCR collaborator seam.
//!
//! The engine never implements OCR itself. Fields marked `ocr_required`
//! hand a rendered page region to whatever [`OcrEngine`] the host wires
//! in; without one, those fields resolve to empty values.

use thiserror::Error;

/// OCR failure.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum OcrError {
    /// No OCR engine is wired in.
    #[error("no OCR engine available")]
    Unavailable,

    /// The engine failed to recognize the image.
    #[error("OCR recognition failed: {0}")]
    Failed(String),
}

/// Text recognition over a rendered page image.
pub trait OcrEngine {
    fn recognize(&self, image: &[u8]) -> Result<String, OcrError>;
}

/// The null engine: every recognition attempt reports unavailability.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOcr;

impl OcrEngine for NoOcr {
    fn recognize(&self, _image: &[u8]) -> Result<String, OcrError> {
        Err(OcrError::Unavailable)
    }
}
