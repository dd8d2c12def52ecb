//! Scalar field extraction.

use pdfstencil_core::{BBox, ScaleFactors, resolve_page};
use tracing::debug;

use crate::document::{DocumentAccessor, DocumentError};
use crate::ocr::OcrEngine;
use crate::template::{Template, TemplateField};

/// Raster scale handed to the renderer for OCR crops.
const OCR_RENDER_SCALE: f64 = 2.0;

/// Extract one scalar field's text from a document.
///
/// A corrupt or empty document is fatal and propagates. Field-local
/// problems — the page rule resolves outside the document, the page index
/// is out of range, OCR is unavailable — yield an empty string ("no
/// data"). Table-mode fields are not handled here.
pub fn extract_field(
    doc: &dyn DocumentAccessor,
    template: &Template,
    field: &TemplateField,
    ocr: Option<&dyn OcrEngine>,
) -> Result<String, DocumentError> {
    let Some(index) = resolve_page(
        field.page,
        &template.page_rules,
        template.reference_page_count,
        doc.page_count(),
    ) else {
        debug!(field = %field.output_name(), page = field.page, "page rule resolved outside document");
        return Ok(String::new());
    };

    let page = match doc.page(index) {
        Ok(page) => page,
        Err(e @ (DocumentError::Corrupt(_) | DocumentError::Empty)) => return Err(e),
        Err(e) => {
            debug!(field = %field.output_name(), error = %e, "page unreadable");
            return Ok(String::new());
        }
    };

    let scale = ScaleFactors::new(
        template.reference_width,
        template.reference_height,
        page.width,
        page.height,
    );
    let region = scale.apply(&field.bbox());

    if field.ocr_required {
        return Ok(ocr_region(doc, index, &region, field, ocr));
    }

    match doc.text_in_region(index, &region) {
        Ok(text) => Ok(text),
        Err(e @ (DocumentError::Corrupt(_) | DocumentError::Empty)) => Err(e),
        Err(e) => {
            debug!(field = %field.output_name(), error = %e, "text read failed");
            Ok(String::new())
        }
    }
}

fn ocr_region(
    doc: &dyn DocumentAccessor,
    index: pdfstencil_core::PageIndex,
    region: &BBox,
    field: &TemplateField,
    ocr: Option<&dyn OcrEngine>,
) -> String {
    let Some(engine) = ocr else {
        debug!(field = %field.output_name(), "OCR required but no engine wired in");
        return String::new();
    };
    let image = match doc.render_region(index, region, OCR_RENDER_SCALE) {
        Ok(image) => image,
        Err(e) => {
            debug!(field = %field.output_name(), error = %e, "region render failed");
            return String::new();
        }
    };
    match engine.recognize(&image) {
        Ok(text) => text,
        Err(e) => {
            debug!(field = %field.output_name(), error = %e, "OCR failed");
            String::new()
        }
    }
}
