//! Template-driven data extraction from pre-parsed PDF page structures.
//!
//! The engine takes a [`Template`] (where the data lives), a
//! [`Configuration`] (what the output must contain), and a document behind
//! the [`DocumentAccessor`] trait, and produces an [`ExtractionRun`] with
//! a stable JSON result payload. Geometry, page-offset resolution, and
//! table detection come from `pdfstencil-core`; this crate adds the
//! document seam, the template model, extraction, the post-processing
//! sandbox, and the run orchestrator.

pub mod document;
pub mod fields;
pub mod functions;
pub mod ocr;
pub mod run;
pub mod sandbox;
pub mod tables;
pub mod template;

pub use document::{
    DocumentAccessor, DocumentError, DocumentMetadata, DocumentStatus, InMemoryDocument,
    PageContent,
};
pub use fields::extract_field;
pub use ocr::{NoOcr, OcrEngine, OcrError};
pub use run::{
    ExtractionRun, Extractor, FunctionStore, InMemoryFunctionStore, PostProcessFunction,
    ResultPayload, RunStatus, TableResult,
};
pub use sandbox::{SandboxError, SandboxOutcome};
pub use tables::{ExtractedTable, extract_tables};
pub use template::{Anchor, Template, TemplateField};

// Re-export the core vocabulary so hosts only need this crate.
pub use pdfstencil_core::{
    BBox, Char, ColumnSpec, Configuration, FieldSpec, FieldType, Line, PageIndex, PageRule, Rect,
    ScaleFactors, SchemaError, TableSettings, TableSpec, resolve_page, validate_value,
};
