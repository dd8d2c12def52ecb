//! Backend-independent primitives for template-driven PDF data extraction.
//!
//! This crate holds the pure data types and algorithms: geometry and scale
//! normalization, page-offset resolution, characters / words / shapes /
//! edges, the table-structure detector, and the extraction configuration
//! schema. It knows nothing about PDF parsing, documents, or templates;
//! the `pdfstencil` crate layers those on top.

pub mod edges;
pub mod geometry;
pub mod page_map;
pub mod schema;
pub mod shapes;
pub mod table;
pub mod text;
pub mod words;

pub use edges::{Edge, EdgeSource, derive_edges, edge_from_line, edges_from_rect};
pub use geometry::{BBox, Orientation, ScaleFactors};
pub use page_map::{PageIndex, PageRule, resolve_page};
pub use schema::{
    ColumnSpec, Configuration, FieldSpec, FieldType, SchemaError, TableSpec, validate_value,
};
pub use shapes::{Line, Rect};
pub use table::{
    GridCell, SettingValue, Strategy, TableFinder, TableGrid, TableSettings, TableSettingsError,
    fill_cell_text, snap_edges, words_to_edges,
};
pub use text::Char;
pub use words::{ROW_Y_TOLERANCE, Word, WordExtractor, WordOptions, group_words_into_rows};
