//! Table extraction over a template region.
//!
//! Structure and content come from two separate passes. Structure runs
//! over a throwaway copy of the page with the field's ruling hints
//! injected as synthetic lines; content re-reads words from the original,
//! untouched page clipped to each detected table. The source page is
//! never mutated.

use pdfstencil_core::{
    BBox, Edge, Line, Orientation, ROW_Y_TOLERANCE, ScaleFactors, TableFinder, TableGrid,
    WordExtractor, WordOptions, derive_edges, fill_cell_text, group_words_into_rows, resolve_page,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::document::{DocumentAccessor, DocumentError, PageContent};
use crate::template::{Template, TemplateField};

/// Stroke width assigned to injected ruling lines.
const SYNTHETIC_LINE_WIDTH: f64 = 1.0;

/// One extracted table: plain string rows plus shape metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedTable {
    pub bbox: BBox,
    pub row_count: usize,
    pub col_count: usize,
    pub rows: Vec<Vec<String>>,
}

/// Extract all tables within a table-mode field's region.
///
/// A corrupt or empty document is fatal and propagates. Field-local
/// problems — unresolvable page, out-of-range page, bad settings
/// overrides — degrade to an empty list and a warn log.
pub fn extract_tables(
    doc: &dyn DocumentAccessor,
    template: &Template,
    field: &TemplateField,
) -> Result<Vec<ExtractedTable>, DocumentError> {
    let Some(index) = resolve_page(
        field.page,
        &template.page_rules,
        template.reference_page_count,
        doc.page_count(),
    ) else {
        debug!(field = %field.output_name(), page = field.page, "table page resolved outside document");
        return Ok(Vec::new());
    };

    let page = match doc.page(index) {
        Ok(page) => page,
        Err(e @ (DocumentError::Corrupt(_) | DocumentError::Empty)) => return Err(e),
        Err(e) => {
            warn!(field = %field.output_name(), error = %e, "table page unreadable");
            return Ok(Vec::new());
        }
    };

    let scale = ScaleFactors::new(
        template.reference_width,
        template.reference_height,
        page.width,
        page.height,
    );
    let region = scale.apply(&field.bbox());

    let mut settings = match field.table_settings() {
        Ok(settings) => settings,
        Err(e) => {
            warn!(field = %field.output_name(), error = %e, "bad table settings");
            return Ok(Vec::new());
        }
    };
    // Explicit ruling coordinates are authored in reference space; move
    // them into target page space alongside the field box.
    for x in &mut settings.explicit_vertical_lines {
        *x *= scale.sx;
    }
    for y in &mut settings.explicit_horizontal_lines {
        *y *= scale.sy;
    }

    // Structure pass: clone the page, inject ruling hints, detect.
    let mut structure_page = page.clone();
    let painted_lines = structure_page.lines.len();
    for [p0, p1] in &field.line_points {
        structure_page.lines.push(Line::from_points(
            (p0[0] * scale.sx, p0[1] * scale.sy),
            (p1[0] * scale.sx, p1[1] * scale.sy),
            SYNTHETIC_LINE_WIDTH,
        ));
    }

    let edges = derive_edges(&structure_page.lines, &structure_page.rects, painted_lines);
    let edges: Vec<Edge> = edges
        .into_iter()
        .filter_map(|e| clip_edge(e, &region))
        .collect();

    let region_chars: Vec<_> = structure_page
        .chars
        .iter()
        .filter(|ch| region.contains_center(&ch.bbox))
        .cloned()
        .collect();
    let word_options = WordOptions::default();
    let region_words = WordExtractor::extract(&region_chars, &word_options);

    let grids = TableFinder::new(edges, region_words, settings).find_tables();

    // Content pass: words from the original page, clipped per table.
    Ok(grids
        .into_iter()
        .map(|grid| read_table_content(page, grid, &word_options))
        .collect())
}

fn read_table_content(page: &PageContent, mut grid: TableGrid, options: &WordOptions) -> ExtractedTable {
    let table_chars: Vec<_> = page
        .chars
        .iter()
        .filter(|ch| grid.bbox.contains_center(&ch.bbox))
        .cloned()
        .collect();
    let words = WordExtractor::extract(&table_chars, options);
    let word_rows = group_words_into_rows(&words, ROW_Y_TOLERANCE);

    let rows: Vec<Vec<String>> = if word_rows.is_empty() {
        // Fall back to the structural cells' own text.
        fill_cell_text(&mut grid, &page.chars);
        grid.rows
            .iter()
            .map(|row| {
                row.iter()
                    .map(|cell| cell.text.clone().unwrap_or_default())
                    .collect()
            })
            .collect()
    } else {
        word_rows
            .iter()
            .map(|row| row.iter().map(|w| w.text.clone()).collect())
            .collect()
    };

    ExtractedTable {
        bbox: grid.bbox,
        row_count: rows.len(),
        col_count: rows.iter().map(Vec::len).max().unwrap_or(0),
        rows,
    }
}

/// Clip an edge to a region, dropping it entirely when outside.
fn clip_edge(mut edge: Edge, region: &BBox) -> Option<Edge> {
    match edge.orientation {
        Orientation::Horizontal => {
            if edge.top < region.top || edge.top > region.bottom {
                return None;
            }
            edge.x0 = edge.x0.max(region.x0);
            edge.x1 = edge.x1.min(region.x1);
            (edge.x0 < edge.x1).then_some(edge)
        }
        Orientation::Vertical => {
            if edge.x0 < region.x0 || edge.x0 > region.x1 {
                return None;
            }
            edge.top = edge.top.max(region.top);
            edge.bottom = edge.bottom.min(region.bottom);
            (edge.top < edge.bottom).then_some(edge)
        }
        Orientation::Diagonal => None,
    }
}
