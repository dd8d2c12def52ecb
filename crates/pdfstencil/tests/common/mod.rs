//! Shared builders for integration tests.

use pdfstencil::{BBox, Char, InMemoryDocument, Line, PageContent, Template, TemplateField};

/// Lay out `text` as fixed-width characters starting at (x, y).
pub fn chars_at(text: &str, x: f64, y: f64) -> Vec<Char> {
    text.chars()
        .enumerate()
        .map(|(i, c)| {
            Char::new(
                c.to_string(),
                BBox::new(x + i as f64 * 6.0, y, x + 6.0 + i as f64 * 6.0, y + 10.0),
            )
        })
        .collect()
}

/// A letter-sized page with the given content.
pub fn page(chars: Vec<Char>, lines: Vec<Line>) -> PageContent {
    PageContent {
        width: 612.0,
        height: 792.0,
        chars,
        lines,
        rects: vec![],
    }
}

pub fn blank_page() -> PageContent {
    page(vec![], vec![])
}

pub fn document(pages: Vec<PageContent>) -> InMemoryDocument {
    InMemoryDocument::new(pages)
}

/// Painted rulings for a rows x cols grid of 150x50pt cells at (50, 100).
pub fn grid_lines(rows: usize, cols: usize) -> Vec<Line> {
    let x0 = 50.0;
    let y0 = 100.0;
    let x1 = x0 + cols as f64 * 150.0;
    let y1 = y0 + rows as f64 * 50.0;
    let mut lines = Vec::new();
    for r in 0..=rows {
        let y = y0 + r as f64 * 50.0;
        lines.push(Line::from_points((x0, y), (x1, y), 1.0));
    }
    for c in 0..=cols {
        let x = x0 + c as f64 * 150.0;
        lines.push(Line::from_points((x, y0), (x, y1), 1.0));
    }
    lines
}

/// A single-page-reference template over the standard letter page.
pub fn template(fields: Vec<TemplateField>) -> Template {
    Template {
        name: "test".into(),
        version: None,
        reference_width: 612.0,
        reference_height: 792.0,
        reference_page_count: 1,
        anchor: None,
        page_rules: vec![],
        fields,
    }
}

pub fn field(name: &str, page: i64, x: f64, y: f64, width: f64, height: f64) -> TemplateField {
    TemplateField {
        name: name.into(),
        custom_name: None,
        page,
        x,
        y,
        width,
        height,
        ocr_required: false,
        post_process: None,
        is_table: false,
        table_settings: serde_json::Map::new(),
        drawn_cells: vec![],
        line_points: vec![],
    }
}
