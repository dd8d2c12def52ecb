//! Extraction templates.
//!
//! A template records, for one known document layout, where each piece of
//! data lives: field boxes authored against a reference page size, page
//! rules for documents whose page count drifts from the reference, and an
//! optional anchor string that confirms the template matches a document.

use pdfstencil_core::{
    BBox, PageRule, Rect, SettingValue, TableSettings, TableSettingsError, resolve_page,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::document::DocumentAccessor;

/// Unique-identifier confirmation for template matching.
///
/// The anchor text must appear somewhere on the resolved anchor page of a
/// target document for the template to be considered applicable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Anchor {
    pub text: String,
    /// 1-based page number the anchor was authored on.
    pub page: i64,
}

/// One field box within a template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateField {
    pub name: String,
    /// Preferred output name; falls back to `name` when empty.
    #[serde(default)]
    pub custom_name: Option<String>,
    /// 1-based page number the box was authored on.
    pub page: i64,
    /// Box origin and size in reference-page coordinates.
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    /// Route this field's region through OCR instead of the text layer.
    #[serde(default)]
    pub ocr_required: bool,
    /// Name of a post-process function to run on the extracted value.
    #[serde(default)]
    pub post_process: Option<String>,
    /// When true, the box marks a table region rather than a scalar field.
    #[serde(default)]
    pub is_table: bool,
    /// Loosely-typed table-settings overrides, applied by name.
    #[serde(default)]
    pub table_settings: serde_json::Map<String, Value>,
    /// Cell rectangles the author drew by hand; their boundaries become
    /// explicit ruling lines.
    #[serde(default)]
    pub drawn_cells: Vec<Rect>,
    /// Extra ruling lines as point pairs, injected synthetically before
    /// structure detection.
    #[serde(default)]
    pub line_points: Vec<[[f64; 2]; 2]>,
}

impl TemplateField {
    /// The name this field's value is reported under.
    pub fn output_name(&self) -> &str {
        match &self.custom_name {
            Some(name) if !name.is_empty() => name,
            _ => &self.name,
        }
    }

    /// The authored box as a bounding box in reference coordinates.
    pub fn bbox(&self) -> BBox {
        BBox::from_origin_size(self.x, self.y, self.width, self.height)
    }

    /// Build table settings from defaults, the override map, and drawn
    /// cells.
    ///
    /// Drawn-cell boundaries extend the explicit line lists; when the
    /// override map does not choose strategies itself, drawn cells also
    /// switch both axes to the explicit strategy.
    pub fn table_settings(&self) -> Result<TableSettings, TableSettingsError> {
        let mut settings = TableSettings::default();
        for (name, value) in &self.table_settings {
            let value = json_to_setting(name, value)?;
            settings.apply_override(name, &value)?;
        }

        if !self.drawn_cells.is_empty() {
            for cell in &self.drawn_cells {
                push_coord(&mut settings.explicit_vertical_lines, cell.x0);
                push_coord(&mut settings.explicit_vertical_lines, cell.x1);
                push_coord(&mut settings.explicit_horizontal_lines, cell.top);
                push_coord(&mut settings.explicit_horizontal_lines, cell.bottom);
            }
            if !self.table_settings.contains_key("vertical_strategy") {
                settings.vertical_strategy = pdfstencil_core::Strategy::Explicit;
            }
            if !self.table_settings.contains_key("horizontal_strategy") {
                settings.horizontal_strategy = pdfstencil_core::Strategy::Explicit;
            }
        }

        Ok(settings)
    }
}

fn push_coord(coords: &mut Vec<f64>, v: f64) {
    if !coords.iter().any(|&c| (c - v).abs() < 1e-9) {
        coords.push(v);
    }
}

fn json_to_setting(name: &str, value: &Value) -> Result<SettingValue, TableSettingsError> {
    match value {
        Value::Number(n) => n
            .as_f64()
            .map(SettingValue::Number)
            .ok_or_else(|| invalid(name, "number")),
        Value::String(s) => Ok(SettingValue::Text(s.clone())),
        Value::Array(items) => {
            let mut numbers = Vec::with_capacity(items.len());
            for item in items {
                let n = item.as_f64().ok_or_else(|| invalid(name, "list of numbers"))?;
                numbers.push(n);
            }
            Ok(SettingValue::Numbers(numbers))
        }
        _ => Err(invalid(name, "number, string, or list of numbers")),
    }
}

fn invalid(name: &str, expected: &'static str) -> TableSettingsError {
    TableSettingsError::InvalidValue {
        name: name.to_string(),
        expected,
    }
}

/// A complete extraction template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Template {
    pub name: String,
    #[serde(default)]
    pub version: Option<String>,
    /// Reference page dimensions the field boxes were authored against.
    pub reference_width: f64,
    pub reference_height: f64,
    /// Page count of the reference document, for last-page rules.
    pub reference_page_count: usize,
    #[serde(default)]
    pub anchor: Option<Anchor>,
    #[serde(default)]
    pub page_rules: Vec<PageRule>,
    #[serde(default)]
    pub fields: Vec<TemplateField>,
}

impl Template {
    /// Whether this template's anchor is confirmed by the document.
    ///
    /// Templates without an anchor match any document. An anchor whose
    /// page cannot be resolved in the target does not match.
    pub fn matches(&self, doc: &dyn DocumentAccessor) -> bool {
        let Some(anchor) = &self.anchor else {
            return true;
        };
        let Some(index) = resolve_page(
            anchor.page,
            &self.page_rules,
            self.reference_page_count,
            doc.page_count(),
        ) else {
            return false;
        };
        let Ok(page) = doc.page(index) else {
            return false;
        };
        let region = BBox::new(0.0, 0.0, page.width, page.height);
        match doc.text_in_region(index, &region) {
            Ok(text) => text.contains(&anchor.text),
            Err(_) => false,
        }
    }
}
