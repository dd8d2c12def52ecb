//! Extraction runs.
//!
//! [`Extractor::run`] drives the full flow: scalar fields, post-processing
//! through the sandbox, table extraction matched against the
//! configuration, and the result payload. Individual fields and tables are
//! isolated — one failing resolves to empty data with a note, the run
//! carries on. A run only fails outright when the document itself is
//! unusable.

use std::collections::BTreeMap;
use std::time::{SystemTime, UNIX_EPOCH};

use pdfstencil_core::{Configuration, FieldSpec, TableSpec, validate_value};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::document::{DocumentAccessor, DocumentError};
use crate::fields::extract_field;
use crate::ocr::OcrEngine;
use crate::sandbox;
use crate::tables::extract_tables;
use crate::template::Template;

/// A stored post-process function.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostProcessFunction {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub source: String,
}

/// Read-only lookup of stored post-process functions.
pub trait FunctionStore {
    fn get(&self, name: &str) -> Option<&PostProcessFunction>;
}

/// A function store backed by a plain list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InMemoryFunctionStore {
    functions: Vec<PostProcessFunction>,
}

impl InMemoryFunctionStore {
    pub fn new(functions: Vec<PostProcessFunction>) -> Self {
        Self { functions }
    }
}

impl FunctionStore for InMemoryFunctionStore {
    fn get(&self, name: &str) -> Option<&PostProcessFunction> {
        self.functions.iter().find(|f| f.name == name)
    }
}

/// Lifecycle state of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    #[default]
    Pending,
    Running,
    Completed,
    Failed,
}

/// One table in the result payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableResult {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// The extraction result payload.
///
/// Serializes as `{"fields": {name: value}, "tables": [{"header": [...],
/// "rows": [[...]]}]}` — the stable external contract.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ResultPayload {
    pub fields: BTreeMap<String, String>,
    pub tables: Vec<TableResult>,
}

/// A completed or failed extraction run. Immutable once terminal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionRun {
    pub status: RunStatus,
    /// Unix seconds.
    pub started_at: Option<u64>,
    pub completed_at: Option<u64>,
    pub results: Option<ResultPayload>,
    pub error_message: Option<String>,
    /// Non-fatal findings: validation notes, missing functions, sandbox
    /// failures.
    #[serde(default)]
    pub notes: Vec<String>,
}

fn now_unix() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

fn failed_run(started_at: Option<u64>, error_message: String) -> ExtractionRun {
    ExtractionRun {
        status: RunStatus::Failed,
        started_at,
        completed_at: Some(now_unix()),
        results: None,
        error_message: Some(error_message),
        notes: Vec::new(),
    }
}

/// Drives extraction runs.
pub struct Extractor<'a> {
    functions: &'a dyn FunctionStore,
    ocr: Option<&'a dyn OcrEngine>,
}

impl<'a> Extractor<'a> {
    pub fn new(functions: &'a dyn FunctionStore) -> Self {
        Self {
            functions,
            ocr: None,
        }
    }

    pub fn with_ocr(mut self, ocr: &'a dyn OcrEngine) -> Self {
        self.ocr = Some(ocr);
        self
    }

    /// Run a template + configuration against a document.
    pub fn run(
        &self,
        template: &Template,
        configuration: &Configuration,
        doc: &dyn DocumentAccessor,
    ) -> ExtractionRun {
        let started_at = Some(now_unix());

        if doc.page_count() == 0 {
            return failed_run(started_at, "document has no pages".to_string());
        }

        let mut notes = Vec::new();
        if !template.matches(doc) {
            notes.push(format!("template anchor not confirmed for {}", template.name));
        }

        let mut payload = ResultPayload::default();

        for field in template.fields.iter().filter(|f| !f.is_table) {
            let name = field.output_name().to_string();
            let mut value = match extract_field(doc, template, field, self.ocr) {
                Ok(value) => value,
                Err(e) => return failed_run(started_at, e.to_string()),
            };

            if let Some(func_name) = &field.post_process {
                value = self.post_process(&name, func_name, value, &mut notes);
            }

            if let Some(spec) = find_field_spec(configuration, &name) {
                if let Some(func_name) = &spec.post_process {
                    value = self.post_process(&name, func_name, value, &mut notes);
                }
                notes.extend(validate_value(spec, &value));
            }

            if payload.fields.insert(name.clone(), value).is_some() {
                warn!(field = %name, "duplicate output name, keeping last value");
            }
        }

        for table_spec in &configuration.tables {
            if let Err(e) =
                self.extract_spec_tables(template, table_spec, doc, &mut payload, &mut notes)
            {
                return failed_run(started_at, e.to_string());
            }
        }

        ExtractionRun {
            status: RunStatus::Completed,
            started_at,
            completed_at: Some(now_unix()),
            results: Some(payload),
            error_message: None,
            notes,
        }
    }

    fn extract_spec_tables(
        &self,
        template: &Template,
        spec: &TableSpec,
        doc: &dyn DocumentAccessor,
        payload: &mut ResultPayload,
        notes: &mut Vec<String>,
    ) -> Result<(), DocumentError> {
        let matching_fields: Vec<_> = template
            .fields
            .iter()
            .filter(|f| f.is_table && f.output_name().eq_ignore_ascii_case(&spec.name))
            .collect();
        if matching_fields.is_empty() {
            debug!(table = %spec.name, "no table-mode field matches this table spec");
            return Ok(());
        }

        for field in matching_fields {
            for table in extract_tables(doc, template, field)? {
                let mut rows = table.rows;
                let header = if spec.has_header && !rows.is_empty() {
                    rows.remove(0)
                } else {
                    Vec::new()
                };

                for (col_index, column) in spec.columns.iter().enumerate() {
                    let Some(func_name) = &column.post_process else {
                        continue;
                    };
                    let index = header
                        .iter()
                        .position(|h| h.eq_ignore_ascii_case(&column.name))
                        .unwrap_or(col_index);
                    for row in &mut rows {
                        if let Some(cell) = row.get_mut(index) {
                            let processed = self.post_process(
                                &format!("{}.{}", spec.name, column.name),
                                func_name,
                                std::mem::take(cell),
                                notes,
                            );
                            *cell = processed;
                        }
                    }
                }

                payload.tables.push(TableResult { header, rows });
            }
        }
        Ok(())
    }

    /// Apply a stored function to a value, falling back to the raw value
    /// (with a note) on any failure.
    fn post_process(
        &self,
        target: &str,
        func_name: &str,
        value: String,
        notes: &mut Vec<String>,
    ) -> String {
        let Some(function) = self.functions.get(func_name) else {
            notes.push(format!("{target}: post-process function not found: {func_name}"));
            return value;
        };
        let outcome = sandbox::execute(&function.source, &value);
        if outcome.success {
            match outcome.result {
                Some(result) => result,
                None => {
                    notes.push(format!("{target}: {func_name} did not set result"));
                    value
                }
            }
        } else {
            let error = outcome.error.unwrap_or_else(|| "unknown error".to_string());
            debug!(target, function = func_name, %error, "post-process failed");
            notes.push(format!("{target}: {func_name} failed: {error}"));
            value
        }
    }
}

fn find_field_spec<'c>(configuration: &'c Configuration, name: &str) -> Option<&'c FieldSpec> {
    configuration
        .fields
        .iter()
        .find(|f| f.name.eq_ignore_ascii_case(name))
}
