use std::fs;
use std::path::Path;

use pdfstencil::{
    Configuration, Extractor, InMemoryDocument, InMemoryFunctionStore, PostProcessFunction,
    ResultPayload, RunStatus, Template,
};
use serde::de::DeserializeOwned;

use crate::cli::OutputFormat;

pub fn run(
    template: &Path,
    config: &Path,
    document: &Path,
    functions: Option<&Path>,
    format: OutputFormat,
    output: Option<&Path>,
) -> Result<(), i32> {
    let template: Template = read_json(template, "template")?;
    let configuration: Configuration = read_json(config, "configuration")?;
    let document: InMemoryDocument = read_json(document, "document")?;

    if let Err(e) = configuration.validate() {
        eprintln!("invalid configuration: {e}");
        return Err(1);
    }

    let store = match functions {
        Some(path) => {
            let functions: Vec<PostProcessFunction> = read_json(path, "functions")?;
            InMemoryFunctionStore::new(functions)
        }
        None => InMemoryFunctionStore::default(),
    };

    let run = Extractor::new(&store).run(&template, &configuration, &document);
    for note in &run.notes {
        eprintln!("note: {note}");
    }
    if run.status == RunStatus::Failed {
        let message = run.error_message.as_deref().unwrap_or("extraction failed");
        eprintln!("run failed: {message}");
        return Err(1);
    }

    let payload = run.results.unwrap_or_default();
    let rendered = match format {
        OutputFormat::Json => {
            let mut json = serde_json::to_string_pretty(&payload).map_err(|e| {
                eprintln!("failed to serialize results: {e}");
                1
            })?;
            json.push('\n');
            json
        }
        OutputFormat::Csv => render_csv(&payload),
    };

    match output {
        Some(path) => fs::write(path, rendered).map_err(|e| {
            eprintln!("failed to write {}: {e}", path.display());
            1
        }),
        None => {
            print!("{rendered}");
            Ok(())
        }
    }
}

fn read_json<T: DeserializeOwned>(path: &Path, what: &str) -> Result<T, i32> {
    let text = fs::read_to_string(path).map_err(|e| {
        eprintln!("failed to read {what} {}: {e}", path.display());
        1
    })?;
    serde_json::from_str(&text).map_err(|e| {
        eprintln!("invalid {what} {}: {e}", path.display());
        1
    })
}

/// Render the payload as CSV: `Field,Value` rows, a blank line, then a
/// `Table N` block per table (header row, data rows, blank line).
fn render_csv(payload: &ResultPayload) -> String {
    let mut out = String::new();

    out.push_str("Field,Value\n");
    for (name, value) in &payload.fields {
        out.push_str(&csv_row(&[name.as_str(), value.as_str()]));
    }
    out.push('\n');

    for (i, table) in payload.tables.iter().enumerate() {
        out.push_str(&format!("Table {}\n", i + 1));
        if !table.header.is_empty() {
            let cells: Vec<&str> = table.header.iter().map(String::as_str).collect();
            out.push_str(&csv_row(&cells));
        }
        for row in &table.rows {
            let cells: Vec<&str> = row.iter().map(String::as_str).collect();
            out.push_str(&csv_row(&cells));
        }
        out.push('\n');
    }

    out
}

fn csv_row(cells: &[&str]) -> String {
    let mut row = cells.iter().map(|c| csv_cell(c)).collect::<Vec<_>>().join(",");
    row.push('\n');
    row
}

fn csv_cell(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pdfstencil::TableResult;
    use std::collections::BTreeMap;

    #[test]
    fn test_csv_cell_quoting() {
        assert_eq!(csv_cell("plain"), "plain");
        assert_eq!(csv_cell("a,b"), "\"a,b\"");
        assert_eq!(csv_cell("say \"hi\""), "\"say \"\"hi\"\"\"");
    }

    #[test]
    fn test_render_csv_layout() {
        let payload = ResultPayload {
            fields: BTreeMap::from([
                ("invoice_number".to_string(), "INV-1".to_string()),
                ("total".to_string(), "9.99".to_string()),
            ]),
            tables: vec![TableResult {
                header: vec!["Item".into(), "Price".into()],
                rows: vec![vec!["Widget".into(), "9.99".into()]],
            }],
        };
        let csv = render_csv(&payload);
        assert_eq!(
            csv,
            "Field,Value\ninvoice_number,INV-1\ntotal,9.99\n\nTable 1\nItem,Price\nWidget,9.99\n\n"
        );
    }
}
