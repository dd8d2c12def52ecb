//! End-to-end extraction scenarios.

mod common;

use common::{blank_page, chars_at, document, field, grid_lines, page, template};
use pdfstencil::{
    Configuration, Extractor, FieldSpec, InMemoryFunctionStore, PageRule, PostProcessFunction,
    RunStatus, TableSpec,
};

fn empty_config() -> Configuration {
    Configuration {
        name: "test".into(),
        fields: vec![],
        tables: vec![],
    }
}

#[test]
fn scalar_field_on_identity_scaled_page() {
    let doc = document(vec![page(chars_at("INV-2023-001", 100.0, 50.0), vec![])]);
    let t = template(vec![field("invoice_number", 1, 95.0, 45.0, 120.0, 25.0)]);
    let store = InMemoryFunctionStore::default();

    let run = Extractor::new(&store).run(&t, &empty_config(), &doc);
    assert_eq!(run.status, RunStatus::Completed);
    assert_eq!(run.results.unwrap().fields["invoice_number"], "INV-2023-001");
}

#[test]
fn scalar_field_scales_to_larger_page() {
    // A4-to-double: the target page is 2x the reference in both
    // dimensions, and the text sits at the doubled position.
    let mut target = page(chars_at("TOTAL", 200.0, 100.0), vec![]);
    target.width = 1224.0;
    target.height = 1584.0;
    let doc = document(vec![target]);
    let t = template(vec![field("total", 1, 95.0, 45.0, 80.0, 20.0)]);
    let store = InMemoryFunctionStore::default();

    let run = Extractor::new(&store).run(&t, &empty_config(), &doc);
    assert_eq!(run.results.unwrap().fields["total"], "TOTAL");
}

#[test]
fn last_page_rule_follows_a_grown_document() {
    // Authored against a 2-page reference with the field on the last
    // page; the target grew to 3 pages, so the field shifts to page 3.
    let doc = document(vec![
        blank_page(),
        blank_page(),
        page(chars_at("GRAND-TOTAL", 100.0, 50.0), vec![]),
    ]);
    let mut t = template(vec![field("grand_total", 2, 95.0, 45.0, 120.0, 25.0)]);
    t.reference_page_count = 2;
    t.page_rules = vec![PageRule::Last { delta: 0 }];
    let store = InMemoryFunctionStore::default();

    let run = Extractor::new(&store).run(&t, &empty_config(), &doc);
    assert_eq!(run.results.unwrap().fields["grand_total"], "GRAND-TOTAL");
}

#[test]
fn field_past_document_end_is_empty_and_run_completes() {
    let doc = document(vec![blank_page(); 5]);
    let t = template(vec![field("missing", 9, 0.0, 0.0, 100.0, 100.0)]);
    let store = InMemoryFunctionStore::default();

    let run = Extractor::new(&store).run(&t, &empty_config(), &doc);
    assert_eq!(run.status, RunStatus::Completed);
    assert_eq!(run.results.unwrap().fields["missing"], "");
}

#[test]
fn sandbox_post_process_uppercases_value() {
    let doc = document(vec![page(chars_at("abc", 100.0, 50.0), vec![])]);
    let mut f = field("code", 1, 95.0, 45.0, 60.0, 25.0);
    f.post_process = Some("shout".into());
    let t = template(vec![f]);
    let store = InMemoryFunctionStore::new(vec![PostProcessFunction {
        name: "shout".into(),
        description: Some("uppercase the value".into()),
        source: "result = input_text.upper()".into(),
    }]);

    let run = Extractor::new(&store).run(&t, &empty_config(), &doc);
    assert_eq!(run.results.unwrap().fields["code"], "ABC");
}

#[test]
fn table_with_header_lands_in_payload() {
    let mut chars = chars_at("Item", 60.0, 110.0);
    chars.extend(chars_at("Price", 210.0, 110.0));
    chars.extend(chars_at("Widget", 60.0, 160.0));
    chars.extend(chars_at("9.99", 210.0, 160.0));
    chars.extend(chars_at("Gadget", 60.0, 210.0));
    chars.extend(chars_at("12.00", 210.0, 210.0));
    let doc = document(vec![page(chars, grid_lines(3, 2))]);

    let mut items = field("items", 1, 40.0, 90.0, 320.0, 170.0);
    items.is_table = true;
    let t = template(vec![items]);
    let config = Configuration {
        name: "test".into(),
        fields: vec![],
        tables: vec![TableSpec {
            name: "items".into(),
            has_header: true,
            columns: vec![],
        }],
    };
    let store = InMemoryFunctionStore::default();

    let run = Extractor::new(&store).run(&t, &config, &doc);
    let payload = run.results.unwrap();
    assert_eq!(payload.tables.len(), 1);
    assert_eq!(payload.tables[0].header, vec!["Item", "Price"]);
    assert_eq!(
        payload.tables[0].rows,
        vec![vec!["Widget", "9.99"], vec!["Gadget", "12.00"]]
    );
}

#[test]
fn repeated_runs_yield_identical_payloads() {
    let mut chars = chars_at("A", 60.0, 110.0);
    chars.extend(chars_at("B", 210.0, 110.0));
    chars.extend(chars_at("C", 60.0, 160.0));
    chars.extend(chars_at("D", 210.0, 160.0));
    let doc = document(vec![page(chars, grid_lines(2, 2))]);

    let mut items = field("items", 1, 40.0, 90.0, 320.0, 120.0);
    items.is_table = true;
    let t = template(vec![items]);
    let config = Configuration {
        name: "test".into(),
        fields: vec![],
        tables: vec![TableSpec {
            name: "items".into(),
            has_header: false,
            columns: vec![],
        }],
    };
    let store = InMemoryFunctionStore::default();

    let first = Extractor::new(&store).run(&t, &config, &doc).results.unwrap();
    let second = Extractor::new(&store).run(&t, &config, &doc).results.unwrap();
    assert_eq!(first, second);
}

#[test]
fn required_field_validation_produces_note() {
    let doc = document(vec![blank_page()]);
    let t = template(vec![field("invoice_number", 1, 95.0, 45.0, 120.0, 25.0)]);
    let config = Configuration {
        name: "test".into(),
        fields: vec![FieldSpec {
            name: "invoice_number".into(),
            field_type: Default::default(),
            required: true,
            min_length: None,
            max_length: None,
            pattern: None,
            post_process: None,
        }],
        tables: vec![],
    };
    let store = InMemoryFunctionStore::default();

    let run = Extractor::new(&store).run(&t, &config, &doc);
    assert_eq!(run.status, RunStatus::Completed);
    assert!(run.notes.iter().any(|n| n.contains("required")));
}
