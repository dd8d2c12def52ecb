//! Integration tests for the `check-function` subcommand.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;

fn cmd() -> Command {
    Command::cargo_bin("pdfstencil").unwrap()
}

#[test]
fn accepts_clean_source() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("clean.txt");
    fs::write(&file, "result = input_text.strip().upper()\n").unwrap();

    cmd()
        .arg("check-function")
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::contains("OK"));
}

#[test]
fn rejects_denylisted_source() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("evil.txt");
    fs::write(&file, "import os\nresult = input_text\n").unwrap();

    cmd()
        .arg("check-function")
        .arg(&file)
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("forbidden pattern"));
}

#[test]
fn rejects_syntax_errors() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("broken.txt");
    fs::write(&file, "result = = input_text\n").unwrap();

    cmd()
        .arg("check-function")
        .arg(&file)
        .assert()
        .failure()
        .stderr(predicate::str::contains("syntax error"));
}

#[test]
fn reports_missing_file() {
    cmd()
        .arg("check-function")
        .arg("/nonexistent/source.txt")
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to read"));
}
