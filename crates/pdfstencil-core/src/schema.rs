//! Extraction configuration schema.
//!
//! A configuration names the fields and tables an extraction run should
//! produce, with optional per-field validation constraints. Templates say
//! where data lives on the page; configurations say what the output must
//! look like.

use std::collections::HashSet;
use std::fmt;

use regex::Regex;

/// Data type expected for a field or column value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum FieldType {
    #[default]
    Text,
    Number,
    Float,
    Date,
}

/// A scalar field the configuration expects.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FieldSpec {
    pub name: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub field_type: FieldType,
    #[cfg_attr(feature = "serde", serde(default))]
    pub required: bool,
    #[cfg_attr(feature = "serde", serde(default))]
    pub min_length: Option<usize>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub max_length: Option<usize>,
    /// Regex the extracted value must match, when present.
    #[cfg_attr(feature = "serde", serde(default))]
    pub pattern: Option<String>,
    /// Name of a post-process function to apply to the value.
    #[cfg_attr(feature = "serde", serde(default))]
    pub post_process: Option<String>,
}

/// A column within an expected table.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ColumnSpec {
    pub name: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub data_type: FieldType,
    #[cfg_attr(feature = "serde", serde(default))]
    pub required: bool,
    #[cfg_attr(feature = "serde", serde(default))]
    pub pattern: Option<String>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub post_process: Option<String>,
}

/// A table the configuration expects.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TableSpec {
    pub name: String,
    /// When true, the first extracted row is treated as the header.
    #[cfg_attr(feature = "serde", serde(default))]
    pub has_header: bool,
    #[cfg_attr(feature = "serde", serde(default))]
    pub columns: Vec<ColumnSpec>,
}

/// The full expected-output description for an extraction run.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Configuration {
    pub name: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub fields: Vec<FieldSpec>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub tables: Vec<TableSpec>,
}

/// Configuration validation failure.
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaError {
    /// Two entries in the same scope share a name (case-insensitive).
    DuplicateName { scope: &'static str, name: String },
    /// A validation pattern failed to compile.
    InvalidPattern { name: String, pattern: String, message: String },
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaError::DuplicateName { scope, name } => {
                write!(f, "duplicate {scope} name: {name}")
            }
            SchemaError::InvalidPattern {
                name,
                pattern,
                message,
            } => {
                write!(f, "invalid pattern for {name}: {pattern}: {message}")
            }
        }
    }
}

impl std::error::Error for SchemaError {}

impl Configuration {
    /// Check name uniqueness and pattern validity.
    ///
    /// Field names must be unique among fields, table names among tables,
    /// and column names within their table, all case-insensitively. Every
    /// declared pattern must compile.
    pub fn validate(&self) -> Result<(), SchemaError> {
        check_unique("field", self.fields.iter().map(|f| f.name.as_str()))?;
        check_unique("table", self.tables.iter().map(|t| t.name.as_str()))?;
        for table in &self.tables {
            check_unique("column", table.columns.iter().map(|c| c.name.as_str()))?;
        }

        for field in &self.fields {
            check_pattern(&field.name, field.pattern.as_deref())?;
        }
        for table in &self.tables {
            for column in &table.columns {
                check_pattern(&column.name, column.pattern.as_deref())?;
            }
        }
        Ok(())
    }
}

fn check_unique<'a>(scope: &'static str, names: impl Iterator<Item = &'a str>) -> Result<(), SchemaError> {
    let mut seen = HashSet::new();
    for name in names {
        if !seen.insert(name.to_lowercase()) {
            return Err(SchemaError::DuplicateName {
                scope,
                name: name.to_string(),
            });
        }
    }
    Ok(())
}

fn check_pattern(name: &str, pattern: Option<&str>) -> Result<(), SchemaError> {
    if let Some(pattern) = pattern {
        Regex::new(pattern).map_err(|e| SchemaError::InvalidPattern {
            name: name.to_string(),
            pattern: pattern.to_string(),
            message: e.to_string(),
        })?;
    }
    Ok(())
}

/// Apply a field spec's constraints to an extracted value.
///
/// Returns human-readable notes for each violated constraint; an empty
/// vec means the value passed. Violations never fail a run.
pub fn validate_value(spec: &FieldSpec, value: &str) -> Vec<String> {
    let mut notes = Vec::new();

    if value.is_empty() {
        if spec.required {
            notes.push(format!("{}: required field is empty", spec.name));
        }
        return notes;
    }

    if let Some(min) = spec.min_length {
        if value.chars().count() < min {
            notes.push(format!("{}: shorter than minimum length {min}", spec.name));
        }
    }
    if let Some(max) = spec.max_length {
        if value.chars().count() > max {
            notes.push(format!("{}: longer than maximum length {max}", spec.name));
        }
    }
    if let Some(pattern) = &spec.pattern {
        // validate() guarantees the pattern compiles; a bad one here just
        // skips the check.
        if let Ok(re) = Regex::new(pattern) {
            if !re.is_match(value) {
                notes.push(format!("{}: does not match pattern {pattern}", spec.name));
            }
        }
    }
    notes
}
