//! Builtin string-processing functions available inside the sandbox.
//!
//! Each builtin takes the working text and returns the transformed text.
//! Extraction-style builtins return their matches joined by single spaces.

use std::sync::LazyLock;

use regex::Regex;

/// Signature of a builtin function.
pub type Builtin = fn(&str) -> String;

static UPPERCASE_WORDS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b[A-Z]{2,}\b").unwrap());
static INTEGERS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+").unwrap());
static CAPITALIZED_WORDS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b[A-Z][a-z]+\b").unwrap());
static FLOATS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+\.\d+").unwrap());
static SPECIAL_CHARS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^A-Za-z0-9\s]").unwrap());
static WHITESPACE_RUNS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

fn join_matches(re: &Regex, text: &str) -> String {
    re.find_iter(text)
        .map(|m| m.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

fn extract_uppercase_words(text: &str) -> String {
    join_matches(&UPPERCASE_WORDS, text)
}

fn extract_integers(text: &str) -> String {
    join_matches(&INTEGERS, text)
}

fn extract_capitalized_words(text: &str) -> String {
    join_matches(&CAPITALIZED_WORDS, text)
}

fn extract_float_values(text: &str) -> String {
    join_matches(&FLOATS, text)
}

fn extract_alphanumeric_words(text: &str) -> String {
    text.split_whitespace()
        .filter(|w| {
            w.chars().all(|c| c.is_ascii_alphanumeric())
                && w.chars().any(|c| c.is_ascii_alphabetic())
                && w.chars().any(|c| c.is_ascii_digit())
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn remove_special_characters(text: &str) -> String {
    SPECIAL_CHARS.replace_all(text, "").into_owned()
}

fn remove_punctuation(text: &str) -> String {
    text.chars().filter(|c| !c.is_ascii_punctuation()).collect()
}

fn normalize_spaces(text: &str) -> String {
    WHITESPACE_RUNS.replace_all(text.trim(), " ").into_owned()
}

fn convert_to_lowercase(text: &str) -> String {
    text.to_lowercase()
}

fn convert_to_uppercase(text: &str) -> String {
    text.to_uppercase()
}

fn convert_to_title_case(text: &str) -> String {
    text.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => {
                    first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
                }
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Look up a builtin by name.
pub fn builtin(name: &str) -> Option<Builtin> {
    let f: Builtin = match name {
        "extract_uppercase_words" => extract_uppercase_words,
        "extract_integers" => extract_integers,
        "extract_capitalized_words" => extract_capitalized_words,
        "extract_float_values" => extract_float_values,
        "extract_alphanumeric_words" => extract_alphanumeric_words,
        "remove_special_characters" => remove_special_characters,
        "remove_punctuation" => remove_punctuation,
        "normalize_spaces" => normalize_spaces,
        "convert_to_lowercase" => convert_to_lowercase,
        "convert_to_uppercase" => convert_to_uppercase,
        "convert_to_title_case" => convert_to_title_case,
        _ => return None,
    };
    Some(f)
}

/// Names of all builtins, for diagnostics.
pub fn builtin_names() -> &'static [&'static str] {
    &[
        "extract_uppercase_words",
        "extract_integers",
        "extract_capitalized_words",
        "extract_float_values",
        "extract_alphanumeric_words",
        "remove_special_characters",
        "remove_punctuation",
        "normalize_spaces",
        "convert_to_lowercase",
        "convert_to_uppercase",
        "convert_to_title_case",
    ]
}
