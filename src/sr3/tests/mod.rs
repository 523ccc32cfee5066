//! Tests for SR3 parsing
//!
//! Fixture builders producing the export layouts seen from the machines.

pub mod extraction_tests;

use crate::config::Sr3ParserConfig;
use crate::sr3::parser::Sr3Parser;
use crate::sr3::tokens::Sr3Patterns;

/// Metadata block of a standard export, closed by the oversampling marker
pub const STANDARD_HEADER: &[&str] = &[
    "TEST DATA REPORT",
    "MACHINE: SR3-200;",
    "SPECIMEN: C-01;",
    "DATE: 2024-03-29;",
    "MAX LOAD: 5.0 tf;",
    "SPEED: 0.25 MPa/s;",
    "OPERATOR: JL;",
    "OVERSAMPLING READINGS",
];

pub fn create_test_parser() -> Sr3Parser {
    Sr3Parser::new(Sr3ParserConfig::default()).unwrap()
}

pub fn create_test_patterns() -> Sr3Patterns {
    Sr3Patterns::compile().unwrap()
}

/// Force readings 0, 100, 200, ...
pub fn force_values(count: usize) -> Vec<f64> {
    (0..count).map(|i| i as f64 * 100.0).collect()
}

/// Time readings 0.0, 0.5, 1.0, ...
pub fn time_values(count: usize) -> Vec<f64> {
    (0..count).map(|i| i as f64 * 0.5).collect()
}

/// A `;`-terminated series line
pub fn series_line(values: &[f64]) -> String {
    values.iter().map(|v| format!("{};", v)).collect()
}

/// Standard export: header, force series, then optionally a time series
pub fn create_semicolon_file(forces: &[f64], times: Option<&[f64]>) -> String {
    let mut lines: Vec<String> = STANDARD_HEADER.iter().map(|l| l.to_string()).collect();
    lines.push(series_line(forces));
    if let Some(times) = times {
        lines.push(series_line(times));
    }
    lines.push(String::new());
    lines.join("\n")
}

/// Columnar export with a short header and `count` rows joined by `separator`
pub fn create_columnar_file(separator: &str, count: usize) -> String {
    let mut lines = vec!["TEST DATA".to_string(), "Time (s) Force (kg)".to_string()];
    for (t, f) in time_values(count).iter().zip(force_values(count)) {
        lines.push(format!("{}{}{}", t, separator, f));
    }
    lines.join("\n")
}

/// Export with force and time rows joined by `separator` and no declared load
pub fn create_delimited_file(separator: &str, forces: &[f64], times: Option<&[f64]>) -> String {
    let join = |values: &[f64]| {
        values
            .iter()
            .map(|v| format!("{:.2}", v))
            .collect::<Vec<_>>()
            .join(separator)
    };
    let mut lines = vec!["TEST DATA REPORT".to_string(), "OPERATOR: JL;".to_string()];
    lines.push(join(forces));
    if let Some(times) = times {
        lines.push(join(times));
    }
    lines.resize(10, String::new());
    lines.join("\n")
}
