//! Tests for the series extraction strategies

use super::*;
use crate::sr3::extraction::{
    ExtractionTrace, Sr3Format, choose_delimiter, detect_column_roles, extract_columnar,
    extract_delimited_series, extract_semicolon_series,
};
use crate::sr3::tokens::Delimiter;

#[test]
fn test_semicolon_series_force_then_time() {
    let patterns = create_test_patterns();
    let config = Sr3ParserConfig::default();
    let content = create_semicolon_file(&force_values(12), Some(&time_values(12)));
    let lines: Vec<&str> = content.split('\n').collect();
    let mut trace = ExtractionTrace::default();

    let extraction =
        extract_semicolon_series(&lines, STANDARD_HEADER.len(), &patterns, &config, &mut trace)
            .unwrap();
    assert_eq!(extraction.format, Sr3Format::SemicolonSeries);
    assert_eq!(extraction.force, force_values(12));
    assert_eq!(extraction.time, time_values(12));
    assert_eq!(extraction.data_lines, 2);
    assert_eq!(trace.log.len(), 2);
}

#[test]
fn test_semicolon_series_synthesises_time() {
    let patterns = create_test_patterns();
    let config = Sr3ParserConfig::default();
    let content = create_semicolon_file(&force_values(12), None);
    let lines: Vec<&str> = content.split('\n').collect();
    let mut trace = ExtractionTrace::default();

    let extraction =
        extract_semicolon_series(&lines, STANDARD_HEADER.len(), &patterns, &config, &mut trace)
            .unwrap();
    assert_eq!(extraction.format, Sr3Format::SemicolonForceOnly);
    assert_eq!(extraction.time.len(), 12);
    assert_eq!(extraction.time[0], 0.0);
    assert_eq!(extraction.time[4], 1.0);
    assert_eq!(extraction.time[11], 2.75);
}

#[test]
fn test_semicolon_series_absent_in_columnar_file() {
    let patterns = create_test_patterns();
    let content = create_columnar_file(" ", 12);
    let lines: Vec<&str> = content.split('\n').collect();
    let mut trace = ExtractionTrace::default();

    let extraction = extract_semicolon_series(
        &lines,
        2,
        &patterns,
        &Sr3ParserConfig::default(),
        &mut trace,
    );
    assert!(extraction.is_none());
}

#[test]
fn test_delimited_series_comma_rows() {
    let patterns = create_test_patterns();
    let config = Sr3ParserConfig::default();
    let times: Vec<f64> = (0..20).map(|i| i as f64 * 0.25).collect();
    let content = create_delimited_file(",", &force_values(20), Some(&times));
    let lines: Vec<&str> = content.split('\n').collect();
    let mut trace = ExtractionTrace::default();

    assert!(extract_semicolon_series(&lines, 2, &patterns, &config, &mut trace).is_none());

    let extraction = extract_delimited_series(&lines, 2, &patterns, &config, &mut trace).unwrap();
    assert_eq!(extraction.format, Sr3Format::DelimitedSeries);
    assert_eq!(extraction.separator, ",");
    assert_eq!(extraction.force, force_values(20));
    assert_eq!(extraction.time, times);
    assert_eq!(extraction.data_lines, 2);
}

#[test]
fn test_delimited_series_whitespace_force_only() {
    let patterns = create_test_patterns();
    let config = Sr3ParserConfig::default();
    let content = create_delimited_file("\t", &force_values(15), None);
    let lines: Vec<&str> = content.split('\n').collect();
    let mut trace = ExtractionTrace::default();

    let extraction = extract_delimited_series(&lines, 2, &patterns, &config, &mut trace).unwrap();
    assert_eq!(extraction.format, Sr3Format::DelimitedForceOnly);
    assert_eq!(extraction.separator, "whitespace");
    assert_eq!(extraction.force.len(), 15);
    assert_eq!(extraction.time[4], 1.0);
}

#[test]
fn test_delimited_series_ignores_short_lines() {
    let patterns = create_test_patterns();
    let config = Sr3ParserConfig::default();
    let content = create_columnar_file(",", 12);
    let lines: Vec<&str> = content.split('\n').collect();
    let mut trace = ExtractionTrace::default();

    // Eleven short values per line: numeric enough but under the length floor
    let short = "1,2,3,4,5,6,7,8,9,10,11";
    let mut with_short = lines.clone();
    with_short.push(short);

    assert!(extract_delimited_series(&lines, 2, &patterns, &config, &mut trace).is_none());
    assert!(extract_delimited_series(&with_short, 2, &patterns, &config, &mut trace).is_none());
}

#[test]
fn test_choose_delimiter() {
    let patterns = create_test_patterns();
    let config = Sr3ParserConfig::default();

    for (separator, expected) in [
        (" ", Delimiter::Whitespace),
        (",", Delimiter::Comma),
        (";", Delimiter::Semicolon),
    ] {
        let content = create_columnar_file(separator, 12);
        let lines: Vec<&str> = content.split('\n').collect();
        let mut trace = ExtractionTrace::default();
        assert_eq!(choose_delimiter(&lines, 2, &patterns, &config, &mut trace), expected);
        assert!(!trace.samples.is_empty());
    }

    // Nothing parses: the first candidate wins
    let lines = vec!["alpha beta", "gamma delta"];
    let mut trace = ExtractionTrace::default();
    assert_eq!(
        choose_delimiter(&lines, 0, &patterns, &config, &mut trace),
        Delimiter::Whitespace
    );
}

#[test]
fn test_detect_column_roles() {
    let patterns = create_test_patterns();

    let header = vec!["TEST DATA", "Index Time Force"];
    assert_eq!(detect_column_roles(&header, Delimiter::Whitespace, &patterns), (1, 2));

    let header = vec!["Fuerza,Tiempo,Extra"];
    assert_eq!(detect_column_roles(&header, Delimiter::Comma, &patterns), (1, 0));

    // Two-column titles keep the defaults
    let header = vec!["Time Force"];
    assert_eq!(detect_column_roles(&header, Delimiter::Whitespace, &patterns), (0, 1));
}

#[test]
fn test_extract_columnar_with_titled_columns() {
    let patterns = create_test_patterns();
    let mut lines = vec!["TEST DATA", "Index Time Force"];
    lines.extend(["1 0.0 0", "2 0.5 150", "3 1.0 300"]);
    let mut trace = ExtractionTrace::default();

    let extraction = extract_columnar(&lines, 2, &patterns, &Sr3ParserConfig::default(), &mut trace);
    assert_eq!(extraction.format, Sr3Format::Columnar);
    assert_eq!(extraction.time, vec![0.0, 0.5, 1.0]);
    assert_eq!(extraction.force, vec![0.0, 150.0, 300.0]);
}

#[test]
fn test_extract_columnar_records_failures() {
    let patterns = create_test_patterns();
    let lines = vec!["0 0", "0.5 100", "", "sensor glitch", "1 200"];
    let mut trace = ExtractionTrace::default();

    let extraction = extract_columnar(&lines, 0, &patterns, &Sr3ParserConfig::default(), &mut trace);
    assert_eq!(extraction.time.len(), 3);
    assert_eq!(extraction.data_lines, 4);
    assert_eq!(trace.failed_lines.len(), 1);
    assert!(trace.failed_lines[0].contains("line 4"));
}
