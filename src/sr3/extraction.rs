//! Time/force series extraction strategies
//!
//! 1. Semicolon series: the first long semicolon line after the header is the
//!    force series and the next one is the time series.
//! 2. Delimited series: the same force-then-time pairing over long lines
//!    split on `;`, `,` or whitespace.
//! 3. Force only: a force series without a time line gets a synthetic
//!    sequential time axis.
//! 4. Columnar: pick the delimiter that parses best over a sample and read
//!    one (time, force) pair per line.

use serde::{Deserialize, Serialize};

use crate::config::Sr3ParserConfig;
use crate::constants::sr3::MIN_DELIMITED_LINE_CHARS;
use crate::sr3::header::is_series_line;
use crate::sr3::tokens::{Delimiter, Sr3Patterns};

/// Extraction strategy that produced the data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sr3Format {
    SemicolonSeries,
    SemicolonForceOnly,
    DelimitedSeries,
    DelimitedForceOnly,
    Columnar,
}

impl Sr3Format {
    /// Both series were read from the file
    pub fn has_time_series(&self) -> bool {
        matches!(self, Sr3Format::SemicolonSeries | Sr3Format::DelimitedSeries | Sr3Format::Columnar)
    }

    pub fn tag(&self) -> &'static str {
        match self {
            Sr3Format::SemicolonSeries => "semicolon_series",
            Sr3Format::SemicolonForceOnly => "semicolon_force_only",
            Sr3Format::DelimitedSeries => "delimited_series",
            Sr3Format::DelimitedForceOnly => "delimited_force_only",
            Sr3Format::Columnar => "columnar",
        }
    }
}

/// Raw extracted series, not yet truncated to equal length
#[derive(Debug, Clone, PartialEq)]
pub struct Extraction {
    pub format: Sr3Format,
    pub separator: String,
    pub time: Vec<f64>,
    pub force: Vec<f64>,
    /// Non-empty lines considered after the header
    pub data_lines: usize,
}

/// One delimiter tried against one sample line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleParse {
    pub line: String,
    pub delimiter: Delimiter,
    pub values: Vec<Option<f64>>,
}

/// Diagnostics collected while extracting
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractionTrace {
    pub log: Vec<String>,
    pub samples: Vec<SampleParse>,
    pub failed_lines: Vec<String>,
}

/// Primary strategy over the lines after the header
pub fn extract_semicolon_series(
    lines: &[&str],
    header_lines: usize,
    patterns: &Sr3Patterns,
    config: &Sr3ParserConfig,
    trace: &mut ExtractionTrace,
) -> Option<Extraction> {
    let min_tokens = config.min_series_tokens;
    let mut series = lines
        .iter()
        .enumerate()
        .skip(header_lines)
        .filter(|(_, line)| !line.is_empty() && is_series_line(line, patterns, min_tokens));

    let (force_idx, force_line) = series.next()?;
    let force = patterns.series_values(force_line);
    trace.log.push(format!(
        "Found force data line at line {} with {} values",
        force_idx + 1,
        force.len()
    ));

    let data_lines = lines
        .iter()
        .skip(header_lines)
        .filter(|line| !line.is_empty())
        .count();

    match series.next() {
        Some((time_idx, time_line)) => {
            let time = patterns.series_values(time_line);
            trace.log.push(format!(
                "Found time data line at line {} with {} values",
                time_idx + 1,
                time.len()
            ));
            Some(Extraction {
                format: Sr3Format::SemicolonSeries,
                separator: ";".to_string(),
                time,
                force,
                data_lines,
            })
        }
        None => {
            trace.log.push(format!(
                "Found force data ({} values) but no time data, generating sequential time values",
                force.len()
            ));
            let time = sequential_time(force.len(), config.sequential_time_step);
            Some(Extraction {
                format: Sr3Format::SemicolonForceOnly,
                separator: ";".to_string(),
                time,
                force,
                data_lines,
            })
        }
    }
}

/// Delimiters tried, in order, on long lines
const LONG_LINE_DELIMITERS: [Delimiter; 3] = [Delimiter::Semicolon, Delimiter::Comma, Delimiter::Whitespace];

fn sequential_time(len: usize, step: f64) -> Vec<f64> {
    (0..len).map(|i| i as f64 * step).collect()
}

/// Numeric values of a long line under the first delimiter that yields a series
fn long_line_values(line: &str, patterns: &Sr3Patterns, min_tokens: usize) -> Option<(Delimiter, Vec<f64>)> {
    if line.len() < MIN_DELIMITED_LINE_CHARS {
        return None;
    }
    LONG_LINE_DELIMITERS.iter().find_map(|delimiter| {
        let parts: Vec<&str> = delimiter
            .split(line)
            .into_iter()
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .collect();
        if parts.len() <= min_tokens {
            return None;
        }
        let values: Vec<f64> = parts.iter().filter_map(|part| patterns.parse_number(part)).collect();
        (values.len() > min_tokens).then_some((*delimiter, values))
    })
}

/// Recovery strategy for series written with another delimiter.
///
/// The first long line holding more than `min_series_tokens` numbers is the
/// force series and the next such line is the time series. A force series
/// alone gets a sequential time axis.
pub fn extract_delimited_series(
    lines: &[&str],
    header_lines: usize,
    patterns: &Sr3Patterns,
    config: &Sr3ParserConfig,
    trace: &mut ExtractionTrace,
) -> Option<Extraction> {
    let min_tokens = config.min_series_tokens;
    let mut series = lines
        .iter()
        .enumerate()
        .skip(header_lines)
        .filter_map(|(i, line)| long_line_values(line, patterns, min_tokens).map(|found| (i, found)));

    let (force_idx, (delimiter, force)) = series.next()?;
    trace.log.push(format!(
        "Found delimited force line at line {} using '{}' with {} values",
        force_idx + 1,
        delimiter.label(),
        force.len()
    ));

    let data_lines = lines
        .iter()
        .skip(header_lines)
        .filter(|line| !line.is_empty())
        .count();

    match series.next() {
        Some((time_idx, (_, time))) => {
            trace.log.push(format!(
                "Found delimited time line at line {} with {} values",
                time_idx + 1,
                time.len()
            ));
            Some(Extraction {
                format: Sr3Format::DelimitedSeries,
                separator: delimiter.label().to_string(),
                time,
                force,
                data_lines,
            })
        }
        None => {
            trace.log.push(format!(
                "Found delimited force data ({} values) but no time data, generating sequential time values",
                force.len()
            ));
            Some(Extraction {
                format: Sr3Format::DelimitedForceOnly,
                separator: delimiter.label().to_string(),
                time: sequential_time(force.len(), config.sequential_time_step),
                force,
                data_lines,
            })
        }
    }
}

/// Pick the delimiter with the most two-column numeric parses over the sample.
///
/// Ties go to the earliest candidate; whitespace when nothing parses.
pub fn choose_delimiter(
    lines: &[&str],
    header_lines: usize,
    patterns: &Sr3Patterns,
    config: &Sr3ParserConfig,
    trace: &mut ExtractionTrace,
) -> Delimiter {
    let mut counts = [0usize; Delimiter::CANDIDATES.len()];

    let end = (header_lines + config.delimiter_sample_lines).min(lines.len());
    for line in lines.iter().take(end).skip(header_lines) {
        if line.is_empty() {
            continue;
        }
        for (slot, delimiter) in Delimiter::CANDIDATES.iter().enumerate() {
            let columns = delimiter.split(line);
            if columns.len() < 2 {
                continue;
            }
            if patterns.parse_number(columns[0]).is_some() && patterns.parse_number(columns[1]).is_some() {
                counts[slot] += 1;
                trace.samples.push(SampleParse {
                    line: line.to_string(),
                    delimiter: *delimiter,
                    values: columns.iter().map(|c| patterns.parse_number(c)).collect(),
                });
            }
        }
    }

    let best = counts
        .iter()
        .enumerate()
        .fold((0, 0), |(best_slot, best_count), (slot, count)| {
            if *count > best_count { (slot, *count) } else { (best_slot, best_count) }
        })
        .0;
    Delimiter::CANDIDATES[best]
}

/// Locate time and force columns from a column-title line in the header.
///
/// Defaults to (0, 1). Only the last header line with more than two
/// columns that names a time or force column is considered.
pub fn detect_column_roles(header: &[&str], delimiter: Delimiter, patterns: &Sr3Patterns) -> (usize, usize) {
    let mut time_idx = 0;
    let mut force_idx = 1;

    let title = header.iter().rev().find(|line| {
        let columns = delimiter.split(line);
        columns.len() > 2
            && columns
                .iter()
                .any(|c| patterns.time_column.is_match(c) || patterns.force_column.is_match(c))
    });

    if let Some(title) = title {
        for (i, column) in delimiter.split(title).iter().enumerate() {
            if patterns.time_column.is_match(column) {
                time_idx = i;
            } else if patterns.force_column.is_match(column) {
                force_idx = i;
            }
        }
    }
    (time_idx, force_idx)
}

/// Columnar fallback strategy
pub fn extract_columnar(
    lines: &[&str],
    header_lines: usize,
    patterns: &Sr3Patterns,
    config: &Sr3ParserConfig,
    trace: &mut ExtractionTrace,
) -> Extraction {
    let delimiter = choose_delimiter(lines, header_lines, patterns, config, trace);
    trace
        .log
        .push(format!("Best separator for columnar format: {}", delimiter.label()));

    let header = &lines[..header_lines.min(lines.len())];
    let (time_idx, force_idx) = detect_column_roles(header, delimiter, patterns);
    if (time_idx, force_idx) != (0, 1) {
        trace.log.push(format!(
            "Column titles place time at {} and force at {}",
            time_idx, force_idx
        ));
    }

    let mut time = Vec::new();
    let mut force = Vec::new();
    let mut data_lines = 0;

    for (i, line) in lines.iter().enumerate().skip(header_lines) {
        if line.is_empty() {
            continue;
        }
        data_lines += 1;

        let columns = delimiter.split(line);
        let (time_col, force_col) = if columns.len() > 2 {
            (time_idx, force_idx)
        } else {
            (0, 1)
        };

        let point = match (columns.get(time_col), columns.get(force_col)) {
            (Some(t), Some(f)) => patterns.parse_number(t).zip(patterns.parse_number(f)),
            _ => None,
        };

        match point {
            Some((t, f)) => {
                time.push(t);
                force.push(f);
            }
            None if data_lines < 10 => {
                trace.failed_lines.push(format!("Failed to parse line {}: {}", i + 1, line));
            }
            None => {}
        }
    }

    trace.log.push(format!(
        "Columnar parsing found {} valid data points in {} lines",
        time.len(),
        data_lines
    ));

    Extraction {
        format: Sr3Format::Columnar,
        separator: delimiter.label().to_string(),
        time,
        force,
        data_lines,
    }
}
