//! SR3 header parsing: declared maximum load and header-boundary detection
//!
//! Machine exports start with a block of metadata lines (`KEY: value;`,
//! report titles, an `OVERSAMPLING READINGS` marker) before the data. The
//! boundary is the last header line seen before the first data line.

use serde::{Deserialize, Serialize};

use crate::config::Sr3ParserConfig;
use crate::constants::sr3::{OVERSAMPLING_MARKER, TF_TO_KG};
use crate::sr3::tokens::{semicolon_count, Sr3Patterns};

/// Declared `MAX LOAD: <x> tf` in kilograms, if present and plausible
pub fn declared_max_force(content: &str, patterns: &Sr3Patterns, max_plausible_kg: f64) -> Option<f64> {
    let captures = patterns.max_load.captures(content)?;
    let tonnes = patterns.parse_number(captures.get(1)?.as_str())?;
    let kg = tonnes * TF_TO_KG;
    (kg > 0.0 && kg < max_plausible_kg).then_some(kg)
}

/// Alternative max-force declarations ("MAXIMUM FORCE: 50 kN", "CARGA MAXIMA: 32 t")
pub fn alternative_max_force(content: &str, patterns: &Sr3Patterns) -> Option<f64> {
    patterns.alt_max_force.iter().find_map(|regex| {
        let captures = regex.captures(content)?;
        let value = patterns.parse_number(captures.get(1)?.as_str())?;
        let unit = captures.get(2)?.as_str().to_lowercase();
        let kg = match unit.as_str() {
            "tf" | "ton" | "t" => value * TF_TO_KG,
            _ => value,
        };
        (kg > 0.0).then_some(kg)
    })
}

/// Why a line was classified the way it was
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineNote {
    /// 1-based line number
    pub line: usize,
    pub note: String,
}

/// Header boundary detection outcome
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeaderDetection {
    /// Lines to skip before extraction
    pub header_lines: usize,
    /// Index of the first data line after the header; `None` when the scan
    /// found no data and the fallback size was used
    pub first_data_line: Option<usize>,
    pub notes: Vec<LineNote>,
}

impl HeaderDetection {
    pub fn has_header(&self) -> bool {
        self.header_lines > 0
    }

    pub fn used_fallback(&self) -> bool {
        self.first_data_line.is_none()
    }
}

/// Is this a long semicolon series line (force or time data)?
pub fn is_series_line(line: &str, patterns: &Sr3Patterns, min_tokens: usize) -> bool {
    semicolon_count(line) > min_tokens && patterns.series_values(line).len() > min_tokens
}

/// Detect where the header ends among already-trimmed lines.
///
/// A long semicolon series ends the scan at once. Otherwise the whole scan
/// window is read and the header runs up to the last header-like line, so a
/// stray numeric line inside the header (a bare timestamp, a lone reading)
/// does not close it early.
pub fn detect_header(lines: &[&str], patterns: &Sr3Patterns, config: &Sr3ParserConfig) -> HeaderDetection {
    let mut notes = Vec::new();
    let mut last_header: Option<usize> = None;
    let mut first_data_line = None;
    let mut saw_data = false;

    for (i, line) in lines.iter().enumerate().take(config.max_header_scan_lines) {
        if line.is_empty() {
            continue;
        }

        if is_series_line(line, patterns, config.min_series_tokens) {
            notes.push(LineNote {
                line: i + 1,
                note: "start of semicolon data section".to_string(),
            });
            first_data_line = Some(i);
            saw_data = true;
            break;
        }

        let reason = if line.contains(OVERSAMPLING_MARKER) {
            Some("end-of-header marker".to_string())
        } else if line.contains(':') && line.ends_with(';') {
            Some("key/value metadata line".to_string())
        } else if let Some(keyword) = patterns.matches_header_keyword(line) {
            Some(format!("matches header keyword '{}'", keyword.to_lowercase()))
        } else if !patterns.has_two_numeric_columns(line) {
            Some("does not parse as two numeric columns".to_string())
        } else {
            None
        };

        match reason {
            Some(reason) => {
                if let Some(data_line) = first_data_line.take() {
                    notes.push(LineNote {
                        line: data_line + 1,
                        note: format!("numeric line is part of the header, header continues at line {}", i + 1),
                    });
                }
                notes.push(LineNote {
                    line: i + 1,
                    note: format!("header: {}", reason),
                });
                last_header = Some(i);
            }
            None => {
                if first_data_line.is_none() {
                    notes.push(LineNote {
                        line: i + 1,
                        note: "first columnar data line".to_string(),
                    });
                    first_data_line = Some(i);
                }
                saw_data = true;
            }
        }
    }

    let header_lines = if saw_data {
        let header_lines = last_header.map(|i| i + 1).unwrap_or(0);
        // Scan window ended on a header line: data starts right after it
        first_data_line.get_or_insert(header_lines);
        header_lines
    } else {
        let fallback = config.fallback_header_lines.min(lines.len());
        notes.push(LineNote {
            line: 0,
            note: format!("no data section found, using default header size {}", fallback),
        });
        fallback
    };

    HeaderDetection {
        header_lines,
        first_data_line,
        notes,
    }
}
