//! Tokenising helpers shared by header detection and extraction

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::constants::sr3::HEADER_KEYWORDS;
use crate::error::Result;

/// Column delimiter candidates, in tie-break order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Delimiter {
    Whitespace,
    Comma,
    Semicolon,
    Tab,
}

impl Delimiter {
    pub const CANDIDATES: [Delimiter; 4] = [
        Delimiter::Whitespace,
        Delimiter::Comma,
        Delimiter::Semicolon,
        Delimiter::Tab,
    ];

    /// Split a trimmed line into raw columns
    pub fn split<'a>(&self, line: &'a str) -> Vec<&'a str> {
        match self {
            Delimiter::Whitespace => line.split_whitespace().collect(),
            Delimiter::Comma => line.split(',').collect(),
            Delimiter::Semicolon => line.split(';').collect(),
            Delimiter::Tab => line.split('\t').collect(),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Delimiter::Whitespace => "whitespace",
            Delimiter::Comma => ",",
            Delimiter::Semicolon => ";",
            Delimiter::Tab => "\\t",
        }
    }
}

/// Compiled patterns used by the parser
#[derive(Debug, Clone)]
pub struct Sr3Patterns {
    pub max_load: Regex,
    /// Alternative max-force declarations, unit in group 2
    pub alt_max_force: Vec<Regex>,
    number_prefix: Regex,
    header_keywords: Regex,
    key_value_split: Regex,
    pub time_column: Regex,
    pub force_column: Regex,
    pub binary_chars: Regex,
}

impl Sr3Patterns {
    pub fn compile() -> Result<Self> {
        let keywords = HEADER_KEYWORDS
            .iter()
            .map(|k| regex::escape(k))
            .collect::<Vec<_>>()
            .join("|");

        Ok(Self {
            max_load: Regex::new(r"(?i)MAX LOAD:\s*([\d.]+)\s*tf")?,
            alt_max_force: vec![
                Regex::new(r"(?i)MAX(?:IMUM)?\s*(?:LOAD|FORCE|CARGA):\s*([\d.]+)\s*(tf|ton|t|kgf|kg)")?,
                Regex::new(r"(?i)CARGA\s*(?:MAXIMA|MÁXIMA|MÁX):\s*([\d.]+)\s*(tf|ton|t|kgf|kg)")?,
                Regex::new(r"(?i)FUERZA\s*(?:MAXIMA|MÁXIMA|MÁX):\s*([\d.]+)\s*(tf|ton|t|kgf|kg)")?,
            ],
            number_prefix: Regex::new(r"^[+-]?(?:\d+\.?\d*|\.\d+)(?:[eE][+-]?\d+)?")?,
            header_keywords: Regex::new(&format!("(?i){}", keywords))?,
            key_value_split: Regex::new(r"[\s,;]+")?,
            time_column: Regex::new(r"(?i)time|tiempo|seconds|segundos")?,
            force_column: Regex::new(r"(?i)force|fuerza|load|carga|kg|kn")?,
            binary_chars: Regex::new(r"[\x00-\x08\x0B\x0C\x0E-\x1F]")?,
        })
    }

    /// Parse the leading numeric prefix of a token ("12.5kg" → 12.5)
    ///
    /// Only finite decimal numbers are accepted; "inf" and "NaN" are not numbers here.
    pub fn parse_number(&self, token: &str) -> Option<f64> {
        let token = token.trim_start();
        let matched = self.number_prefix.find(token)?;
        matched.as_str().parse::<f64>().ok().filter(|v| v.is_finite())
    }

    /// Numeric tokens of a semicolon series line
    pub fn series_values(&self, line: &str) -> Vec<f64> {
        line.split(';')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .filter_map(|part| self.parse_number(part))
            .collect()
    }

    pub fn matches_header_keyword(&self, line: &str) -> Option<String> {
        self.header_keywords.find(line).map(|m| m.as_str().to_string())
    }

    /// First two columns split on whitespace, comma or semicolon both parse as numbers
    pub fn has_two_numeric_columns(&self, line: &str) -> bool {
        let columns: Vec<&str> = self.key_value_split.split(line).collect();
        columns.len() >= 2
            && self.parse_number(columns[0]).is_some()
            && self.parse_number(columns[1]).is_some()
    }
}

/// Count of `;` in a line
pub fn semicolon_count(line: &str) -> usize {
    line.matches(';').count()
}
