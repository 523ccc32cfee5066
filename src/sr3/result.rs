//! Parse results and optional diagnostics

use serde::{Deserialize, Serialize};

use crate::sr3::extraction::{SampleParse, Sr3Format};
use crate::sr3::header::LineNote;

/// Structural facts about a parsed file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sr3Metadata {
    pub file_format: Sr3Format,
    pub separator: String,
    pub total_points: usize,
    pub header_lines: usize,
    pub has_header: bool,
    pub data_lines: usize,
    /// Declared `MAX LOAD` in kg, when present and plausible
    pub declared_max_force: Option<f64>,
}

/// Diagnostics returned when debug mode is on
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sr3DebugInfo {
    pub file_size_bytes: usize,
    pub total_lines: usize,
    pub header_lines: usize,
    pub data_lines: usize,
    pub valid_data_points: usize,
    pub first_lines: Vec<String>,
    pub sample_parses: Vec<SampleParse>,
    pub line_notes: Vec<LineNote>,
    pub processing_log: Vec<String>,
    pub failed_lines: Vec<String>,
    pub is_binary: bool,
    pub detected_format: Sr3Format,
}

/// Equal-length time and force series plus the maximum force
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sr3Result {
    pub time_data: Vec<f64>,
    pub force_data: Vec<f64>,
    /// Maximum force in kg
    pub max_force: f64,
    pub metadata: Sr3Metadata,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debug: Option<Sr3DebugInfo>,
}

impl Sr3Result {
    pub fn len(&self) -> usize {
        self.time_data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time_data.is_empty()
    }

    /// (time, force) pairs in file order
    pub fn points(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.time_data.iter().copied().zip(self.force_data.iter().copied())
    }

    /// Whether max_force came from the header declaration
    pub fn uses_declared_max(&self) -> bool {
        self.metadata.declared_max_force.is_some()
    }
}
