//! SR3 parser entry point

use tracing::{debug, warn};

use crate::config::Sr3ParserConfig;
use crate::constants::sr3::{BINARY_PROBE_CHARS, DEBUG_PREVIEW_LINES};
use crate::error::{QualityError, Result};
use crate::sr3::extraction::{
    ExtractionTrace, extract_columnar, extract_delimited_series, extract_semicolon_series,
};
use crate::sr3::header::{alternative_max_force, declared_max_force, detect_header};
use crate::sr3::result::{Sr3DebugInfo, Sr3Metadata, Sr3Result};
use crate::sr3::tokens::Sr3Patterns;

/// Parser for compression-machine exports
#[derive(Debug, Clone)]
pub struct Sr3Parser {
    config: Sr3ParserConfig,
    patterns: Sr3Patterns,
}

impl Sr3Parser {
    pub fn new(config: Sr3ParserConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            patterns: Sr3Patterns::compile()?,
        })
    }

    pub fn config(&self) -> &Sr3ParserConfig {
        &self.config
    }

    /// Parse raw bytes, replacing invalid UTF-8 sequences
    pub fn parse_bytes(&self, bytes: &[u8], debug: bool) -> Result<Sr3Result> {
        let content = String::from_utf8_lossy(bytes);
        self.parse(&content, debug)
    }

    /// Parse file content into equal-length time and force series
    pub fn parse(&self, content: &str, debug: bool) -> Result<Sr3Result> {
        if content.is_empty() {
            return Err(QualityError::EmptyContent);
        }

        let lines: Vec<&str> = content.split('\n').map(str::trim).collect();
        if lines.len() < self.config.min_total_lines {
            return Err(QualityError::InsufficientLines {
                found: lines.len(),
                required: self.config.min_total_lines,
            });
        }

        let mut trace = ExtractionTrace::default();
        trace.log.push(format!("File has {} lines", lines.len()));

        let declared = declared_max_force(content, &self.patterns, self.config.max_declared_force_kg);
        if let Some(kg) = declared {
            trace.log.push(format!("Found declared MAX LOAD: {} kg", kg));
        }

        let detection = detect_header(&lines, &self.patterns, &self.config);
        trace
            .log
            .push(format!("Detected {} header lines", detection.header_lines));
        if detection.used_fallback() {
            warn!(
                "No data section found in the first {} lines, assuming {} header lines",
                self.config.max_header_scan_lines, detection.header_lines
            );
        }

        let semicolon = extract_semicolon_series(
            &lines,
            detection.header_lines,
            &self.patterns,
            &self.config,
            &mut trace,
        );
        let extraction = match semicolon {
            Some(extraction) if extraction.format.has_time_series() => extraction,
            semicolon => {
                let delimited = extract_delimited_series(
                    &lines,
                    detection.header_lines,
                    &self.patterns,
                    &self.config,
                    &mut trace,
                );
                match (delimited, semicolon) {
                    (Some(delimited), _) if delimited.format.has_time_series() => delimited,
                    (_, Some(force_only)) | (Some(force_only), None) => force_only,
                    (None, None) => {
                        trace
                            .log
                            .push("No series lines found, trying columnar format".to_string());
                        extract_columnar(
                            &lines,
                            detection.header_lines,
                            &self.patterns,
                            &self.config,
                            &mut trace,
                        )
                    }
                }
            }
        };

        let mut time = extraction.time;
        let mut force = extraction.force;
        if time.len() != force.len() {
            let len = time.len().min(force.len());
            trace.log.push(format!(
                "Time ({}) and force ({}) lengths differ, truncating to {}",
                time.len(),
                force.len(),
                len
            ));
            time.truncate(len);
            force.truncate(len);
        }

        if time.is_empty() {
            warn!(
                "No valid data points in {} candidate lines",
                extraction.data_lines
            );
            return Err(QualityError::NoDataPoints {
                data_lines: extraction.data_lines,
            });
        }

        let max_force = declared.unwrap_or_else(|| {
            force.iter().fold(0.0_f64, |max, value| max.max(value.abs()))
        });
        trace.log.push(format!("Maximum force: {} kg", max_force));

        debug!(
            "Parsed SR3 content: {} points, format {}, max force {:.1} kg",
            time.len(),
            extraction.format.tag(),
            max_force
        );

        let metadata = Sr3Metadata {
            file_format: extraction.format,
            separator: extraction.separator,
            total_points: time.len(),
            header_lines: detection.header_lines,
            has_header: detection.has_header(),
            data_lines: extraction.data_lines,
            declared_max_force: declared,
        };

        let debug = debug.then(|| Sr3DebugInfo {
            file_size_bytes: content.len(),
            total_lines: lines.len(),
            header_lines: detection.header_lines,
            data_lines: extraction.data_lines,
            valid_data_points: time.len(),
            first_lines: lines
                .iter()
                .take(DEBUG_PREVIEW_LINES)
                .map(|line| line.to_string())
                .collect(),
            sample_parses: trace.samples,
            line_notes: detection.notes,
            processing_log: trace.log,
            failed_lines: trace.failed_lines,
            is_binary: self.looks_binary(content),
            detected_format: extraction.format,
        });

        Ok(Sr3Result {
            time_data: time,
            force_data: force,
            max_force,
            metadata,
            debug,
        })
    }

    /// Best-effort maximum force in kg, 0.0 when nothing can be found
    pub fn extract_max_force(&self, content: &str) -> f64 {
        if let Some(kg) = declared_max_force(content, &self.patterns, self.config.max_declared_force_kg) {
            return kg;
        }
        if let Some(kg) = alternative_max_force(content, &self.patterns) {
            return kg;
        }
        match self.parse(content, false) {
            Ok(result) => result.max_force,
            Err(e) => {
                debug!("Could not derive max force from data: {}", e);
                0.0
            }
        }
    }

    fn looks_binary(&self, content: &str) -> bool {
        let probe: String = content.chars().take(BINARY_PROBE_CHARS).collect();
        self.patterns.binary_chars.is_match(&probe)
    }
}
