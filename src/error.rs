//! Error handling for quality analysis and SR3 parsing.
//!
//! The aggregation engine itself never fails on data-quality problems; these
//! errors cover structural parse failures of lab exports, invalid records at
//! the input boundary, and the ambient concerns of the binary (I/O,
//! configuration, JSON snapshots).

use thiserror::Error;

#[derive(Error, Debug)]
pub enum QualityError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration file could not be parsed: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Pattern compilation failed: {0}")]
    Pattern(#[from] regex::Error),

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("SR3 content is empty or not valid text")]
    EmptyContent,

    #[error("SR3 content has {found} lines, at least {required} are required")]
    InsufficientLines { found: usize, required: usize },

    #[error("No valid time/force points could be extracted from {data_lines} candidate lines")]
    NoDataPoints { data_lines: usize },

    #[error("Invalid {entity} record '{id}': {reason}")]
    InvalidRecord {
        entity: &'static str,
        id: String,
        reason: String,
    },

    #[error("Date/time parsing error: {message}")]
    DateTimeParsing {
        message: String,
        #[source]
        source: chrono::ParseError,
    },
}

impl QualityError {
    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create an invalid record error
    pub fn invalid_record(
        entity: &'static str,
        id: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidRecord {
            entity,
            id: id.into(),
            reason: reason.into(),
        }
    }

    /// Create a date/time parsing error with context
    pub fn datetime_parsing(message: impl Into<String>, source: chrono::ParseError) -> Self {
        Self::DateTimeParsing {
            message: message.into(),
            source,
        }
    }

    /// True for structural failures of an uploaded lab file
    pub fn is_parse_failure(&self) -> bool {
        matches!(
            self,
            Self::EmptyContent | Self::InsufficientLines { .. } | Self::NoDataPoints { .. }
        )
    }

    /// Message safe to show an end user.
    ///
    /// Parse failures collapse to a generic "could not read file" text so the
    /// detection heuristics stay internal; everything else uses `Display`.
    pub fn user_message(&self) -> String {
        if self.is_parse_failure() {
            "Could not read the SR3 file. Please check the export and upload it again.".to_string()
        } else {
            self.to_string()
        }
    }
}

pub type Result<T> = std::result::Result<T, QualityError>;
