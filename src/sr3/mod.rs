//! SR3 compression-test file parsing
//!
//! SR3 files are text exports of a compression machine: a metadata header
//! followed by the load curve of one specimen. Two layouts exist in the wild:
//!
//! - **Semicolon series**: one long `;`-separated line of force readings,
//!   optionally followed by a line of matching time readings.
//! - **Columnar**: one `time force` pair per line, separated by whitespace,
//!   commas, semicolons or tabs.
//!
//! # Architecture
//!
//! - [`tokens`] - Compiled patterns, number prefix parsing, delimiters
//! - [`header`] - Declared `MAX LOAD` and header-boundary detection
//! - [`extraction`] - Semicolon-series and columnar extraction strategies
//! - [`result`] - [`Sr3Result`], metadata and debug diagnostics
//! - [`parser`] - [`Sr3Parser`], the entry point
//!
//! Parsing is a pure function of the content. Structural failures surface as
//! [`crate::QualityError::EmptyContent`],
//! [`crate::QualityError::InsufficientLines`] and
//! [`crate::QualityError::NoDataPoints`].
//!
//! # Example Usage
//!
//! ```rust
//! use concrete_quality::config::Sr3ParserConfig;
//! use concrete_quality::sr3::Sr3Parser;
//!
//! let parser = Sr3Parser::new(Sr3ParserConfig::default()).unwrap();
//! let mut content = String::from("TEST DATA\nMAX LOAD: 5.0 tf;\n");
//! for i in 0..12 {
//!     content.push_str(&format!("{} {}\n", i as f64 * 0.5, i * 100));
//! }
//!
//! let result = parser.parse(&content, false).unwrap();
//! assert_eq!(result.time_data.len(), 12);
//! assert_eq!(result.max_force, 5000.0);
//! ```

pub mod extraction;
pub mod header;
pub mod parser;
pub mod result;
pub mod tokens;

#[cfg(test)]
pub mod tests;

// Re-export main types for easy access
pub use extraction::{SampleParse, Sr3Format};
pub use header::{HeaderDetection, LineNote};
pub use parser::Sr3Parser;
pub use result::{Sr3DebugInfo, Sr3Metadata, Sr3Result};
pub use tokens::Delimiter;
