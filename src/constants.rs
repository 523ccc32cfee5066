//! Application constants for concrete quality analysis
//!
//! This module contains the reference calibration values, classification
//! thresholds, chart bins and SR3 parser defaults used throughout the crate.

// =============================================================================
// Resistance Adjustment
// =============================================================================

/// Calibration factor applied to every computed resistance before use
pub const DEFAULT_CALIBRATION_FACTOR: f64 = 0.92;

/// Compliance is expressed as a percentage of specified strength
pub const PERCENT: f64 = 100.0;

// =============================================================================
// Quality Classification
// =============================================================================

/// Quality tier thresholds, checked in order (first match wins)
pub mod quality_tiers {
    /// Excelente: compliance >= 100, cv <= 8, yield >= 99
    pub const EXCELENTE_MIN_COMPLIANCE: f64 = 100.0;
    pub const EXCELENTE_MAX_CV: f64 = 8.0;
    pub const EXCELENTE_MIN_YIELD: f64 = 99.0;

    /// Muy Bueno: compliance >= 95, cv <= 10, yield >= 98
    pub const MUY_BUENO_MIN_COMPLIANCE: f64 = 95.0;
    pub const MUY_BUENO_MAX_CV: f64 = 10.0;
    pub const MUY_BUENO_MIN_YIELD: f64 = 98.0;

    /// Aceptable: compliance >= 90, cv <= 12, yield >= 97
    pub const ACEPTABLE_MIN_COMPLIANCE: f64 = 90.0;
    pub const ACEPTABLE_MAX_CV: f64 = 12.0;
    pub const ACEPTABLE_MIN_YIELD: f64 = 97.0;
}

/// Trend classification policy
///
/// Deliberately asymmetric: a small gain already reads as improving while
/// only a drop of more than three points reads as declining.
pub mod trend {
    /// Minimum remisiones with compliance before thirds are compared
    pub const MIN_POINTS: usize = 3;

    /// last third - first third above this is improving
    pub const IMPROVING_DELTA: f64 = 0.5;

    /// last third - first third below this is declining
    pub const DECLINING_DELTA: f64 = -3.0;

    /// Both thirds at or above this level count as improving
    pub const HIGH_PERFORMANCE: f64 = 95.0;
}

/// Guarantee-age statistics thresholds
pub mod guarantee_stats {
    /// Ensayos at or above this compliance are counted as compliant
    pub const COMPLIANT_THRESHOLD: f64 = 95.0;

    /// Ensayos below this compliance are counted as non-compliant
    pub const NON_COMPLIANT_THRESHOLD: f64 = 85.0;
}

/// Consistency target for grouped coefficient of variation
pub const GROUP_CV_TARGET: f64 = 10.0;

/// Control chart parameters
pub mod control_limits {
    pub const SIGMA_MULTIPLIER: f64 = 3.0;
    pub const UPPER_SPEC_RATIO: f64 = 1.2;
    pub const LOWER_SPEC_RATIO: f64 = 0.85;
}

// =============================================================================
// Charts
// =============================================================================

/// Compliance distribution bin edges: [<70, 70-80, 80-90, 90-95, 95-100, >=100)
pub const COMPLIANCE_BIN_EDGES: &[f64] = &[70.0, 80.0, 90.0, 95.0, 100.0];

/// Labels for the compliance distribution bins
pub const COMPLIANCE_BIN_LABELS: &[&str] = &["< 70%", "70-80%", "80-90%", "90-95%", "95-100%", "> 100%"];

// =============================================================================
// Guarantee Age Tolerance
// =============================================================================

/// (max guarantee age in hours, tolerance in minutes), checked in order
pub const TOLERANCE_TABLE: &[(f64, i64)] = &[
    (24.0, 30),
    (72.0, 120),
    (168.0, 360),
    (336.0, 720),
    (672.0, 1200),
];

/// Tolerance for guarantee ages beyond the table
pub const TOLERANCE_MAX_MINUTES: i64 = 2880;

/// Sort key used for ages in an unknown unit
pub const UNKNOWN_AGE_SORT_DAYS: f64 = 28.0;

// =============================================================================
// SR3 Parser
// =============================================================================

pub mod sr3 {
    /// Files with fewer lines are rejected
    pub const MIN_TOTAL_LINES: usize = 10;

    /// Header detection only looks at the beginning of the file
    pub const MAX_HEADER_SCAN_LINES: usize = 50;

    /// Header length used when no data section is found during the scan
    pub const FALLBACK_HEADER_LINES: usize = 34;

    /// A series line needs more than this many numeric tokens
    pub const MIN_SERIES_TOKENS: usize = 10;

    /// Shorter lines are never taken for a delimited series
    pub const MIN_DELIMITED_LINE_CHARS: usize = 50;

    /// Lines sampled when choosing a column delimiter
    pub const DELIMITER_SAMPLE_LINES: usize = 20;

    /// Time step used when only a force series is present (seconds)
    pub const SEQUENTIAL_TIME_STEP: f64 = 0.25;

    /// Declared loads above this value (kg) are treated as implausible
    pub const MAX_DECLARED_FORCE_KG: f64 = 1_000_000.0;

    /// Tonne-force to kilogram-force
    pub const TF_TO_KG: f64 = 1000.0;

    /// Marker that closes the header of standard machine exports
    pub const OVERSAMPLING_MARKER: &str = "OVERSAMPLING READINGS";

    /// Lines kept verbatim in debug output
    pub const DEBUG_PREVIEW_LINES: usize = 40;

    /// Characters inspected by the binary-content heuristic
    pub const BINARY_PROBE_CHARS: usize = 1000;

    /// Keywords that mark a line as header text
    pub const HEADER_KEYWORDS: &[&str] = &[
        "test data",
        "informe",
        "reporte",
        "fecha",
        "machine",
        "máquina",
        "time",
        "force",
        "tiempo",
        "fuerza",
        "sample",
        "muestra",
        "specimen",
        "espécimen",
        "compressive",
        "compresión",
        "strength",
        "resistencia",
        "equipment",
        "equipo",
    ];
}

// =============================================================================
// Configuration
// =============================================================================

/// Environment variable overriding the calibration factor
pub const ENV_CALIBRATION_FACTOR: &str = "CONCRETE_QUALITY_CALIBRATION_FACTOR";

/// Environment variable overriding the log level
pub const ENV_LOG_LEVEL: &str = "CONCRETE_QUALITY_LOG_LEVEL";

/// Application directory name under the platform config dir
pub const CONFIG_DIR_NAME: &str = "concrete-quality";

/// Default config file name
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Default log level
pub const DEFAULT_LOG_LEVEL: &str = "info";

// =============================================================================
// Command line
// =============================================================================

/// File extensions picked up when walking directories for lab exports
pub const SR3_FILE_EXTENSIONS: &[&str] = &["sr3", "txt", "csv"];

/// Upper bound on concurrent SR3 parses
pub const MAX_SR3_JOBS: usize = 256;
