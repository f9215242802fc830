//! Error types for the sankeyflow pipeline.
//!
//! - [`ConfigurationError`] - Bad caller options (groups, palettes, alpha)
//! - [`DataShapeError`] - Tables whose shape breaks a pipeline step
//! - [`LookupError`] - Label catalog invariant violations
//! - [`CsvError`] - Loading delimited text
//! - [`RenderError`] - Figure serialization and export
//! - [`PipelineError`] - Top-level orchestration errors
//!
//! Error conversion is automatic via `From` implementations,
//! allowing `?` to work across error boundaries.

use thiserror::Error;

// =============================================================================
// Configuration Errors
// =============================================================================

/// Errors caused by caller-supplied options.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigurationError {
    /// `combine` and `group` must pair up one to one.
    #[error("combine has {combine} group specs but group has {group} replacements")]
    MismatchedGroups { combine: usize, group: usize },

    /// Palette name not known to the provider.
    #[error("Unknown palette: {0}")]
    UnknownPalette(String),

    /// Provider returned no colors.
    #[error("Palette '{0}' has no colors")]
    EmptyPalette(String),

    /// Alpha must lie in [0, 1].
    #[error("Alpha {0} is outside [0, 1]")]
    AlphaOutOfRange(f64),

    /// Malformed option value.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

// =============================================================================
// Data Shape Errors
// =============================================================================

/// Errors caused by a table whose layout a step cannot handle.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DataShapeError {
    /// Stage mixes category tokens and numbers.
    #[error("Stage '{0}' mixes category tokens and numeric values")]
    MixedColumn(String),

    /// Row length differs from the stage count.
    #[error("Row {row} has {found} cells, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },

    /// Two stages share a name.
    #[error("Duplicate stage name: {0}")]
    DuplicateStage(String),

    /// Table has no stages.
    #[error("Table has no stages")]
    NoStages,

    /// Two different stage values qualify to the same node label.
    #[error("Label '{label}' comes from both stage '{first}' and stage '{second}'")]
    LabelCollision {
        label: String,
        first: String,
        second: String,
    },
}

// =============================================================================
// Lookup Errors
// =============================================================================

/// Label catalog invariant violations. Never expected on pipeline output.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    /// A path value has no catalog entry.
    #[error("Value '{value}' in stage '{stage}' is missing from the label catalog")]
    UnknownLabel { stage: String, value: String },

    /// A node index points past the label list.
    #[error("Node index {index} is out of range for {len} labels")]
    IndexOutOfRange { index: usize, len: usize },
}

// =============================================================================
// CSV Errors
// =============================================================================

/// Errors while loading delimited text.
#[derive(Debug, Error)]
pub enum CsvError {
    /// Failed to read file.
    #[error("Failed to read file: {0}")]
    IoError(#[from] std::io::Error),

    /// Failed to decode content.
    #[error("Failed to decode content: {0}")]
    EncodingError(String),

    /// Invalid CSV format.
    #[error("Line {line}: {message}")]
    ParseError { line: usize, message: String },

    /// Empty file.
    #[error("CSV file is empty")]
    EmptyFile,

    /// No headers found.
    #[error("No headers found in CSV")]
    NoHeaders,

    /// Parsed rows do not form a valid table.
    #[error("Invalid table: {0}")]
    Shape(#[from] DataShapeError),
}

// =============================================================================
// Render Errors
// =============================================================================

/// Errors at the renderer boundary.
#[derive(Debug, Error)]
pub enum RenderError {
    /// Writing the artifact failed.
    #[error("Failed to write diagram: {0}")]
    Io(#[from] std::io::Error),

    /// Figure serialization failed.
    #[error("Figure JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Figure failed validation.
    #[error("Invalid figure: {}", .0.join("; "))]
    InvalidFigure(Vec<String>),
}

// =============================================================================
// Pipeline Errors (top-level)
// =============================================================================

/// Top-level pipeline orchestration errors.
///
/// This is the error type returned by [`crate::transform::pipeline::build_sankey`].
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("Data shape error: {0}")]
    DataShape(#[from] DataShapeError),

    #[error("Lookup error: {0}")]
    Lookup(#[from] LookupError),

    #[error("CSV error: {0}")]
    Csv(#[from] CsvError),

    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    /// No rows to transform.
    #[error("No records to transform")]
    EmptyInput,
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for option checks.
pub type ConfigResult<T> = Result<T, ConfigurationError>;

/// Result type for CSV operations.
pub type CsvResult<T> = Result<T, CsvError>;

/// Result type for rendering.
pub type RenderResult<T> = Result<T, RenderError>;

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;
