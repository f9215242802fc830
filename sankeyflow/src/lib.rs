//! # sankeyflow - Sankey diagrams from categorical path tables
//!
//! Each row of the input is one individual's path through ordered stages
//! (e.g. the grade a student got in each course of a sequence). sankeyflow
//! counts the distinct paths, turns stage values into nodes and consecutive
//! stages into weighted links, and renders the result as a Plotly Sankey
//! diagram.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────┐   ┌──────────┐   ┌──────────────────────────┐   ┌──────────┐
//! │ CSV file │──▶│  Parser  │──▶│        Transform         │──▶│  Render  │
//! │ (any enc)│   │ (Table)  │   │ count/qualify/index/link │   │ (HTML)   │
//! └──────────┘   └──────────┘   └──────────────────────────┘   └──────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use sankeyflow::{sankey_from_csv, BuiltinPalettes, PipelineOptions};
//! use std::path::Path;
//!
//! let (_, result) = sankey_from_csv(Path::new("grades.csv"), &PipelineOptions::default(), &BuiltinPalettes)?;
//! result.diagram.save_html(Path::new("grades"))?;
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Error hierarchy
//! - [`models`] - Table, paths, edges
//! - [`parser`] - Delimited text loading with auto-detection
//! - [`transform`] - The pipeline steps
//! - [`palette`] - Colors and named palettes
//! - [`render`] - Plotly figure and HTML export
//! - [`validation`] - Figure checks
//! - [`config`] - Pipeline options
//! - [`logs`] - Progress logging

// Core modules
pub mod error;
pub mod models;

// Configuration
pub mod config;

// Logging
pub mod logs;

// Parsing
pub mod parser;

// Transformation
pub mod palette;
pub mod transform;

// Output
pub mod render;
pub mod validation;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{ConfigurationError, CsvError, DataShapeError, LookupError, PipelineError, RenderError};

// =============================================================================
// Re-exports - Models
// =============================================================================

pub use models::{Cell, ColumnKind, Edge, IndexedPath, IndexedPathTable, PathRecord, PathTable, Stage, Table};

// =============================================================================
// Re-exports - Parsing
// =============================================================================

pub use parser::{
    decode_content, detect_delimiter, detect_encoding, parse_bytes_auto, parse_csv_file_auto, parse_table,
    LoadOptions, ParseResult,
};

// =============================================================================
// Re-exports - Transform
// =============================================================================

pub use transform::{
    build_sankey, combine_categories, count_paths, display_label, extract_edges, node_colors, qualify_labels,
    sankey_from_bytes, sankey_from_csv, CsvInfo, EdgeWindow, LabelCatalog, LinkColoring, Links, Normalization,
    SankeyResult,
};

// =============================================================================
// Re-exports - Colors, config, output
// =============================================================================

pub use config::PipelineOptions;
pub use palette::{BuiltinPalettes, CustomPalettes, PaletteOverflow, PaletteProvider, Rgba, NEUTRAL};
pub use render::SankeyDiagram;
pub use validation::{check_diagram, is_valid_figure, validate_figure};
