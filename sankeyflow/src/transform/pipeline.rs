//! High-level pipeline: table in, renderable diagram out.
//!
//! ```text
//! Table → normalize → count → qualify → catalog → edges → node colors → diagram
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use sankeyflow::{build_sankey, BuiltinPalettes, PipelineOptions, Table};
//!
//! let table = Table::from_rows(
//!     &["Calc1", "Calc2"],
//!     &[vec![Some("A"), Some("B")], vec![Some("C"), None]],
//! )?;
//! let result = build_sankey(table, &PipelineOptions::default(), &BuiltinPalettes)?;
//! result.diagram.save_html(std::path::Path::new("grades"))?;
//! ```

use serde::Serialize;
use std::path::Path;

use super::catalog::LabelCatalog;
use super::colors::node_colors;
use super::counter::count_paths;
use super::edges::{extract_edges, Links};
use super::qualify::{display_label, qualify_labels};
use crate::config::PipelineOptions;
use crate::error::{PipelineError, PipelineResult};
use crate::logs::{log_info, log_info_indent, log_step, log_step_warning, Step};
use crate::models::{ColumnKind, IndexedPathTable, PathTable, Table};
use crate::palette::{PaletteProvider, Rgba};
use crate::parser::{parse_bytes_auto, parse_csv_file_auto, ParseResult};
use crate::render::SankeyDiagram;

/// Everything the pipeline derived, for inspection or rendering.
#[derive(Debug, Clone, Serialize)]
pub struct SankeyResult {
    /// Qualified distinct paths with counts
    #[serde(skip)]
    pub paths: PathTable,
    pub catalog: LabelCatalog,
    #[serde(skip)]
    pub indexed: IndexedPathTable,
    pub links: Links,
    pub node_colors: Option<Vec<Rgba>>,
    #[serde(skip)]
    pub diagram: SankeyDiagram,
    /// Number of input rows
    pub row_count: usize,
    /// Cells changed by normalization
    pub normalized_cells: usize,
}

/// Input file information
#[derive(Debug, Clone, Serialize)]
pub struct CsvInfo {
    pub encoding: String,
    pub delimiter: char,
    pub headers: Vec<String>,
    pub row_count: usize,
}

impl From<&ParseResult> for CsvInfo {
    fn from(parsed: &ParseResult) -> Self {
        Self {
            encoding: parsed.encoding.clone(),
            delimiter: parsed.delimiter,
            headers: parsed.headers.clone(),
            row_count: parsed.table.row_count(),
        }
    }
}

/// Run every step on `table`.
///
/// The table is consumed because normalization rewrites it; clone first to
/// keep the original.
pub fn build_sankey(
    mut table: Table,
    options: &PipelineOptions,
    palettes: &dyn PaletteProvider,
) -> PipelineResult<SankeyResult> {
    options.validate()?;

    if table.is_empty() {
        return Err(PipelineError::EmptyInput);
    }
    let row_count = table.row_count();
    log_info(format!("📋 {} rows across {} stages", row_count, table.stage_count()));
    for stage in table.stages() {
        log_info_indent(format!("{} ({:?})", stage.name, stage.kind), 1);
    }

    // Step 1: Normalize
    let normalized_cells = match options.normalization {
        Some(ref normalization) => {
            let changed = normalization.apply(&mut table)?;
            log_step(Step::Normalize, format!("{} cells changed", changed));
            changed
        }
        None => 0,
    };

    // Step 2: Count
    let mut paths = count_paths(&table);
    log_step(Step::Count, format!("{} distinct paths", paths.paths.len()));

    // Step 3: Qualify
    let qualified = qualify_labels(&mut paths, &options.label_separator)?;
    let numeric = paths.stages.iter().filter(|s| s.kind == ColumnKind::Numeric).count();
    log_step(Step::Qualify, format!("{} stages qualified", qualified));
    if numeric > 0 {
        log_step_warning(Step::Qualify, format!("{} numeric stages left unqualified; equal values share a node", numeric));
    }

    // Step 4: Catalog
    let catalog = LabelCatalog::from_paths(&paths);
    let indexed = catalog.index_paths(&paths)?;
    log_step(Step::Catalog, format!("{} labels", catalog.len()));

    // Step 5: Edges
    let provider = options.palettes(palettes);
    let coloring = options.coloring.as_ref().map(|c| (c, &provider as &dyn PaletteProvider));
    let links = extract_edges(&indexed, catalog.len(), options.edge_window, coloring)?;
    log_step(Step::Edges, format!("{} links ({:?} window)", links.len(), options.edge_window));
    if links.is_empty() {
        log_step_warning(Step::Edges, "no transitions between stages; the diagram will have no links");
    }

    // Step 6: Node colors
    let node_colors = if options.node_colors {
        let link_colors = links.colors.as_deref().unwrap_or(&[]);
        let colors = node_colors(catalog.len(), link_colors, options.node_alpha)?;
        log_step(Step::NodeColors, format!("{} node colors", colors.len()));
        Some(colors)
    } else {
        None
    };

    // Step 7: Diagram
    let labels = catalog
        .labels()
        .iter()
        .map(|l| display_label(l, &options.label_separator, &options.display_separator))
        .collect();
    let mut diagram = SankeyDiagram::new(labels, &links);
    if let Some(ref colors) = node_colors {
        diagram = diagram.with_node_colors(colors.clone());
    }
    if let Some(ref title) = options.title {
        diagram = diagram.with_title(title.clone());
    }

    Ok(SankeyResult {
        paths,
        catalog,
        indexed,
        links,
        node_colors,
        diagram,
        row_count,
        normalized_cells,
    })
}

/// Load a delimited file and run the pipeline on it.
pub fn sankey_from_csv(
    path: &Path,
    options: &PipelineOptions,
    palettes: &dyn PaletteProvider,
) -> PipelineResult<(CsvInfo, SankeyResult)> {
    log_info(format!("📖 Reading {}", path.display()));
    let parsed = parse_csv_file_auto(path, &options.load_options())?;
    sankey_from_parsed(parsed, options, palettes)
}

/// Same as [`sankey_from_csv`] for in-memory bytes.
pub fn sankey_from_bytes(
    bytes: &[u8],
    options: &PipelineOptions,
    palettes: &dyn PaletteProvider,
) -> PipelineResult<(CsvInfo, SankeyResult)> {
    let parsed = parse_bytes_auto(bytes, &options.load_options())?;
    sankey_from_parsed(parsed, options, palettes)
}

fn sankey_from_parsed(
    parsed: ParseResult,
    options: &PipelineOptions,
    palettes: &dyn PaletteProvider,
) -> PipelineResult<(CsvInfo, SankeyResult)> {
    let info = CsvInfo::from(&parsed);
    log_step(Step::Load, format!("encoding {}", info.encoding));
    log_step(Step::Load, format!("separator '{}'", format_delimiter(info.delimiter)));

    let result = build_sankey(parsed.table, options, palettes)?;
    Ok((info, result))
}

/// Format delimiter for display
pub fn format_delimiter(d: char) -> String {
    match d {
        '\t' => "TAB".to_string(),
        c => c.to_string(),
    }
}
