//! Derive weighted links from indexed paths.
//!
//! Each path contributes links between consecutive present nodes, all
//! weighted by the path's count. Gaps are skipped, so a path absent from a
//! middle stage links straight across it. Identical links from different
//! paths are kept separate; the renderer stacks them.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::error::{LookupError, PipelineResult};
use crate::logs::{log_step_warning, Step};
use crate::models::{Edge, IndexedPathTable};
use crate::palette::{color_table, PaletteOverflow, PaletteProvider, Rgba, DEFAULT_ALPHA, DEFAULT_PALETTE};

/// How many transitions of a path become links.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeWindow {
    /// Every transition: `L - 1` links for `L` present nodes.
    #[default]
    Full,
    /// Drop the last transition of every path (`L - 2` links). Opt-in
    /// compatibility convention only.
    Legacy,
}

impl EdgeWindow {
    /// Links produced by a path with `present` nodes.
    pub fn edge_count(self, present: usize) -> usize {
        match self {
            EdgeWindow::Full => present.saturating_sub(1),
            EdgeWindow::Legacy => present.saturating_sub(2),
        }
    }
}

/// Per-path link coloring, keyed by the path's first node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkColoring {
    pub palette: String,
    pub alpha: f64,
    pub overflow: PaletteOverflow,
}

impl Default for LinkColoring {
    fn default() -> Self {
        Self {
            palette: DEFAULT_PALETTE.to_string(),
            alpha: DEFAULT_ALPHA,
            overflow: PaletteOverflow::Cycle,
        }
    }
}

/// Links in path order, with one color per link when coloring was asked for.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Links {
    pub edges: Vec<Edge>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub colors: Option<Vec<Rgba>>,
}

impl Links {
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    pub fn sources(&self) -> Vec<usize> {
        self.edges.iter().map(|e| e.source).collect()
    }

    pub fn targets(&self) -> Vec<usize> {
        self.edges.iter().map(|e| e.target).collect()
    }

    pub fn values(&self) -> Vec<usize> {
        self.edges.iter().map(|e| e.value).collect()
    }
}

/// Walk every path and emit its links.
///
/// `node_count` is the label catalog size; every index must be below it.
/// With `coloring`, a color table of `node_count` entries is built from the
/// palette and each path takes the color of its first node.
pub fn extract_edges(
    indexed: &IndexedPathTable,
    node_count: usize,
    window: EdgeWindow,
    coloring: Option<(&LinkColoring, &dyn PaletteProvider)>,
) -> PipelineResult<Links> {
    let color_lookup = match coloring {
        Some((opts, provider)) => {
            let table = color_table(provider, &opts.palette, node_count, opts.alpha, opts.overflow)?;
            warn_on_palette_overflow(indexed, provider.palette(&opts.palette)?.len(), opts);
            Some(table)
        }
        None => None,
    };

    let mut edges = Vec::new();
    let mut colors = color_lookup.as_ref().map(|_| Vec::new());

    for path in &indexed.paths {
        let temp = path.present();
        if let Some(&bad) = temp.iter().find(|&&i| i >= node_count) {
            return Err(LookupError::IndexOutOfRange { index: bad, len: node_count }.into());
        }

        let n = window.edge_count(temp.len());
        if n == 0 {
            continue;
        }

        for pair in temp.windows(2).take(n) {
            edges.push(Edge {
                source: pair[0],
                target: pair[1],
                value: path.count,
            });
        }

        if let (Some(table), Some(colors)) = (&color_lookup, colors.as_mut()) {
            let color = table[temp[0]];
            colors.extend(std::iter::repeat(color).take(n));
        }
    }

    Ok(Links { edges, colors })
}

fn warn_on_palette_overflow(indexed: &IndexedPathTable, palette_len: usize, opts: &LinkColoring) {
    let first_nodes: BTreeSet<usize> = indexed
        .paths
        .iter()
        .filter_map(|p| p.nodes.iter().flatten().next().copied())
        .collect();

    if let Some(&highest) = first_nodes.last() {
        if highest >= palette_len {
            let fallback = match opts.overflow {
                PaletteOverflow::Cycle => "colors repeat",
                PaletteOverflow::Neutral => "extra paths are gray",
            };
            log_step_warning(
                Step::Edges,
                format!(
                    "Palette '{}' has {} colors but paths start at node {}; {}",
                    opts.palette, palette_len, highest, fallback
                ),
            );
        }
    }
}
