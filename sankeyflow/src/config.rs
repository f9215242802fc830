//! Pipeline configuration.
//!
//! Options come from, in increasing priority: defaults, a JSON file,
//! `SANKEYFLOW_*` environment variables (a `.env` file is honoured by the
//! CLI), then command-line flags.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::error::{ConfigResult, ConfigurationError};
use crate::palette::{check_alpha, CustomPalettes, PaletteProvider, Rgba};
use crate::parser::{LoadOptions, DEFAULT_NA_VALUES};
use crate::transform::edges::{EdgeWindow, LinkColoring};
use crate::transform::normalize::Normalization;
use crate::transform::qualify::{DEFAULT_DISPLAY_SEPARATOR, DEFAULT_SEPARATOR};

pub const ENV_PALETTE: &str = "SANKEYFLOW_PALETTE";
pub const ENV_LINK_ALPHA: &str = "SANKEYFLOW_LINK_ALPHA";
pub const ENV_EDGE_WINDOW: &str = "SANKEYFLOW_EDGE_WINDOW";

/// Options for [`crate::transform::pipeline::build_sankey`] and the loader.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineOptions {
    /// Merge categories before counting
    pub normalization: Option<Normalization>,

    /// Color links by the first node of their path
    pub coloring: Option<LinkColoring>,

    /// Named palettes in CSS color form, consulted before the built-in ones
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub custom_palettes: BTreeMap<String, Vec<Rgba>>,

    /// Derive node colors from link colors
    pub node_colors: bool,

    /// Alpha for derived node colors; link alpha when unset
    pub node_alpha: Option<f64>,

    pub edge_window: EdgeWindow,

    /// Joins a value and its stage name in labels
    pub label_separator: String,

    /// Replaces `label_separator` in displayed labels
    pub display_separator: String,

    /// Cells read as absent
    pub na_values: Vec<String>,

    /// Input delimiter; auto-detected when unset
    pub delimiter: Option<char>,

    pub title: Option<String>,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            normalization: None,
            coloring: None,
            custom_palettes: BTreeMap::new(),
            node_colors: false,
            node_alpha: None,
            edge_window: EdgeWindow::Full,
            label_separator: DEFAULT_SEPARATOR.to_string(),
            display_separator: DEFAULT_DISPLAY_SEPARATOR.to_string(),
            na_values: DEFAULT_NA_VALUES.iter().map(|s| s.to_string()).collect(),
            delimiter: None,
            title: None,
        }
    }
}

impl PipelineOptions {
    /// Parse options from JSON; missing fields take their defaults.
    pub fn from_json(json: &str) -> ConfigResult<Self> {
        serde_json::from_str(json).map_err(|e| ConfigurationError::InvalidConfig(e.to_string()))
    }

    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigurationError::InvalidConfig(format!("cannot read {}: {}", path.display(), e)))?;
        Self::from_json(&content)
    }

    pub fn to_json(&self) -> ConfigResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| ConfigurationError::InvalidConfig(e.to_string()))
    }

    /// Apply `SANKEYFLOW_*` variables from the process environment.
    pub fn apply_env(self) -> ConfigResult<Self> {
        self.apply_env_from(|key| std::env::var(key).ok())
    }

    /// Apply `SANKEYFLOW_*` variables read through `lookup`.
    pub fn apply_env_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> ConfigResult<Self> {
        if let Some(palette) = lookup(ENV_PALETTE) {
            self.coloring.get_or_insert_with(LinkColoring::default).palette = palette;
        }

        if let Some(alpha) = lookup(ENV_LINK_ALPHA) {
            let alpha: f64 = alpha
                .trim()
                .parse()
                .map_err(|_| ConfigurationError::InvalidConfig(format!("{}={} is not a number", ENV_LINK_ALPHA, alpha)))?;
            self.coloring.get_or_insert_with(LinkColoring::default).alpha = alpha;
        }

        if let Some(window) = lookup(ENV_EDGE_WINDOW) {
            self.edge_window = match window.trim().to_lowercase().as_str() {
                "full" => EdgeWindow::Full,
                "legacy" => EdgeWindow::Legacy,
                other => {
                    return Err(ConfigurationError::InvalidConfig(format!(
                        "{}={} (expected full or legacy)",
                        ENV_EDGE_WINDOW, other
                    )))
                }
            };
        }

        Ok(self)
    }

    /// Reject combinations the pipeline would fail on later.
    pub fn validate(&self) -> ConfigResult<()> {
        if let Some(ref normalization) = self.normalization {
            normalization.validate()?;
        }
        if let Some(ref coloring) = self.coloring {
            check_alpha(coloring.alpha)?;
        }
        if let Some(alpha) = self.node_alpha {
            check_alpha(alpha)?;
        }
        if let Some((name, _)) = self.custom_palettes.iter().find(|(_, colors)| colors.is_empty()) {
            return Err(ConfigurationError::EmptyPalette(name.clone()));
        }
        Ok(())
    }

    /// `custom_palettes` in front of `fallback`.
    pub fn palettes<'a>(&'a self, fallback: &'a dyn PaletteProvider) -> CustomPalettes<'a> {
        CustomPalettes::new(&self.custom_palettes, fallback)
    }

    pub fn load_options(&self) -> LoadOptions {
        LoadOptions {
            delimiter: self.delimiter,
            na_values: self.na_values.clone(),
        }
    }
}
