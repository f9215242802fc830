//! Node colors derived from link colors.
//!
//! Distinct link colors, in first-seen order, go to the first nodes; every
//! remaining node gets [`NEUTRAL`]. Because catalog indices are stage-major,
//! first-stage nodes come first and usually line up with the link colors of
//! the paths leaving them. This is a visual heuristic, not a per-node
//! mapping.

use std::collections::HashSet;

use crate::error::ConfigResult;
use crate::palette::{Rgba, NEUTRAL};

/// One color per label.
///
/// `alpha`, when given, replaces the alpha of every derived color (the
/// neutral padding keeps its own). The result is always exactly
/// `label_count` long.
pub fn node_colors(label_count: usize, link_colors: &[Rgba], alpha: Option<f64>) -> ConfigResult<Vec<Rgba>> {
    let mut seen = HashSet::new();
    let mut colors: Vec<Rgba> = link_colors.iter().copied().filter(|c| seen.insert(c.key())).collect();

    if let Some(alpha) = alpha {
        colors = colors
            .into_iter()
            .map(|c| c.with_alpha(alpha))
            .collect::<ConfigResult<Vec<_>>>()?;
    }

    colors.truncate(label_count);
    colors.resize(label_count, NEUTRAL);

    Ok(colors)
}
