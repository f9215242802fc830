//! Transformation steps, in pipeline order:
//! - Normalize: merge categories into groups
//! - Counter: distinct paths with counts
//! - Qualify: tag values with their stage
//! - Catalog: labels and node indices
//! - Edges: weighted links, optional per-path colors
//! - Colors: node colors from link colors
//! - Pipeline: all of the above

pub mod catalog;
pub mod colors;
pub mod counter;
pub mod edges;
pub mod normalize;
pub mod pipeline;
pub mod qualify;

pub use catalog::LabelCatalog;
pub use colors::node_colors;
pub use counter::count_paths;
pub use edges::{extract_edges, EdgeWindow, LinkColoring, Links};
pub use normalize::{combine_categories, Normalization};
pub use pipeline::*;
pub use qualify::{display_label, qualify, qualify_labels};
