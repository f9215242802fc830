//! Checks on the figure handed to the renderer.
//!
//! Two layers:
//!
//! - [`validate_figure`] - JSON Schema (Draft 7) check of the Plotly figure,
//!   schema embedded from `schemas/sankey-figure.json`
//! - [`check_diagram`] - cross-field invariants a schema cannot express:
//!   link lists of equal length, indices inside the label list, one color per
//!   link and per node
//!
//! # Example
//!
//! ```rust,ignore
//! use serde_json::json;
//! use sankeyflow::validation::is_valid_figure;
//!
//! let figure = json!({
//!     "data": [{
//!         "type": "sankey",
//!         "node": { "label": ["A Calc1", "B Calc2"] },
//!         "link": { "source": [0], "target": [1], "value": [3] }
//!     }],
//!     "layout": {}
//! });
//! assert!(is_valid_figure(&figure));
//! ```

use once_cell::sync::Lazy;
use serde_json::Value;

use crate::render::SankeyDiagram;

static FIGURE_SCHEMA: Lazy<Value> = Lazy::new(|| {
    serde_json::from_str(include_str!("../../schemas/sankey-figure.json")).expect("Invalid embedded schema")
});

/// Validate a JSON value against a JSON schema.
///
/// # Returns
/// * `Ok(())` when valid
/// * `Err(Vec<String>)` with every violation otherwise
pub fn validate(schema: &Value, data: &Value) -> Result<(), Vec<String>> {
    let validator = jsonschema::draft7::new(schema).map_err(|e| vec![format!("Invalid schema: {}", e)])?;

    let errors: Vec<String> = validator.iter_errors(data).map(|e| e.to_string()).collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Boolean form of [`validate`].
pub fn is_valid(schema: &Value, data: &Value) -> bool {
    jsonschema::draft7::is_valid(schema, data)
}

/// Validate a Plotly Sankey figure.
pub fn validate_figure(figure: &Value) -> Result<(), Vec<String>> {
    validate(&FIGURE_SCHEMA, figure)
}

/// Quick check against the figure schema.
pub fn is_valid_figure(figure: &Value) -> bool {
    is_valid(&FIGURE_SCHEMA, figure)
}

/// Check what the renderer relies on but the schema cannot see.
pub fn check_diagram(diagram: &SankeyDiagram) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();
    let nodes = diagram.labels.len();
    let links = diagram.sources.len();

    if diagram.targets.len() != links || diagram.values.len() != links {
        errors.push(format!(
            "link lists differ in length: {} sources, {} targets, {} values",
            links,
            diagram.targets.len(),
            diagram.values.len()
        ));
    }

    for (field, indices) in [("source", &diagram.sources), ("target", &diagram.targets)] {
        if let Some((i, idx)) = indices.iter().enumerate().find(|(_, idx)| **idx >= nodes) {
            errors.push(format!("{} {} at link {} is out of range for {} labels", field, idx, i, nodes));
        }
    }

    if let Some(colors) = &diagram.link_colors {
        if colors.len() != links {
            errors.push(format!("{} link colors for {} links", colors.len(), links));
        }
    }

    if let Some(colors) = &diagram.node_colors {
        if colors.len() != nodes {
            errors.push(format!("{} node colors for {} labels", colors.len(), nodes));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
