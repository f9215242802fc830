//! Renderer boundary: Plotly figure JSON and standalone HTML.
//!
//! Nothing here prompts or picks a location on its own. Callers pass a
//! writer or a path; [`SankeyDiagram::show`] is the only call that chooses a
//! file (in the temp directory) and it is never used by the pipeline.

use serde::Serialize;
use serde_json::{json, Map, Value};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::{RenderError, RenderResult};
use crate::palette::Rgba;
use crate::transform::edges::Links;
use crate::validation::{check_diagram, validate_figure};

/// Pinned Plotly build loaded by exported pages.
pub const PLOTLY_CDN: &str = "https://cdn.plot.ly/plotly-2.35.2.min.js";

/// Everything the renderer needs, nothing more.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SankeyDiagram {
    /// Display labels, one per node
    pub labels: Vec<String>,
    pub sources: Vec<usize>,
    pub targets: Vec<usize>,
    pub values: Vec<usize>,
    pub link_colors: Option<Vec<Rgba>>,
    pub node_colors: Option<Vec<Rgba>>,
    pub title: Option<String>,
}

impl SankeyDiagram {
    /// Diagram from display labels and extracted links.
    pub fn new(labels: Vec<String>, links: &Links) -> Self {
        Self {
            labels,
            sources: links.sources(),
            targets: links.targets(),
            values: links.values(),
            link_colors: links.colors.clone(),
            node_colors: None,
            title: None,
        }
    }

    pub fn with_node_colors(mut self, colors: Vec<Rgba>) -> Self {
        self.node_colors = Some(colors);
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Plotly figure: one `sankey` trace plus layout.
    pub fn to_figure(&self) -> Value {
        let mut node = Map::new();
        node.insert("label".to_string(), json!(self.labels));
        node.insert("pad".to_string(), json!(15));
        node.insert("thickness".to_string(), json!(20));
        if let Some(ref colors) = self.node_colors {
            node.insert("color".to_string(), json!(colors));
        }

        let mut link = Map::new();
        link.insert("source".to_string(), json!(self.sources));
        link.insert("target".to_string(), json!(self.targets));
        link.insert("value".to_string(), json!(self.values));
        if let Some(ref colors) = self.link_colors {
            link.insert("color".to_string(), json!(colors));
        }

        let mut layout = Map::new();
        layout.insert("font".to_string(), json!({ "size": 12 }));
        if let Some(ref title) = self.title {
            layout.insert("title".to_string(), json!({ "text": title }));
        }

        json!({
            "data": [{
                "type": "sankey",
                "node": Value::Object(node),
                "link": Value::Object(link),
            }],
            "layout": Value::Object(layout),
        })
    }

    /// Run invariant and schema checks, returning the figure on success.
    pub fn checked_figure(&self) -> RenderResult<Value> {
        check_diagram(self).map_err(RenderError::InvalidFigure)?;
        let figure = self.to_figure();
        validate_figure(&figure).map_err(RenderError::InvalidFigure)?;
        Ok(figure)
    }

    /// Standalone HTML page drawing the diagram.
    pub fn to_html(&self) -> RenderResult<String> {
        let figure = self.checked_figure()?;
        // Keep the payload from closing the script element
        let payload = serde_json::to_string(&figure)?.replace("</", "<\\/");
        let title = html_escape(self.title.as_deref().unwrap_or("Sankey diagram"));

        Ok(format!(
            r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>{title}</title>
<script src="{cdn}"></script>
</head>
<body>
<div id="sankey" style="width:100%;height:90vh;"></div>
<script>
const figure = {payload};
Plotly.newPlot("sankey", figure.data, figure.layout, {{responsive: true}});
</script>
</body>
</html>
"#,
            title = title,
            cdn = PLOTLY_CDN,
            payload = payload,
        ))
    }

    /// Write the HTML page to any sink.
    pub fn write_html<W: Write>(&self, mut writer: W) -> RenderResult<()> {
        let html = self.to_html()?;
        writer.write_all(html.as_bytes())?;
        writer.flush()?;
        Ok(())
    }

    /// Write the HTML page to `path` (see [`html_path`]). Returns the path
    /// written.
    pub fn save_html(&self, path: &Path) -> RenderResult<PathBuf> {
        let path = html_path(path);
        let file = std::fs::File::create(&path)?;
        self.write_html(std::io::BufWriter::new(file))?;
        Ok(path)
    }

    /// Save to the temp directory and hand the page to the system viewer.
    pub fn show(&self) -> RenderResult<PathBuf> {
        let path = std::env::temp_dir().join(format!("sankeyflow-{}.html", std::process::id()));
        let path = self.save_html(&path)?;
        open_in_viewer(&path)?;
        Ok(path)
    }
}

/// `path` with `.html` appended unless it already ends in `.html`/`.htm`.
///
/// Other dots are kept: `grades.v2` becomes `grades.v2.html`.
pub fn html_path(path: &Path) -> PathBuf {
    let is_html = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("html") || e.eq_ignore_ascii_case("htm"));
    if is_html {
        return path.to_path_buf();
    }

    let mut name = path.as_os_str().to_owned();
    name.push(".html");
    PathBuf::from(name)
}

fn html_escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn open_in_viewer(path: &Path) -> std::io::Result<()> {
    #[cfg(target_os = "macos")]
    let mut command = std::process::Command::new("open");
    #[cfg(target_os = "windows")]
    let mut command = {
        let mut c = std::process::Command::new("cmd");
        c.args(["/C", "start", ""]);
        c
    };
    #[cfg(not(any(target_os = "macos", target_os = "windows")))]
    let mut command = std::process::Command::new("xdg-open");

    command.arg(path).spawn()?;
    Ok(())
}
