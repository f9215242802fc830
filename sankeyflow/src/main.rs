//! sankeyflow CLI - Sankey diagrams from categorical CSV files
//!
//! ```bash
//! sankeyflow render grades.csv -o grades          # grades.html
//! sankeyflow render grades.csv --color --json     # Plotly figure on stdout
//! sankeyflow labels grades.csv                    # node index → label
//! sankeyflow paths grades.csv                     # distinct paths with counts
//! sankeyflow palettes                             # built-in palette names
//! ```

use clap::{Args, Parser, Subcommand};
use sankeyflow::config::PipelineOptions;
use sankeyflow::logs::{log_step, log_success, Step, LOG_BROADCASTER};
use sankeyflow::transform::format_delimiter;
use sankeyflow::palette::parse_palette_definition;
use sankeyflow::{
    sankey_from_csv, BuiltinPalettes, EdgeWindow, LinkColoring, Normalization, PaletteOverflow, PaletteProvider,
    SankeyResult,
};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "sankeyflow")]
#[command(about = "Turn categorical stage-by-stage CSV data into Sankey diagrams", long_about = None)]
struct Cli {
    /// Only print results and errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the diagram and write it as HTML (or figure JSON)
    Render {
        /// Input CSV file
        input: PathBuf,

        #[command(flatten)]
        pipeline: PipelineArgs,

        /// Output file; ".html" is appended unless it ends in .html/.htm (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Write the Plotly figure JSON instead of HTML
        #[arg(long)]
        json: bool,

        /// Open the diagram in the system viewer
        #[arg(long)]
        show: bool,

        /// Diagram title
        #[arg(long)]
        title: Option<String>,
    },

    /// Print the node labels with their indices
    Labels {
        /// Input CSV file
        input: PathBuf,

        #[command(flatten)]
        pipeline: PipelineArgs,
    },

    /// Print the distinct paths with their counts as JSON
    Paths {
        /// Input CSV file
        input: PathBuf,

        #[command(flatten)]
        pipeline: PipelineArgs,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// List palettes: custom ones from --config/--define-palette, then built-in
    Palettes {
        #[command(flatten)]
        pipeline: PipelineArgs,
    },
}

#[derive(Args, Debug, Clone, Default)]
struct PipelineArgs {
    /// JSON options file
    #[arg(long)]
    config: Option<PathBuf>,

    /// CSV delimiter (auto-detect if not specified)
    #[arg(short, long)]
    delimiter: Option<char>,

    /// Characters to merge into one group, e.g. "AB" (repeat, paired with --group)
    #[arg(long)]
    combine: Vec<String>,

    /// Replacement value for the matching --combine (repeat)
    #[arg(long)]
    group: Vec<String>,

    /// Color links by the first node of their path
    #[arg(long)]
    color: bool,

    /// Palette for link colors (implies --color)
    #[arg(long)]
    palette: Option<String>,

    /// Link color alpha in [0, 1] (implies --color)
    #[arg(long)]
    alpha: Option<f64>,

    /// Color nodes from their link colors
    #[arg(long)]
    node_colors: bool,

    /// Node color alpha in [0, 1] (implies --node-colors)
    #[arg(long)]
    node_alpha: Option<f64>,

    /// Drop each path's last transition (legacy output)
    #[arg(long)]
    legacy_edges: bool,

    /// Gray instead of repeating colors when the palette runs out
    #[arg(long)]
    neutral_overflow: bool,

    /// Extra palette as NAME=COLOR;COLOR... (hex, rgb() or rgba(); repeat)
    #[arg(long, value_name = "NAME=COLORS")]
    define_palette: Vec<String>,

    /// Joins a value and its stage name in node labels (default "_")
    #[arg(long)]
    separator: Option<String>,
}

impl PipelineArgs {
    /// Defaults < config file < environment < flags.
    fn resolve(&self) -> Result<PipelineOptions, Box<dyn std::error::Error>> {
        let base = match self.config {
            Some(ref path) => PipelineOptions::from_file(path)?,
            None => PipelineOptions::default(),
        };
        let mut options = base.apply_env()?;

        if let Some(d) = self.delimiter {
            options.delimiter = Some(d);
        }
        if let Some(ref separator) = self.separator {
            options.label_separator = separator.clone();
        }
        for definition in &self.define_palette {
            let (name, colors) = parse_palette_definition(definition)?;
            options.custom_palettes.insert(name, colors);
        }
        if !self.combine.is_empty() || !self.group.is_empty() {
            options.normalization = Some(Normalization {
                combine: self.combine.clone(),
                group: self.group.clone(),
            });
        }

        if self.color || self.palette.is_some() || self.alpha.is_some() || self.neutral_overflow {
            let coloring = options.coloring.get_or_insert_with(LinkColoring::default);
            if let Some(ref palette) = self.palette {
                coloring.palette = palette.clone();
            }
            if let Some(alpha) = self.alpha {
                coloring.alpha = alpha;
            }
            if self.neutral_overflow {
                coloring.overflow = PaletteOverflow::Neutral;
            }
        }

        if self.node_colors || self.node_alpha.is_some() {
            options.node_colors = true;
        }
        if self.node_alpha.is_some() {
            options.node_alpha = self.node_alpha;
        }
        if self.legacy_edges {
            options.edge_window = EdgeWindow::Legacy;
        }

        options.validate()?;
        Ok(options)
    }
}

fn main() {
    // Load .env file (if present)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    if cli.quiet {
        LOG_BROADCASTER.set_echo(false);
    }

    let result = match cli.command {
        Commands::Render {
            input,
            pipeline,
            output,
            json,
            show,
            title,
        } => cmd_render(&input, &pipeline, output.as_deref(), json, show, title),

        Commands::Labels { input, pipeline } => cmd_labels(&input, &pipeline),

        Commands::Paths { input, pipeline, output } => cmd_paths(&input, &pipeline, output.as_deref()),

        Commands::Palettes { pipeline } => cmd_palettes(&pipeline),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run_pipeline(input: &Path, options: &PipelineOptions) -> Result<SankeyResult, Box<dyn std::error::Error>> {
    let (info, result) = sankey_from_csv(input, options, &BuiltinPalettes)?;
    log_success(format!(
        "{} rows, {} columns, delimiter '{}'",
        info.row_count,
        info.headers.len(),
        format_delimiter(info.delimiter)
    ));
    Ok(result)
}

fn cmd_render(
    input: &Path,
    pipeline: &PipelineArgs,
    output: Option<&Path>,
    json: bool,
    show: bool,
    title: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut options = pipeline.resolve()?;
    if title.is_some() {
        options.title = title;
    }

    let result = run_pipeline(input, &options)?;
    let diagram = &result.diagram;

    if json {
        let figure = serde_json::to_string_pretty(&diagram.checked_figure()?)?;
        write_output(&figure, output)?;
    } else if let Some(path) = output {
        let written = diagram.save_html(path)?;
        log_step(Step::Render, format!("💾 Diagram written to: {}", written.display()));
    } else if !show {
        diagram.write_html(std::io::stdout().lock())?;
    }

    if show {
        let path = diagram.show()?;
        log_step(Step::Render, format!("opened {}", path.display()));
    }

    Ok(())
}

fn cmd_labels(input: &Path, pipeline: &PipelineArgs) -> Result<(), Box<dyn std::error::Error>> {
    let options = pipeline.resolve()?;
    let result = run_pipeline(input, &options)?;

    for (i, label) in result.diagram.labels.iter().enumerate() {
        println!("{:>4}  {}", i, label);
    }
    Ok(())
}

fn cmd_paths(input: &Path, pipeline: &PipelineArgs, output: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let options = pipeline.resolve()?;
    let result = run_pipeline(input, &options)?;

    let json = serde_json::to_string_pretty(&result.paths.to_records())?;
    write_output(&json, output)?;
    Ok(())
}

fn cmd_palettes(pipeline: &PipelineArgs) -> Result<(), Box<dyn std::error::Error>> {
    let options = pipeline.resolve()?;
    let palettes = options.palettes(&BuiltinPalettes);
    for name in palettes.names() {
        let colors = palettes.palette(name)?;
        println!("{:<12} {:>2} colors", name, colors.len());
    }
    Ok(())
}

fn write_output(content: &str, path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    match path {
        Some(p) => {
            fs::write(p, content)?;
            log_success(format!("💾 Output written to: {}", p.display()));
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}
