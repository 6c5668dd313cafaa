use crate::config::{Settings, load_settings, validate_dimensions};
use crate::ir::Graph;
use crate::render::{render_svg, write_output_svg};
use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use log::{LevelFilter, debug, info};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::str::FromStr;

#[derive(Parser, Debug)]
#[command(name = "gsvg", version, about = "Render a serialized graph to a static SVG document")]
pub struct Args {
    /// Input graph file (.json) or '-' for stdin
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,

    /// Output file (svg/png). Defaults to stdout for SVG if omitted.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(short = 'e', long = "outputFormat", value_enum, default_value = "svg")]
    pub output_format: OutputFormat,

    /// Settings file (JSON or JSON5)
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,

    /// Width, overrides the settings file
    #[arg(short = 'w', long = "width")]
    pub width: Option<f64>,

    /// Height, overrides the settings file
    #[arg(short = 'H', long = "height")]
    pub height: Option<f64>,

    /// Keep node positions as given instead of fitting them into the viewport
    #[arg(long = "no-rescale")]
    pub no_rescale: bool,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long = "log-level", default_value = "warn")]
    pub log_level: String,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum OutputFormat {
    Svg,
    Png,
}

pub fn run() -> Result<()> {
    let args = Args::parse();
    init_logger(&args.log_level);
    debug!(args:?; "Parsed arguments");

    let settings = build_settings(&args)?;
    let input = read_input(args.input.as_deref())?;
    let graph = Graph::from_json_str(&input)?;
    info!(nodes = graph.node_count(), edges = graph.edge_count(); "Loaded graph");

    let svg = render_svg(&graph, &settings)?;
    match args.output_format {
        OutputFormat::Svg => write_output_svg(&svg, args.output.as_deref())?,
        OutputFormat::Png => {
            let output = ensure_output(&args.output, "png")?;
            write_png(&svg, &output, &settings)?;
        }
    }
    Ok(())
}

fn init_logger(level: &str) {
    let level = LevelFilter::from_str(level).unwrap_or_else(|_| {
        eprintln!("Invalid log level: {level}. Using 'warn' instead.");
        LevelFilter::Warn
    });
    env_logger::Builder::from_env(env_logger::Env::default())
        .filter_level(level)
        .init();
}

fn build_settings(args: &Args) -> Result<Settings> {
    let mut settings = load_settings(args.config.as_deref())
        .with_context(|| "failed to load settings")?;
    if let Some(width) = args.width {
        settings.width = width;
    }
    if let Some(height) = args.height {
        settings.height = height;
    }
    if args.no_rescale {
        settings.rescale = false;
    }
    validate_dimensions(&settings)?;
    Ok(settings)
}

fn read_input(path: Option<&Path>) -> Result<String> {
    if let Some(path) = path {
        if path != Path::new("-") {
            return std::fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()));
        }
    }
    let mut buf = String::new();
    io::stdin().read_to_string(&mut buf)?;
    Ok(buf)
}

fn ensure_output(output: &Option<PathBuf>, ext: &str) -> Result<PathBuf> {
    if let Some(path) = output {
        return Ok(path.clone());
    }
    Err(anyhow::anyhow!("Output path required for {} output", ext))
}

#[cfg(feature = "png")]
fn write_png(svg: &str, output: &Path, settings: &Settings) -> Result<()> {
    crate::render::write_output_png(svg, output, settings)
}

#[cfg(not(feature = "png"))]
fn write_png(_svg: &str, _output: &Path, _settings: &Settings) -> Result<()> {
    Err(anyhow::anyhow!("PNG output requires the `png` feature"))
}
