use crate::config::{Canvas, load_config};
use crate::layout::compute_layout;
use crate::layout_dump::write_layout_dump;
use crate::text_metrics::{EstimatedMetrics, TextMeasure};
use crate::words::WordCounts;
use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "wcl", version, about = "Collision-free word cloud layout")]
pub struct Args {
    /// Input file or '-' for stdin
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,

    /// Input format
    #[arg(short = 'f', long = "format", value_enum, default_value = "counts")]
    pub format: InputFormat,

    /// Output file for the layout JSON. Defaults to stdout.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Config JSON/JSON5 file with layout overrides
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,

    /// Canvas width
    #[arg(short = 'w', long = "width")]
    pub width: Option<f32>,

    /// Canvas height
    #[arg(short = 'H', long = "height")]
    pub height: Option<f32>,

    /// Canvas margin
    #[arg(short = 'm', long = "margin")]
    pub margin: Option<f32>,

    /// Seed for reproducible layouts
    #[arg(long = "seed")]
    pub seed: Option<u64>,

    /// Measure text with an installed font instead of the estimate
    #[arg(long = "font-family")]
    pub font_family: Option<String>,

    /// Shortest token kept when reading transcript text
    #[arg(long = "min-word-length", default_value_t = 3)]
    pub min_word_length: usize,

    /// More log output (-v debug, -vv trace)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    /// JSON object of word counts, optionally wrapped in `word_counts`
    Counts,
    /// Raw transcript text to tokenize
    Text,
}

pub fn run() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let mut config = load_config(args.config.as_deref())?;
    config.canvas = Canvas::new(
        args.width.unwrap_or(config.canvas.width),
        args.height.unwrap_or(config.canvas.height),
        args.margin.unwrap_or(config.canvas.margin),
    )?;

    let input = read_input(args.input.as_deref())?;
    let words = match args.format {
        InputFormat::Counts => WordCounts::from_json(&input).context("reading word counts")?,
        InputFormat::Text => WordCounts::from_text(&input, args.min_word_length),
    };
    tracing::info!(words = words.len(), "loaded input");

    let metrics: Box<dyn TextMeasure> =
        match select_metrics(args.font_family.as_deref(), config.text.char_height_factor) {
            Some(metrics) => metrics,
            None => Box::new(EstimatedMetrics::from(&config.text)),
        };
    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let layout = compute_layout(&words, &config, metrics.as_ref(), &mut rng);
    tracing::info!(
        placed = layout.labels.len(),
        dropped = layout.stats.dropped,
        unplaced = layout.stats.unplaced,
        "layout complete"
    );
    write_layout_dump(args.output.as_deref(), &layout)
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

#[cfg(feature = "fonts")]
fn select_metrics(
    font_family: Option<&str>,
    char_height_factor: f32,
) -> Option<Box<dyn TextMeasure>> {
    let family = font_family?;
    match crate::text_metrics::FontMetrics::load(family, char_height_factor) {
        Some(metrics) => Some(Box::new(metrics)),
        None => {
            tracing::warn!(family, "font not found, falling back to estimated metrics");
            None
        }
    }
}

#[cfg(not(feature = "fonts"))]
fn select_metrics(font_family: Option<&str>, _: f32) -> Option<Box<dyn TextMeasure>> {
    if let Some(family) = font_family {
        tracing::warn!(family, "built without font support, using estimated metrics");
    }
    None
}

fn read_input(path: Option<&Path>) -> Result<String> {
    if let Some(path) = path
        && path != Path::new("-")
    {
        return std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()));
    }
    let mut buf = String::new();
    io::stdin().read_to_string(&mut buf)?;
    Ok(buf)
}
