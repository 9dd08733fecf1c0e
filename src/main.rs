use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use aniniscale::error::ConfigError;
use aniniscale::models::{parse_factor, AppConfig, FailurePolicy, RemainderPolicy};
use aniniscale::services::{Downscaler, ImageCodec, PngCodec};
use dominant_tiles::Factor;

/// Exit status for every failure, including bad arguments.
const EXIT_FAILURE: i32 = -1;

#[derive(Parser)]
#[command(name = "aniniscale", version)]
#[command(about = "Downscale pixel art by collapsing each block of pixels into its dominant color")]
struct Cli {
    /// Source columns per output pixel
    #[arg(allow_hyphen_values = true)]
    x_factor: String,

    /// Source rows per output pixel
    #[arg(allow_hyphen_values = true)]
    y_factor: String,

    /// Input image (any format the decoder understands)
    input: PathBuf,

    /// Output PNG path
    output: PathBuf,

    /// Further positional arguments are accepted and ignored
    #[arg(hide = true)]
    extra: Vec<String>,

    /// YAML configuration file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Hardware concurrency to plan for (default: number of CPUs)
    #[arg(long, value_name = "N")]
    threads: Option<usize>,

    /// Handling of pixels past the last whole section
    #[arg(long, value_enum)]
    remainder: Option<RemainderPolicy>,

    /// Handling of a section that fails
    #[arg(long, value_enum)]
    on_failure: Option<FailurePolicy>,

    /// Re-compress the output with oxipng
    #[arg(long)]
    optimize: bool,

    /// Only log warnings and errors
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Log per-worker detail
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            std::process::exit(if e.use_stderr() { EXIT_FAILURE } else { 0 });
        }
    };

    init_tracing(&cli);
    if !cli.extra.is_empty() {
        tracing::debug!(extra = ?cli.extra, "Ignoring extra arguments");
    }

    if let Err(e) = run(&cli) {
        eprintln!("error: {e:#}");
        std::process::exit(EXIT_FAILURE);
    }
}

fn init_tracing(cli: &Cli) {
    let level = if cli.quiet {
        "warn"
    } else if cli.verbose {
        "debug"
    } else {
        "info"
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(format!(
            "aniniscale={level},dominant_tiles={level}"
        )))
        .with(tracing_subscriber::fmt::layer().without_time())
        .init();
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let factor = Factor::new(parse_factor(&cli.x_factor)?, parse_factor(&cli.y_factor)?)
        .map_err(ConfigError::from)?;
    let config = load_config(cli).context("invalid configuration")?;
    let codec = PngCodec::new().optimize(config.optimize);

    let image = codec.open(&cli.input)?;
    tracing::info!(
        path = %cli.input.display(),
        width = image.width(),
        height = image.height(),
        format = %image.format(),
        "Opened image"
    );

    if factor.is_identity() {
        codec.save(&image, &cli.output)?;
        tracing::info!(path = %cli.output.display(), "Factor is 1x1, saved image unchanged");
        return Ok(());
    }

    let outcome = Downscaler::new(config)
        .downscale(&image, factor)
        .context("downscale failed")?;
    codec.save(&outcome.image, &cli.output)?;

    tracing::info!(
        path = %cli.output.display(),
        width = outcome.image.width(),
        height = outcome.image.height(),
        failed_sections = outcome.failed_sections.len(),
        "Saved downscaled image"
    );
    Ok(())
}

/// Configuration file values, overridden by command-line flags.
fn load_config(cli: &Cli) -> Result<AppConfig, ConfigError> {
    let mut config = match &cli.config {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::default(),
    };

    if cli.threads.is_some() {
        config.threads = cli.threads;
    }
    if let Some(remainder) = cli.remainder {
        config.remainder = remainder;
    }
    if let Some(on_failure) = cli.on_failure {
        config.on_failure = on_failure;
    }
    config.optimize |= cli.optimize;
    Ok(config)
}
