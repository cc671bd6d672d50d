use std::path::PathBuf;

use anyhow::{Context, Result};
use cit2select::{convert, ConvertOptions, EntryOrder, FallbackTable, MarkerMatch};
use clap::Parser;
use tracing::info;

#[derive(Parser)]
#[command(name = "cit2select")]
#[command(author, version, about = "Convert OptiFine CIT item textures into custom_name select models", long_about = None)]
struct Cli {
    /// Resource pack directory to read
    #[arg(short, long, default_value = "./input")]
    input: PathBuf,
    /// Directory the converted pack is written to
    #[arg(short, long, default_value = "./output")]
    output: PathBuf,
    /// JSON object of extra `{"base_name": "fallback model"}` entries
    #[arg(long)]
    fallbacks: Option<PathBuf>,
    /// Visit directory entries sorted by name instead of filesystem order
    #[arg(long)]
    sorted: bool,
    /// Only treat `cit` directories under a path component named exactly `optifine`
    #[arg(long)]
    strict_marker: bool,
    /// Log skipped declarations and copied files
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .init();

    let fallbacks = match &cli.fallbacks {
        Some(path) => {
            let table = FallbackTable::from_json_file(path)
                .with_context(|| format!("Failed to load fallback table {}", path.display()))?;
            info!("Loaded {} fallback entries from {}", table.len(), path.display());
            table
        }
        None => FallbackTable::default(),
    };

    let options = ConvertOptions {
        input: cli.input,
        output: cli.output,
        fallbacks,
        order: if cli.sorted {
            EntryOrder::Sorted
        } else {
            EntryOrder::Native
        },
        marker: if cli.strict_marker {
            MarkerMatch::Segment
        } else {
            MarkerMatch::Substring
        },
    };

    convert(&options).with_context(|| {
        format!(
            "Conversion of {} into {} failed",
            options.input.display(),
            options.output.display()
        )
    })?;
    Ok(())
}
