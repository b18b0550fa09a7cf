//! classfetch CLI
//!
//! Fetches Doom class names from the ZDoom wiki and generates a C++
//! header with class categories, backed by a persistent page cache.

use std::path::PathBuf;

use clap::Parser;
use classfetch::{config::Config, error::Result, pipeline};

/// classfetch - ZDoom wiki class scraper and header generator
#[derive(Parser, Debug)]
#[command(name = "classfetch", version, about = "Fetch Doom class names from the ZDoom wiki and generate a C++ header with categories (with caching)")]
struct Cli {
    /// Path to an optional TOML configuration file
    #[arg(long, default_value = "classfetch.toml")]
    config: PathBuf,

    /// Base name for the output file (without extension)
    #[arg(short, long)]
    output: Option<String>,

    /// Copy the generated file to the specified directory
    #[arg(long)]
    copy_to: Option<PathBuf>,

    /// Delay (in seconds) between each uncached class-page request
    #[arg(short, long)]
    sleep: Option<f64>,

    /// Directory to store cache files
    #[arg(long)]
    cache_dir: Option<PathBuf>,

    /// Cache time-to-live in hours
    #[arg(long)]
    cache_ttl: Option<u64>,

    /// Force refresh all cached data
    #[arg(long)]
    force_refresh: bool,

    /// Clear all cached data before running
    #[arg(long)]
    clear_cache: bool,

    /// Fetch DoomEd numbers, Spawn IDs, and Identifiers per class
    #[arg(long)]
    with_metadata: bool,

    /// Cross-check categories against the canonical class index
    #[arg(long)]
    cross_check: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Merge CLI overrides into the loaded configuration.
fn apply_overrides(config: &mut Config, cli: &Cli) {
    if let Some(output) = &cli.output {
        config.output.base = output.clone();
    }
    if let Some(sleep) = cli.sleep {
        config.fetch.sleep_secs = sleep;
    }
    if let Some(cache_dir) = &cli.cache_dir {
        config.cache.dir = cache_dir.display().to_string();
    }
    if let Some(cache_ttl) = cli.cache_ttl {
        config.cache.ttl_hours = cache_ttl;
    }
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut config = Config::load_or_default(&cli.config);
    apply_overrides(&mut config, &cli);
    config.validate()?;

    let options = pipeline::RunOptions {
        force_refresh: cli.force_refresh,
        clear_cache: cli.clear_cache,
        with_metadata: cli.with_metadata,
        cross_check: cli.cross_check,
        copy_to: cli.copy_to,
    };

    if let Err(e) = pipeline::run(&config, &options).await {
        log::error!("Error: {e}");
        return Err(e);
    }

    log::info!("Done!");
    Ok(())
}
