//! Rep-Harvest main entry point
//!
//! This is the command-line interface for the Rep-Harvest exercise scraper.

use anyhow::{bail, Context};
use clap::Parser;
use rep_harvest::config::{load_or_default, CategoryConfig, Config};
use rep_harvest::crawler::Coordinator;
use rep_harvest::output::checkpoint_path;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Rep-Harvest: a polite exercise-library scraper
///
/// Rep-Harvest walks one category of an exercise library, extracts every
/// exercise it lists, and writes them out as an importable TypeScript data
/// module. Requests are issued one at a time with a pause in between.
#[derive(Parser, Debug)]
#[command(name = "rep-harvest")]
#[command(version = "1.0.0")]
#[command(about = "A polite exercise-library scraper", long_about = None)]
struct Cli {
    /// Category key to harvest (see --list)
    #[arg(value_name = "CATEGORY")]
    category: Option<String>,

    /// Path to an optional TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Print the known category keys and exit
    #[arg(long, conflicts_with = "dry_run")]
    list: bool,

    /// Validate config and show what would be harvested without fetching anything
    #[arg(long)]
    dry_run: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let config = load_or_default(cli.config.as_deref()).with_context(|| match &cli.config {
        Some(path) => format!("Failed to load configuration from {}", path.display()),
        None => "Invalid built-in configuration".to_string(),
    })?;

    let Some(key) = cli.category.as_deref().filter(|_| !cli.list) else {
        print_categories(&config);
        return Ok(());
    };

    let Some(category) = config.category(key) else {
        bail!(
            "Unknown category '{}'. Known categories: {}",
            key,
            config.category_keys().join(", ")
        );
    };

    if cli.dry_run {
        print_plan(&config, category);
        return Ok(());
    }

    handle_harvest(config, key).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("rep_harvest=info,warn"),
            1 => EnvFilter::new("rep_harvest=debug,info"),
            2 => EnvFilter::new("rep_harvest=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles --list, and a run without a category
fn print_categories(config: &Config) {
    println!("Available categories ({}):", config.categories.len());
    for category in &config.categories {
        println!("  {:<14} {}", category.key, category.url);
    }
}

/// Handles the --dry-run mode: shows what would be harvested
fn print_plan(config: &Config, category: &CategoryConfig) {
    let output_path = category.output_file(&config.output.directory);

    println!("=== Rep-Harvest Dry Run ===\n");

    println!("Category:");
    println!("  Key: {}", category.key);
    println!("  Listing: {}", category.url);
    println!("  Body part: {}", category.body_part);
    println!("  Id prefix: {}", category.id_prefix);

    println!("\nCrawler:");
    println!("  Politeness delay: {}ms", config.crawler.politeness_delay_ms);
    println!("  Request timeout: {}s", config.crawler.request_timeout_secs);
    println!(
        "  Attempts per call: {} (backoff {}ms)",
        config.crawler.max_attempts, config.crawler.backoff_ms
    );
    println!("  Failure ceiling: {}", config.crawler.failure_ceiling);
    println!(
        "  Checkpoint every {} exercises",
        config.crawler.checkpoint_interval
    );

    println!("\nOutput:");
    println!("  Module: {}", output_path.display());
    println!("  Export: {}", category.variable_name);
    println!("  Checkpoint: {}", checkpoint_path(&output_path).display());

    println!("\n✓ Configuration is valid");
}

/// Handles the main harvest operation
async fn handle_harvest(config: Config, key: &str) -> anyhow::Result<()> {
    let coordinator = Coordinator::new(config, key)?;
    let checkpoint = coordinator.checkpoint();
    if checkpoint.exists() {
        tracing::warn!(
            "Found {} from an incomplete previous run; it will be overwritten",
            checkpoint.path().display()
        );
    }

    match coordinator.run().await {
        Ok(summary) => {
            match &summary.output_path {
                Some(path) => tracing::info!("Harvest complete: {}", path.display()),
                None => tracing::warn!("Nothing was harvested for '{}'", summary.category),
            }
            if summary.stopped_early {
                tracing::warn!("The run stopped early; the module holds a partial harvest");
            }
            Ok(())
        }
        Err(e) => {
            tracing::error!("Harvest failed: {}", e);
            Err(e.into())
        }
    }
}
