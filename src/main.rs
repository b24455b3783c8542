//! Catalog-Harvest main entry point
//!
//! This is the command-line interface for the catalog listing harvester.

use catalog_harvest::config::{load_config_with_hash, validate, Config};
use catalog_harvest::harvest::{batches, harvest, page_url};
use catalog_harvest::output::print_statistics;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use url::Url;

/// Catalog-Harvest: a fault-tolerant catalog listing harvester
///
/// Catalog-Harvest fetches a paginated search listing in concurrent batches,
/// retries failing pages with exponential backoff, and writes every record
/// it finds to a CSV dataset.
#[derive(Parser, Debug)]
#[command(name = "catalog-harvest")]
#[command(version = "1.0.0")]
#[command(about = "A fault-tolerant catalog listing harvester", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be harvested without fetching anything
    #[arg(long)]
    dry_run: bool,

    /// Override the number of pages to fetch
    #[arg(long, value_name = "N")]
    total_pages: Option<u32>,

    /// Override the number of pages fetched per batch
    #[arg(long, value_name = "N")]
    concurrency: Option<u32>,

    /// Override the CSV output path
    #[arg(short, long, value_name = "PATH")]
    output: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (mut config, config_hash) = match load_config_with_hash(&cli.config) {
        Ok((cfg, hash)) => {
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            (cfg, hash)
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    if apply_overrides(&mut config, &cli) {
        validate(&config)?;
    }

    if cli.dry_run {
        handle_dry_run(&config)?;
    } else {
        handle_harvest(&config, &config_hash).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("catalog_harvest=info,warn"),
            1 => EnvFilter::new("catalog_harvest=debug,info"),
            2 => EnvFilter::new("catalog_harvest=trace,debug"),
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

/// Applies command-line overrides; returns true if anything changed
fn apply_overrides(config: &mut Config, cli: &Cli) -> bool {
    let mut changed = false;

    if let Some(total_pages) = cli.total_pages {
        config.harvest.total_pages = total_pages;
        changed = true;
    }
    if let Some(concurrency) = cli.concurrency {
        config.harvest.concurrency = concurrency;
        changed = true;
    }
    if let Some(output) = &cli.output {
        config.output.csv_path = output.clone();
        changed = true;
    }

    changed
}

/// Handles the --dry-run mode: validates config and shows the batch plan
fn handle_dry_run(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Catalog-Harvest Dry Run ===\n");

    let base_url = Url::parse(&config.source.base_url)?;

    println!("Source:");
    println!("  Base URL: {}", base_url);
    println!("  First page: {}", page_url(&base_url, 1));
    println!("  Result selector: {}", config.source.selectors.result);

    println!("\nHarvest Configuration:");
    println!("  Total pages: {}", config.harvest.total_pages);
    println!("  Concurrency: {}", config.harvest.concurrency);
    println!(
        "  Max attempts per page: {}",
        config.harvest.max_attempts_per_page
    );
    println!(
        "  Backoff: {}^attempt + up to {}s jitter",
        config.harvest.backoff_base, config.harvest.jitter_max
    );
    println!(
        "  Content wait timeout: {}ms",
        config.harvest.content_wait_timeout_ms
    );

    println!("\nUser Agent:");
    println!("  {}", config.user_agent.user_agent_string());

    println!("\nOutput:");
    println!("  CSV: {}", config.output.csv_path);
    if let Some(summary_path) = &config.output.summary_path {
        println!("  Summary: {}", summary_path);
    }

    let plan = batches(config.harvest.total_pages, config.harvest.concurrency);
    println!("\nBatches ({}):", plan.len());
    for batch in &plan {
        println!("  - pages {}..={}", batch.start(), batch.end());
    }

    println!("\n✓ Configuration is valid");
    println!(
        "✓ Would fetch {} pages in {} batches",
        config.harvest.total_pages,
        plan.len()
    );

    Ok(())
}

/// Handles the main harvest operation
async fn handle_harvest(
    config: &Config,
    config_hash: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!(
        "Harvesting {} pages from {} ({} at a time)",
        config.harvest.total_pages,
        config.source.base_url,
        config.harvest.concurrency
    );

    match harvest(config, Some(config_hash)).await {
        Ok(report) => {
            tracing::info!(
                "Harvest completed: {} records written to {}",
                report.dataset.record_count(),
                config.output.csv_path
            );
            println!();
            print_statistics(&report.statistics);
            Ok(())
        }
        Err(e) => {
            tracing::error!("Harvest failed: {}", e);
            Err(e.into())
        }
    }
}
