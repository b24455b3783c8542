//! Harvest module: the fault-tolerant page-fetch pipeline
//!
//! This module contains the core harvesting logic, including:
//! - Retry decisions with exponential backoff and jitter
//! - Single page-scrape attempts and record extraction
//! - The per-page retry loop
//! - Batch scheduling and result aggregation

mod aggregator;
mod attempt;
mod fetcher;
pub mod retry;
mod scheduler;

#[cfg(test)]
pub(crate) mod testing;

pub use aggregator::Aggregator;
pub use attempt::AttemptLoop;
pub use fetcher::{page_url, PageFetcher};
pub use retry::{backoff_delay, should_retry, RetryPolicy};
pub use scheduler::{batches, Scheduler};

use crate::browser::{Browser, HttpBrowser};
use crate::config::{validate, Config};
use crate::dataset::Dataset;
use crate::output::{generate_markdown_summary, CsvSink, HarvestStatistics, HarvestSummary, Sink};
use crate::{ConfigError, HarvestError};
use chrono::Utc;
use std::path::Path;
use url::Url;

/// Outcome of a complete harvest run
#[derive(Debug, Clone)]
pub struct HarvestReport {
    pub dataset: Dataset,
    pub statistics: HarvestStatistics,
}

/// Builds a scheduler for `config` on top of `browser`
pub fn build_scheduler<B: Browser>(
    browser: B,
    config: &Config,
) -> Result<Scheduler<B>, ConfigError> {
    let base_url = Url::parse(&config.source.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base_url: {}", e)))?;

    let attempt_loop = AttemptLoop::new(
        PageFetcher::from_config(&config.source.selectors, &config.harvest),
        RetryPolicy::from_config(&config.harvest),
        base_url,
        config.harvest.jitter_seed,
    );

    Ok(Scheduler::new(browser, attempt_loop))
}

/// Runs a complete harvest operation
///
/// This is the main entry point for a run. It will:
/// 1. Build the HTTP page backend
/// 2. Fetch every configured page in concurrent batches
/// 3. Write the dataset to the configured CSV file
/// 4. Write the markdown summary, if one is configured
///
/// The configuration is validated first, so a config built in code is held
/// to the same rules as one loaded from a file. Page failures never fail
/// the run; only setup and output errors do.
///
/// # Arguments
///
/// * `config` - The harvest configuration
/// * `config_hash` - Hash of the configuration file, recorded in the summary
pub async fn harvest(
    config: &Config,
    config_hash: Option<&str>,
) -> Result<HarvestReport, HarvestError> {
    validate(config)?;

    let browser = HttpBrowser::new(&config.user_agent, &config.harvest)?;
    let scheduler = build_scheduler(browser, config)?;

    let started_at = Utc::now();
    let dataset = scheduler
        .run(config.harvest.total_pages, config.harvest.concurrency)
        .await;
    let finished_at = Utc::now();

    CsvSink::new(&config.output.csv_path).write(&dataset)?;

    let statistics = HarvestStatistics::from_dataset(&dataset, started_at, finished_at);

    if let Some(summary_path) = &config.output.summary_path {
        let summary = HarvestSummary {
            source_url: config.source.base_url.clone(),
            csv_path: config.output.csv_path.clone(),
            config_hash: config_hash.map(str::to_string),
            statistics: statistics.clone(),
        };
        generate_markdown_summary(&summary, Path::new(summary_path))?;
        tracing::info!("Summary written to {}", summary_path);
    }

    Ok(HarvestReport {
        dataset,
        statistics,
    })
}
