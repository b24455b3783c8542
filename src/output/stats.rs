//! Run statistics
//!
//! This module derives summary numbers from a finished dataset and prints
//! them at the end of a run.

use crate::dataset::{Dataset, PageOutcome};
use chrono::{DateTime, Utc};

/// Harvest run statistics
#[derive(Debug, Clone, PartialEq)]
pub struct HarvestStatistics {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,

    /// Pages in the dataset (always the configured page count)
    pub total_pages: u64,

    /// Succeeded with at least one record
    pub pages_with_records: u64,

    /// Succeeded without records
    pub pages_empty: u64,

    /// Every attempt failed
    pub pages_exhausted: u64,

    /// Succeeded after at least one failed attempt
    pub pages_retried: u64,

    pub total_attempts: u64,
    pub total_records: u64,

    /// Page numbers that were skipped, ascending
    pub skipped_pages: Vec<u32>,
}

impl HarvestStatistics {
    /// Computes statistics for `dataset`
    pub fn from_dataset(
        dataset: &Dataset,
        started_at: DateTime<Utc>,
        finished_at: DateTime<Utc>,
    ) -> Self {
        let mut stats = Self {
            started_at,
            finished_at,
            total_pages: 0,
            pages_with_records: 0,
            pages_empty: 0,
            pages_exhausted: 0,
            pages_retried: 0,
            total_attempts: 0,
            total_records: 0,
            skipped_pages: Vec::new(),
        };

        for page in dataset.pages() {
            stats.total_pages += 1;
            stats.total_attempts += u64::from(page.attempts);
            stats.total_records += page.records.len() as u64;

            match page.outcome {
                PageOutcome::Succeeded if page.records.is_empty() => stats.pages_empty += 1,
                PageOutcome::Succeeded => stats.pages_with_records += 1,
                PageOutcome::Exhausted => {
                    stats.pages_exhausted += 1;
                    stats.skipped_pages.push(page.page_number);
                }
            }

            if page.outcome == PageOutcome::Succeeded && page.attempts > 1 {
                stats.pages_retried += 1;
            }
        }

        stats.skipped_pages.sort_unstable();
        stats
    }

    pub fn duration_seconds(&self) -> i64 {
        (self.finished_at - self.started_at).num_seconds().max(0)
    }

    /// Share of pages that were not skipped, as a percentage
    pub fn success_rate(&self) -> f64 {
        if self.total_pages == 0 {
            return 0.0;
        }
        ((self.total_pages - self.pages_exhausted) as f64 / self.total_pages as f64) * 100.0
    }
}

/// Prints statistics to stdout in a human-readable format
pub fn print_statistics(stats: &HarvestStatistics) {
    println!("=== Harvest Statistics ===\n");

    println!("Duration: {} seconds", stats.duration_seconds());
    println!("Total Pages: {}", stats.total_pages);
    println!("Total Records: {}", stats.total_records);
    println!("Total Attempts: {}", stats.total_attempts);
    println!("Success Rate: {:.2}%", stats.success_rate());

    println!("\nPages by Outcome:");
    println!("  with records: {}", stats.pages_with_records);
    println!("  empty: {}", stats.pages_empty);
    println!("  exhausted: {}", stats.pages_exhausted);
    println!("  retried: {}", stats.pages_retried);

    if !stats.skipped_pages.is_empty() {
        let pages: Vec<String> = stats.skipped_pages.iter().map(u32::to_string).collect();
        println!("\nSkipped Pages: {}", pages.join(", "));
    }
}
