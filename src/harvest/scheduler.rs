//! Batch scheduler for listing pages
//!
//! This module handles:
//! - Partitioning the page range into fixed-size batches
//! - Acquiring one page handle per page in a batch
//! - Running the batch's attempt loops concurrently behind a barrier
//! - Releasing every handle before the next batch starts
//!
//! At most `concurrency` page handles exist at any time.

use crate::browser::{Browser, PageQuery};
use crate::dataset::{Dataset, PageResult};
use crate::harvest::aggregator::Aggregator;
use crate::harvest::attempt::AttemptLoop;
use futures::future::join_all;
use std::ops::RangeInclusive;

/// Splits `[1, total_pages]` into contiguous batches of `concurrency` pages
///
/// The last batch may be smaller. A zero `concurrency` is treated as 1.
pub fn batches(total_pages: u32, concurrency: u32) -> Vec<RangeInclusive<u32>> {
    let size = concurrency.max(1);
    let mut batches = Vec::new();
    let mut start = 1u32;

    while start <= total_pages {
        let end = start.saturating_add(size - 1).min(total_pages);
        batches.push(start..=end);
        if end == u32::MAX {
            break;
        }
        start = end + 1;
    }

    batches
}

/// Runs attempt loops batch by batch
pub struct Scheduler<B: Browser> {
    browser: B,
    attempt_loop: AttemptLoop,
}

impl<B: Browser> Scheduler<B> {
    pub fn new(browser: B, attempt_loop: AttemptLoop) -> Self {
        Self {
            browser,
            attempt_loop,
        }
    }

    pub fn browser(&self) -> &B {
        &self.browser
    }

    /// Fetches every page in `[1, total_pages]`
    ///
    /// Returns exactly one `PageResult` per page number. Batches run strictly
    /// one after the other; within a batch results are in page order.
    pub async fn run(&self, total_pages: u32, concurrency: u32) -> Dataset {
        let batches = batches(total_pages, concurrency);
        let batch_count = batches.len();
        let mut aggregator = Aggregator::new();

        tracing::info!(
            "Harvesting {} pages in {} batches of up to {}",
            total_pages,
            batch_count,
            concurrency.max(1)
        );

        for (index, batch) in batches.into_iter().enumerate() {
            tracing::info!(
                "Batch {}/{}: pages {}-{}",
                index + 1,
                batch_count,
                batch.start(),
                batch.end()
            );

            let results = self.run_batch(batch).await;
            let records: usize = results.iter().map(|page| page.records.len()).sum();
            aggregator.absorb_batch(results);

            tracing::info!(
                "Batch {}/{} complete: {} records, {} pages so far",
                index + 1,
                batch_count,
                records,
                aggregator.page_count()
            );
        }

        aggregator.finish()
    }

    async fn run_batch(&self, pages: RangeInclusive<u32>) -> Vec<PageResult> {
        let mut handles: Vec<(u32, Option<B::Page>)> = Vec::new();
        for page_number in pages {
            let handle = match self.browser.new_page().await {
                Ok(page) => Some(page),
                Err(e) => {
                    tracing::error!("Page {} skipped: {}", page_number, e);
                    None
                }
            };
            handles.push((page_number, handle));
        }

        let attempts = handles.iter_mut().map(|(page_number, handle)| {
            let page_number = *page_number;
            async move {
                match handle {
                    Some(page) => self.attempt_loop.run_with_retry(page, page_number).await,
                    None => PageResult::exhausted(page_number, 0),
                }
            }
        });
        let results = join_all(attempts).await;

        for (page_number, handle) in handles {
            if let Some(page) = handle {
                if let Err(e) = page.close().await {
                    tracing::warn!("Failed to release page {}: {}", page_number, e);
                }
            }
        }

        results
    }
}
