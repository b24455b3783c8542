//! Batch result aggregation

use crate::dataset::{Dataset, PageResult};

/// Accumulates batch results into the run's `Dataset`
///
/// Batches are absorbed only after their barrier, so the dataset is never
/// written to while page attempts are in flight.
#[derive(Debug, Default)]
pub struct Aggregator {
    pages: Vec<PageResult>,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one finished batch in page-number order
    pub fn absorb_batch(&mut self, mut batch: Vec<PageResult>) {
        batch.sort_by_key(|page| page.page_number);
        self.pages.extend(batch);
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn finish(self) -> Dataset {
        Dataset::new(self.pages)
    }
}
