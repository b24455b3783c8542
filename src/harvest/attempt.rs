//! Per-page retry loop
//!
//! Wraps `PageFetcher` with `RetryPolicy`. The loop never fails: a page
//! whose attempts are all exhausted comes back as an empty `PageResult`.

use crate::browser::PageQuery;
use crate::dataset::PageResult;
use crate::harvest::fetcher::{page_url, PageFetcher};
use crate::harvest::retry::{jitter_rng, RetryPolicy};
use crate::state::AttemptState;
use tracing::Instrument;
use url::Url;

/// Best-effort fetch of one logical page number
#[derive(Debug, Clone)]
pub struct AttemptLoop {
    fetcher: PageFetcher,
    policy: RetryPolicy,
    base_url: Url,
    jitter_seed: Option<u64>,
}

impl AttemptLoop {
    pub fn new(
        fetcher: PageFetcher,
        policy: RetryPolicy,
        base_url: Url,
        jitter_seed: Option<u64>,
    ) -> Self {
        Self {
            fetcher,
            policy,
            base_url,
            jitter_seed,
        }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Fetches `page_number` on `page`, retrying with backoff
    ///
    /// The first attempt that completes is terminal, even when it extracted
    /// no records. After `max_attempts` failures the page is logged as
    /// skipped and an empty result is returned.
    pub async fn run_with_retry<P: PageQuery>(
        &self,
        page: &mut P,
        page_number: u32,
    ) -> PageResult {
        let span = tracing::info_span!("page", number = page_number);
        self.attempt(page, page_number).instrument(span).await
    }

    async fn attempt<P: PageQuery>(&self, page: &mut P, page_number: u32) -> PageResult {
        let url = page_url(&self.base_url, page_number);
        let mut rng = jitter_rng(self.jitter_seed, page_number);
        let mut state = AttemptState::new(page_number, self.policy.max_attempts);

        tracing::info!("Scraping page {}...", page_number);

        loop {
            let attempt = state.attempt_index;

            match self.fetcher.fetch_page(page, &url).await {
                Ok(records) => {
                    state.succeed();
                    tracing::info!(
                        "Finished scraping page {} ({} records, attempt {})",
                        page_number,
                        records.len(),
                        attempt
                    );
                    return PageResult::succeeded(page_number, records, state.attempts_made());
                }
                Err(e) => {
                    tracing::warn!("Attempt {} failed for page {}: {}", attempt, page_number, e);

                    if !state.fail(self.policy.should_retry(attempt)) {
                        tracing::error!(
                            "Page {} skipped after {} failed attempts",
                            page_number,
                            attempt
                        );
                        return PageResult::exhausted(page_number, attempt);
                    }

                    let delay = self.policy.backoff_delay(attempt, &mut rng);
                    tracing::info!(
                        "Retrying page {} after {:.1} seconds...",
                        page_number,
                        delay.as_secs_f64()
                    );
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }
}
