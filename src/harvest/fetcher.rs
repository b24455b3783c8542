//! Single page-scrape attempt
//!
//! One attempt navigates a page handle to the listing URL, waits for the
//! result elements, and reads four fields from each element:
//! - a missing field becomes `N/A`
//! - a failing element is logged and skipped
//! - navigation failures and content timeouts fail the attempt

use crate::browser::{ElementHandle, PageQuery};
use crate::config::{HarvestConfig, SelectorConfig};
use crate::dataset::Record;
use crate::{FetchError, FieldError};
use std::time::Duration;
use url::Url;

/// Builds the URL of one listing page
///
/// The `page` query parameter is appended to `base_url`, replacing any
/// `page` parameter already present.
pub fn page_url(base_url: &Url, page_number: u32) -> Url {
    let retained: Vec<(String, String)> = base_url
        .query_pairs()
        .filter(|(key, _)| key != "page")
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();

    let mut url = base_url.clone();
    url.query_pairs_mut()
        .clear()
        .extend_pairs(retained)
        .append_pair("page", &page_number.to_string());
    url
}

/// Performs page-scrape attempts with fixed selectors and timings
#[derive(Debug, Clone)]
pub struct PageFetcher {
    selectors: SelectorConfig,
    settle_delay: Duration,
    content_wait_timeout: Duration,
}

impl PageFetcher {
    pub fn new(
        selectors: SelectorConfig,
        settle_delay: Duration,
        content_wait_timeout: Duration,
    ) -> Self {
        Self {
            selectors,
            settle_delay,
            content_wait_timeout,
        }
    }

    pub fn from_config(selectors: &SelectorConfig, config: &HarvestConfig) -> Self {
        Self::new(
            selectors.clone(),
            config.settle_delay(),
            config.content_wait_timeout(),
        )
    }

    /// Runs one attempt against `url`
    ///
    /// # Returns
    ///
    /// * `Ok(Vec<Record>)` - The records that could be read, in page order
    /// * `Err(FetchError)` - Navigation failed or no result element appeared in time
    pub async fn fetch_page<P: PageQuery>(
        &self,
        page: &mut P,
        url: &Url,
    ) -> Result<Vec<Record>, FetchError> {
        page.goto(url).await?;

        if !self.settle_delay.is_zero() {
            tokio::time::sleep(self.settle_delay).await;
        }

        page.wait_for_selector(&self.selectors.result, self.content_wait_timeout)
            .await?;
        let elements = page.locate_all(&self.selectors.result).await?;
        tracing::debug!("Found {} result elements at {}", elements.len(), url);

        let mut records = Vec::with_capacity(elements.len());
        for element in elements {
            match self.extract_record(page, element).await {
                Ok(record) => records.push(record),
                Err(e) => {
                    tracing::warn!(
                        "Error extracting record {} from {}: {}",
                        element.index() + 1,
                        url,
                        e
                    );
                }
            }
        }

        Ok(records)
    }

    async fn extract_record<P: PageQuery>(
        &self,
        page: &P,
        element: ElementHandle,
    ) -> Result<Record, FieldError> {
        let title = read_field(page, element, &self.selectors.title).await?;
        let authors = page.read_all_text(element, &self.selectors.authors).await?;
        let rating = read_field(page, element, &self.selectors.rating).await?;
        let demand = read_field(page, element, &self.selectors.demand).await?;

        Ok(Record::from_fields(title, authors, rating, demand))
    }
}

/// Text of the first match, or `None` when nothing matches
async fn read_field<P: PageQuery>(
    page: &P,
    element: ElementHandle,
    selector: &str,
) -> Result<Option<String>, FieldError> {
    if page.count(element, selector).await? == 0 {
        return Ok(None);
    }
    page.read_text(element, selector).await
}
