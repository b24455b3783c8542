//! In-memory page-query doubles for pipeline tests

use crate::browser::{Browser, ElementHandle, PageQuery};
use crate::config::SelectorConfig;
use crate::{BrowserError, FetchError, FieldError};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use url::Url;

#[derive(Debug, Clone, Default)]
struct FakeItem {
    fields: HashMap<&'static str, Vec<String>>,
    broken: HashSet<&'static str>,
}

/// Result elements served by a `FakePage`
#[derive(Debug, Clone, Default)]
pub(crate) struct FakeListing {
    items: Vec<FakeItem>,
}

impl FakeListing {
    /// One fully populated book per title
    pub(crate) fn books(titles: &[&str]) -> Self {
        let items = titles
            .iter()
            .map(|title| {
                let mut fields = HashMap::new();
                fields.insert("title", vec![title.to_string()]);
                fields.insert(
                    "authors",
                    vec![format!("Author of {}", title), format!("Editor of {}", title)],
                );
                fields.insert("rating", vec!["4.0".to_string()]);
                fields.insert("demand", vec!["10 Want to read".to_string()]);
                FakeItem {
                    fields,
                    broken: HashSet::new(),
                }
            })
            .collect();
        Self { items }
    }

    /// Removes a field so lookups find nothing
    pub(crate) fn clear_field(&mut self, item: usize, field: &'static str) {
        self.items[item].fields.remove(field);
    }

    /// Makes every read of a field fail
    pub(crate) fn break_field(&mut self, item: usize, field: &'static str) {
        self.items[item].broken.insert(field);
    }
}

/// Lifecycle events recorded by `FakeBrowser`
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum PageEvent {
    Opened(u64),
    Navigated { page_id: u64, page_number: u32 },
    Closed(u64),
}

/// Page double that serves a fixed listing
///
/// The first `failing_navigations` calls to `goto` fail; a page without
/// result elements times out in `wait_for_selector`.
#[derive(Debug)]
pub(crate) struct FakePage {
    id: u64,
    listing: FakeListing,
    listing_per_page: bool,
    failing_navigations: u32,
    visited: Vec<Url>,
    loaded: bool,
    generation: u64,
    events: Option<Arc<Mutex<Vec<PageEvent>>>>,
    selectors: SelectorConfig,
}

impl FakePage {
    pub(crate) fn new(listing: FakeListing) -> Self {
        Self {
            id: 0,
            listing,
            listing_per_page: false,
            failing_navigations: 0,
            visited: Vec::new(),
            loaded: false,
            generation: 0,
            events: None,
            selectors: SelectorConfig::default(),
        }
    }

    pub(crate) fn failing_navigations(mut self, count: u32) -> Self {
        self.failing_navigations = count;
        self
    }

    pub(crate) fn always_failing(self) -> Self {
        self.failing_navigations(u32::MAX)
    }

    pub(crate) fn visited(&self) -> Vec<Url> {
        self.visited.clone()
    }

    pub(crate) fn navigation_count(&self) -> usize {
        self.visited.len()
    }

    fn field_name(&self, selector: &str) -> &'static str {
        if selector == self.selectors.title {
            "title"
        } else if selector == self.selectors.authors {
            "authors"
        } else if selector == self.selectors.rating {
            "rating"
        } else if selector == self.selectors.demand {
            "demand"
        } else {
            "unknown"
        }
    }

    fn values(&self, element: ElementHandle, selector: &str) -> Result<Vec<String>, FieldError> {
        if element.generation != self.generation {
            return Err(FieldError::StaleElement);
        }

        let item = self
            .listing
            .items
            .get(element.index)
            .ok_or(FieldError::StaleElement)?;
        let field = self.field_name(selector);

        if item.broken.contains(field) {
            return Err(FieldError::Extraction {
                selector: selector.to_string(),
                reason: "element detached".to_string(),
            });
        }

        Ok(item.fields.get(field).cloned().unwrap_or_default())
    }

    fn record(&self, event: PageEvent) {
        if let Some(events) = &self.events {
            events.lock().unwrap().push(event);
        }
    }
}

fn page_number_of(url: &Url) -> u32 {
    url.query_pairs()
        .find(|(key, _)| key == "page")
        .and_then(|(_, value)| value.parse().ok())
        .unwrap_or(0)
}

#[async_trait]
impl PageQuery for FakePage {
    async fn goto(&mut self, url: &Url) -> Result<(), FetchError> {
        self.visited.push(url.clone());
        self.loaded = false;
        self.generation += 1;

        let page_number = page_number_of(url);
        self.record(PageEvent::Navigated {
            page_id: self.id,
            page_number,
        });

        if self.visited.len() as u64 <= u64::from(self.failing_navigations) {
            return Err(FetchError::Navigation {
                url: url.to_string(),
                reason: "connection reset".to_string(),
            });
        }

        if self.listing_per_page {
            let titles: Vec<String> = (1..=2).map(|i| format!("p{}-{}", page_number, i)).collect();
            let titles: Vec<&str> = titles.iter().map(String::as_str).collect();
            self.listing = FakeListing::books(&titles);
        }

        self.loaded = true;
        Ok(())
    }

    async fn wait_for_selector(
        &mut self,
        selector: &str,
        timeout: Duration,
    ) -> Result<(), FetchError> {
        if !self.loaded {
            return Err(FetchError::Navigation {
                url: "about:blank".to_string(),
                reason: "no document loaded".to_string(),
            });
        }

        if self.listing.items.is_empty() {
            return Err(FetchError::ContentTimeout {
                selector: selector.to_string(),
                timeout_ms: timeout.as_millis() as u64,
            });
        }

        Ok(())
    }

    async fn locate_all(&mut self, _selector: &str) -> Result<Vec<ElementHandle>, FetchError> {
        let generation = self.generation;
        Ok((0..self.listing.items.len())
            .map(|index| ElementHandle::new(generation, index))
            .collect())
    }

    async fn read_text(
        &self,
        element: ElementHandle,
        sub_selector: &str,
    ) -> Result<Option<String>, FieldError> {
        Ok(self.values(element, sub_selector)?.into_iter().next())
    }

    async fn read_all_text(
        &self,
        element: ElementHandle,
        sub_selector: &str,
    ) -> Result<Vec<String>, FieldError> {
        self.values(element, sub_selector)
    }

    async fn count(
        &self,
        element: ElementHandle,
        sub_selector: &str,
    ) -> Result<usize, FieldError> {
        Ok(self.values(element, sub_selector)?.len())
    }

    async fn close(self) -> Result<(), BrowserError> {
        self.record(PageEvent::Closed(self.id));
        Ok(())
    }
}

/// Browser double that records page lifecycle events
///
/// Every page serves two books titled `p<page>-1` and `p<page>-2`.
#[derive(Debug, Default)]
pub(crate) struct FakeBrowser {
    next_id: AtomicU64,
    events: Arc<Mutex<Vec<PageEvent>>>,
    failing_pages: HashMap<u32, u32>,
    refused_opens: HashSet<u64>,
}

impl FakeBrowser {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// The first `count` navigations to `page_number` fail
    pub(crate) fn failing_page(mut self, page_number: u32, count: u32) -> Self {
        self.failing_pages.insert(page_number, count);
        self
    }

    /// The `open_index`-th call to `new_page` (1-based) fails
    pub(crate) fn refusing_open(mut self, open_index: u64) -> Self {
        self.refused_opens.insert(open_index);
        self
    }

    pub(crate) fn events(&self) -> Vec<PageEvent> {
        self.events.lock().unwrap().clone()
    }
}

#[async_trait]
impl Browser for FakeBrowser {
    type Page = FakeRoutedPage;

    async fn new_page(&self) -> Result<FakeRoutedPage, BrowserError> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        if self.refused_opens.contains(&id) {
            return Err(BrowserError::Open("tab limit reached".to_string()));
        }

        let mut page = FakePage::new(FakeListing::default());
        page.id = id;
        page.listing_per_page = true;
        page.events = Some(Arc::clone(&self.events));
        page.record(PageEvent::Opened(id));

        Ok(FakeRoutedPage {
            page,
            failing_pages: self.failing_pages.clone(),
        })
    }
}

/// `FakePage` whose failure budget is chosen by the page number it visits
#[derive(Debug)]
pub(crate) struct FakeRoutedPage {
    page: FakePage,
    failing_pages: HashMap<u32, u32>,
}

#[async_trait]
impl PageQuery for FakeRoutedPage {
    async fn goto(&mut self, url: &Url) -> Result<(), FetchError> {
        let page_number = page_number_of(url);
        self.page.failing_navigations = self.failing_pages.get(&page_number).copied().unwrap_or(0);
        self.page.goto(url).await
    }

    async fn wait_for_selector(
        &mut self,
        selector: &str,
        timeout: Duration,
    ) -> Result<(), FetchError> {
        self.page.wait_for_selector(selector, timeout).await
    }

    async fn locate_all(&mut self, selector: &str) -> Result<Vec<ElementHandle>, FetchError> {
        self.page.locate_all(selector).await
    }

    async fn read_text(
        &self,
        element: ElementHandle,
        sub_selector: &str,
    ) -> Result<Option<String>, FieldError> {
        self.page.read_text(element, sub_selector).await
    }

    async fn read_all_text(
        &self,
        element: ElementHandle,
        sub_selector: &str,
    ) -> Result<Vec<String>, FieldError> {
        self.page.read_all_text(element, sub_selector).await
    }

    async fn count(
        &self,
        element: ElementHandle,
        sub_selector: &str,
    ) -> Result<usize, FieldError> {
        self.page.count(element, sub_selector).await
    }

    async fn close(self) -> Result<(), BrowserError> {
        self.page.close().await
    }
}
