//! HTTP page-query backend
//!
//! Each `HttpPage` is a lightweight "tab": it keeps the document it last
//! navigated to and the elements it last located. Navigation is a GET
//! request, element lookup goes through scraper. Waiting for a selector only
//! inspects the loaded document; one attempt issues exactly one request, and
//! fetching the page again is left to the retry loop.

use crate::browser::{Browser, ElementHandle, PageQuery};
use crate::config::{HarvestConfig, UserAgentConfig};
use crate::{BrowserError, FetchError, FieldError};
use async_trait::async_trait;
use reqwest::Client;
use scraper::{Html, Selector};
use std::time::Duration;
use url::Url;

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The user agent configuration
/// * `timeout` - Request timeout for a single navigation
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
pub fn build_http_client(
    config: &UserAgentConfig,
    timeout: Duration,
) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent_string())
        .timeout(timeout)
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Hands out `HttpPage` handles sharing one connection pool
#[derive(Debug, Clone)]
pub struct HttpBrowser {
    client: Client,
}

impl HttpBrowser {
    /// Creates a browser from the harvest and user agent configuration
    pub fn new(
        user_agent: &UserAgentConfig,
        harvest: &HarvestConfig,
    ) -> Result<Self, reqwest::Error> {
        let client = build_http_client(user_agent, harvest.navigation_timeout())?;
        Ok(Self::with_client(client))
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Browser for HttpBrowser {
    type Page = HttpPage;

    async fn new_page(&self) -> Result<HttpPage, BrowserError> {
        Ok(HttpPage::new(self.client.clone()))
    }
}

/// One page handle backed by plain HTTP
#[derive(Debug)]
pub struct HttpPage {
    client: Client,
    current_url: Option<Url>,
    document: Option<String>,

    /// Outer HTML of the elements found by the last `locate_all`
    elements: Vec<String>,

    /// Bumped whenever `elements` is replaced, invalidating older handles
    generation: u64,
}

impl HttpPage {
    fn new(client: Client) -> Self {
        Self {
            client,
            current_url: None,
            document: None,
            elements: Vec::new(),
            generation: 0,
        }
    }

    /// URL of the current document, if any
    pub fn url(&self) -> Option<&Url> {
        self.current_url.as_ref()
    }

    async fn load(&self, url: &Url) -> Result<String, FetchError> {
        tracing::trace!("GET {}", url);

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| navigation_error(url, &e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Navigation {
                url: url.to_string(),
                reason: format!("HTTP {}", status.as_u16()),
            });
        }

        response
            .text()
            .await
            .map_err(|e| navigation_error(url, &e))
    }

    fn invalidate_elements(&mut self) {
        self.elements.clear();
        self.generation += 1;
    }

    fn fragment(&self, element: ElementHandle) -> Result<&str, FieldError> {
        if element.generation != self.generation {
            return Err(FieldError::StaleElement);
        }

        self.elements
            .get(element.index)
            .map(String::as_str)
            .ok_or(FieldError::StaleElement)
    }
}

#[async_trait]
impl PageQuery for HttpPage {
    async fn goto(&mut self, url: &Url) -> Result<(), FetchError> {
        self.invalidate_elements();
        self.document = None;
        self.current_url = None;

        let body = self.load(url).await?;
        tracing::debug!("Loaded {} ({} bytes)", url, body.len());

        self.current_url = Some(url.clone());
        self.document = Some(body);
        Ok(())
    }

    async fn wait_for_selector(
        &mut self,
        selector: &str,
        timeout: Duration,
    ) -> Result<(), FetchError> {
        parse_selector(selector).map_err(|reason| FetchError::InvalidSelector {
            selector: selector.to_string(),
            reason,
        })?;
        let document = match &self.document {
            Some(document) => document,
            None => return Err(no_document()),
        };

        if count_in_document(document, selector).unwrap_or(0) > 0 {
            return Ok(());
        }

        // A static document cannot change; sit out the timeout without reloading
        tracing::debug!("No '{}' element in the loaded document", selector);
        tokio::time::sleep(timeout).await;

        Err(FetchError::ContentTimeout {
            selector: selector.to_string(),
            timeout_ms: timeout.as_millis() as u64,
        })
    }

    async fn locate_all(&mut self, selector: &str) -> Result<Vec<ElementHandle>, FetchError> {
        let document = match &self.document {
            Some(document) => document,
            None => return Err(no_document()),
        };

        let elements = outer_html_of_matches(document, selector).map_err(|reason| {
            FetchError::InvalidSelector {
                selector: selector.to_string(),
                reason,
            }
        })?;

        self.invalidate_elements();
        self.elements = elements;

        let generation = self.generation;
        Ok((0..self.elements.len())
            .map(|index| ElementHandle::new(generation, index))
            .collect())
    }

    async fn read_text(
        &self,
        element: ElementHandle,
        sub_selector: &str,
    ) -> Result<Option<String>, FieldError> {
        let texts = texts_in_fragment(self.fragment(element)?, sub_selector, Some(1))?;
        Ok(texts.into_iter().next())
    }

    async fn read_all_text(
        &self,
        element: ElementHandle,
        sub_selector: &str,
    ) -> Result<Vec<String>, FieldError> {
        texts_in_fragment(self.fragment(element)?, sub_selector, None)
    }

    async fn count(
        &self,
        element: ElementHandle,
        sub_selector: &str,
    ) -> Result<usize, FieldError> {
        count_in_fragment(self.fragment(element)?, sub_selector)
    }

    async fn close(self) -> Result<(), BrowserError> {
        tracing::trace!(
            "Closing page at {}",
            self.current_url
                .as_ref()
                .map(Url::as_str)
                .unwrap_or("about:blank")
        );
        Ok(())
    }
}

fn no_document() -> FetchError {
    FetchError::Navigation {
        url: "about:blank".to_string(),
        reason: "no document loaded".to_string(),
    }
}

/// Classifies a transport error the way the retry log reports it
fn navigation_error(url: &Url, error: &reqwest::Error) -> FetchError {
    let reason = if error.is_timeout() {
        "Request timeout".to_string()
    } else if error.is_connect() {
        "Connection refused".to_string()
    } else {
        error.to_string()
    };

    FetchError::Navigation {
        url: url.to_string(),
        reason,
    }
}

fn parse_selector(selector: &str) -> Result<Selector, String> {
    Selector::parse(selector).map_err(|e| format!("{:?}", e))
}

fn parse_field_selector(selector: &str) -> Result<Selector, FieldError> {
    parse_selector(selector).map_err(|reason| FieldError::InvalidSelector {
        selector: selector.to_string(),
        reason,
    })
}

/// Number of elements in `document` matching `selector`
fn count_in_document(document: &str, selector: &str) -> Result<usize, String> {
    let selector = parse_selector(selector)?;
    let html = Html::parse_document(document);
    Ok(html.select(&selector).count())
}

fn outer_html_of_matches(document: &str, selector: &str) -> Result<Vec<String>, String> {
    let selector = parse_selector(selector)?;
    let html = Html::parse_document(document);
    Ok(html.select(&selector).map(|element| element.html()).collect())
}

fn count_in_fragment(fragment: &str, sub_selector: &str) -> Result<usize, FieldError> {
    let selector = parse_field_selector(sub_selector)?;
    let html = Html::parse_fragment(fragment);
    Ok(html.select(&selector).count())
}

/// Trimmed texts of the elements in `fragment` matching `sub_selector`
fn texts_in_fragment(
    fragment: &str,
    sub_selector: &str,
    limit: Option<usize>,
) -> Result<Vec<String>, FieldError> {
    let selector = parse_field_selector(sub_selector)?;
    let html = Html::parse_fragment(fragment);

    let texts = html
        .select(&selector)
        .map(|element| element.text().collect::<String>().trim().to_string());

    Ok(match limit {
        Some(limit) => texts.take(limit).collect(),
        None => texts.collect(),
    })
}
