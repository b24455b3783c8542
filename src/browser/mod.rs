//! Page-query layer
//!
//! The harvest pipeline never parses markup itself. It drives page handles
//! through the `PageQuery` trait: navigate, wait for content, locate the
//! repeated result elements, then read sub-fields from each one.
//!
//! - `Browser`: hands out exclusively-owned page handles
//! - `PageQuery`: the operations available on one page handle
//! - `HttpBrowser`: a backend built on reqwest and scraper

mod http;

pub use http::{build_http_client, HttpBrowser, HttpPage};

use crate::{BrowserError, FetchError, FieldError};
use async_trait::async_trait;
use std::time::Duration;
use url::Url;

/// Reference to one element located on a page
///
/// Handles are only valid until the page navigates again; reading through a
/// stale handle fails with `FieldError::StaleElement`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ElementHandle {
    pub(crate) generation: u64,
    pub(crate) index: usize,
}

impl ElementHandle {
    pub fn new(generation: u64, index: usize) -> Self {
        Self { generation, index }
    }

    /// Position of the element among the located results
    pub fn index(&self) -> usize {
        self.index
    }
}

/// Source of page handles
#[async_trait]
pub trait Browser: Send + Sync {
    type Page: PageQuery;

    /// Opens a new page handle
    async fn new_page(&self) -> Result<Self::Page, BrowserError>;
}

/// Operations on one page handle
///
/// A field lookup that finds nothing is `Ok(None)` / an empty list, never an
/// error. Errors are reserved for failures of the page or the read itself.
#[async_trait]
pub trait PageQuery: Send + Sync {
    /// Navigates to `url`, replacing the current document
    async fn goto(&mut self, url: &Url) -> Result<(), FetchError>;

    /// Waits until at least one element matches `selector`
    async fn wait_for_selector(
        &mut self,
        selector: &str,
        timeout: Duration,
    ) -> Result<(), FetchError>;

    /// Locates every element matching `selector` in document order
    async fn locate_all(&mut self, selector: &str) -> Result<Vec<ElementHandle>, FetchError>;

    /// Reads the text of the first descendant of `element` matching `sub_selector`
    async fn read_text(
        &self,
        element: ElementHandle,
        sub_selector: &str,
    ) -> Result<Option<String>, FieldError>;

    /// Reads the texts of every descendant of `element` matching `sub_selector`
    async fn read_all_text(
        &self,
        element: ElementHandle,
        sub_selector: &str,
    ) -> Result<Vec<String>, FieldError>;

    /// Counts the descendants of `element` matching `sub_selector`
    async fn count(&self, element: ElementHandle, sub_selector: &str)
        -> Result<usize, FieldError>;

    /// Releases the page handle
    async fn close(self) -> Result<(), BrowserError>
    where
        Self: Sized;
}
