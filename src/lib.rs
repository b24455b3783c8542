//! Catalog-Harvest: a fault-tolerant catalog listing harvester
//!
//! This crate fetches paginated catalog search results through a page-query
//! backend, extracts one record per listing entry, and aggregates every page
//! into a dataset that is handed to a sink (CSV by default).
//!
//! The pipeline is best-effort: page failures are retried with exponential
//! backoff and, once retries are exhausted, degrade to an empty page instead
//! of aborting the run.

pub mod browser;
pub mod config;
pub mod dataset;
pub mod harvest;
pub mod output;
pub mod state;

use thiserror::Error;

/// Main error type for Catalog-Harvest operations
///
/// Only setup and output failures surface here. Page-level failures are
/// absorbed by the retry loop and never reach the caller.
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Output error: {0}")]
    Output(#[from] output::OutputError),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid selector in config: {0}")]
    InvalidSelector(String),
}

/// Errors that fail a single page attempt
///
/// These propagate from the page fetcher to the attempt loop, which turns
/// them into retry decisions.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    #[error("Navigation to {url} failed: {reason}")]
    Navigation { url: String, reason: String },

    #[error("No '{selector}' element appeared within {timeout_ms}ms")]
    ContentTimeout { selector: String, timeout_ms: u64 },

    #[error("Invalid selector '{selector}': {reason}")]
    InvalidSelector { selector: String, reason: String },
}

/// Errors raised while reading the fields of one result element
///
/// Scoped to a single record: the fetcher logs them and skips the record.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FieldError {
    #[error("Failed to read '{selector}': {reason}")]
    Extraction { selector: String, reason: String },

    #[error("Element handle is stale (page navigated since it was located)")]
    StaleElement,

    #[error("Invalid selector '{selector}': {reason}")]
    InvalidSelector { selector: String, reason: String },
}

/// Errors raised while acquiring or releasing page handles
#[derive(Debug, Error)]
pub enum BrowserError {
    #[error("Failed to open page: {0}")]
    Open(String),

    #[error("Failed to close page: {0}")]
    Close(String),
}

/// Result type alias for Catalog-Harvest operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use dataset::{Dataset, PageOutcome, PageResult, Record};
pub use harvest::{harvest, HarvestReport};
pub use state::{AttemptPhase, AttemptState};
