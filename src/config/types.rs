use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure for Catalog-Harvest
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub source: SourceConfig,
    pub harvest: HarvestConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub output: OutputConfig,
}

/// Where listings come from and how they are marked up
#[derive(Debug, Clone, Deserialize)]
pub struct SourceConfig {
    /// Search query URL; the `page` parameter is appended per page
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// CSS selectors for the listing markup
    #[serde(default)]
    pub selectors: SelectorConfig,
}

/// CSS selectors used to locate result elements and their fields
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct SelectorConfig {
    /// One match per listing entry
    #[serde(default = "default_result_selector")]
    pub result: String,

    #[serde(default = "default_title_selector")]
    pub title: String,

    /// May match several elements; their texts are comma-joined
    #[serde(default = "default_authors_selector")]
    pub authors: String,

    #[serde(default = "default_rating_selector")]
    pub rating: String,

    /// "Want to read" counter
    #[serde(default = "default_demand_selector")]
    pub demand: String,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            result: default_result_selector(),
            title: default_title_selector(),
            authors: default_authors_selector(),
            rating: default_rating_selector(),
            demand: default_demand_selector(),
        }
    }
}

fn default_result_selector() -> String {
    ".searchResultItem".to_string()
}

fn default_title_selector() -> String {
    "h3.booktitle a".to_string()
}

fn default_authors_selector() -> String {
    ".bookauthor a".to_string()
}

fn default_rating_selector() -> String {
    r#"span[itemprop="ratingValue"]"#.to_string()
}

fn default_demand_selector() -> String {
    r#"span[itemprop="reviewCount"]"#.to_string()
}

/// Harvest pipeline behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct HarvestConfig {
    /// Number of listing pages to fetch, starting at page 1
    #[serde(rename = "total-pages")]
    pub total_pages: u32,

    /// Pages fetched concurrently within one batch
    pub concurrency: u32,

    /// Attempts per page, including the first one
    #[serde(rename = "max-attempts-per-page", default = "default_max_attempts")]
    pub max_attempts_per_page: u32,

    /// Exponential base of the retry delay (seconds)
    #[serde(rename = "backoff-base", default = "default_backoff_base")]
    pub backoff_base: f64,

    /// Upper bound of the random jitter added to each delay (seconds)
    #[serde(rename = "jitter-max", default = "default_jitter_max")]
    pub jitter_max: f64,

    /// Seed for the jitter source; random when absent
    #[serde(rename = "jitter-seed", default)]
    pub jitter_seed: Option<u64>,

    /// How long to wait for the first result element (milliseconds)
    #[serde(
        rename = "content-wait-timeout-ms",
        default = "default_content_wait_timeout"
    )]
    pub content_wait_timeout_ms: u64,

    /// Pause after navigation before looking for content (milliseconds)
    #[serde(rename = "settle-delay-ms", default = "default_settle_delay")]
    pub settle_delay_ms: u64,

    /// Request timeout for a single navigation (milliseconds)
    #[serde(rename = "navigation-timeout-ms", default = "default_navigation_timeout")]
    pub navigation_timeout_ms: u64,
}

impl HarvestConfig {
    pub fn content_wait_timeout(&self) -> Duration {
        Duration::from_millis(self.content_wait_timeout_ms)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    pub fn navigation_timeout(&self) -> Duration {
        Duration::from_millis(self.navigation_timeout_ms)
    }
}

fn default_max_attempts() -> u32 {
    6
}

fn default_backoff_base() -> f64 {
    2.0
}

fn default_jitter_max() -> f64 {
    1.0
}

fn default_content_wait_timeout() -> u64 {
    5000
}

fn default_settle_delay() -> u64 {
    2000
}

fn default_navigation_timeout() -> u64 {
    30_000
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the harvester
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the harvester
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the harvester
    #[serde(rename = "contact-url")]
    pub contact_url: String,

    /// Email address for harvester-related contact
    #[serde(rename = "contact-email")]
    pub contact_email: String,
}

impl UserAgentConfig {
    /// Format: CrawlerName/Version (+ContactURL; ContactEmail)
    pub fn user_agent_string(&self) -> String {
        format!(
            "{}/{} (+{}; {})",
            self.crawler_name, self.crawler_version, self.contact_url, self.contact_email
        )
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path to the CSV dataset file
    #[serde(rename = "csv-path")]
    pub csv_path: String,

    /// Path to the markdown run summary, if one should be written
    #[serde(rename = "summary-path", default)]
    pub summary_path: Option<String>,
}
