//! Integration tests for the harvest pipeline
//!
//! These tests use wiremock to serve listing pages and run the full
//! fetch, retry, aggregate and write cycle end-to-end.

use catalog_harvest::config::{
    Config, HarvestConfig, OutputConfig, SelectorConfig, SourceConfig, UserAgentConfig,
};
use catalog_harvest::harvest::harvest;
use catalog_harvest::{ConfigError, HarvestError, PageOutcome};
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Renders a listing page with one entry per title
fn listing_html(page: u32, titles: &[&str]) -> String {
    let items: String = titles
        .iter()
        .map(|title| {
            format!(
                r#"<li class="searchResultItem">
                    <h3 class="booktitle"><a href="/works/{page}">{title}</a></h3>
                    <span class="bookauthor"><a href="/a/1">Author {page}</a></span>
                    <span itemprop="ratingValue">4.{page}</span>
                    <span itemprop="reviewCount">{page}00</span>
                </li>"#
            )
        })
        .collect();

    format!("<html><body><ul class=\"list-books\">{items}</ul></body></html>")
}

/// Creates a test configuration against `server_uri` writing into `dir`
fn create_test_config(server_uri: &str, dir: &TempDir, total_pages: u32) -> Config {
    Config {
        source: SourceConfig {
            base_url: format!("{}/search?q=physics", server_uri),
            selectors: SelectorConfig::default(),
        },
        harvest: HarvestConfig {
            total_pages,
            concurrency: 2,
            max_attempts_per_page: 3,
            backoff_base: 0.01,
            jitter_max: 0.0,
            jitter_seed: Some(7),
            content_wait_timeout_ms: 300,
            settle_delay_ms: 0,
            navigation_timeout_ms: 2000,
        },
        user_agent: UserAgentConfig {
            crawler_name: "TestBot".to_string(),
            crawler_version: "1.0.0".to_string(),
            contact_url: "https://example.com/contact".to_string(),
            contact_email: "test@example.com".to_string(),
        },
        output: OutputConfig {
            csv_path: dir
                .path()
                .join("data")
                .join("Physics.csv")
                .to_string_lossy()
                .into_owned(),
            summary_path: Some(dir.path().join("summary.md").to_string_lossy().into_owned()),
        },
    }
}

async fn mount_listing(server: &MockServer, page: u32, titles: &[&str]) {
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("q", "physics"))
        .and(query_param("page", page.to_string()))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(listing_html(page, titles))
                .insert_header("content-type", "text/html"),
        )
        .mount(server)
        .await;
}

fn read_csv(config: &Config) -> String {
    std::fs::read_to_string(&config.output.csv_path).expect("CSV should be written")
}

#[tokio::test]
async fn test_full_harvest_writes_every_page() {
    let server = MockServer::start().await;
    mount_listing(&server, 1, &["Optics", "Mechanics"]).await;
    mount_listing(&server, 2, &["Relativity"]).await;
    mount_listing(&server, 3, &["Thermodynamics", "Acoustics"]).await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&server.uri(), &dir, 3);

    let report = harvest(&config, Some("abc123")).await.expect("harvest should succeed");

    assert_eq!(report.dataset.page_numbers(), vec![1, 2, 3]);
    assert_eq!(report.dataset.record_count(), 5);
    assert_eq!(report.statistics.pages_exhausted, 0);

    let csv = read_csv(&config);
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines[0], "Title,Author,Rating,Want to Read");
    assert_eq!(lines[1], "Optics,Author 1,4.1,100");
    assert_eq!(lines[2], "Mechanics,Author 1,4.1,100");
    assert_eq!(lines[3], "Relativity,Author 2,4.2,200");
    assert_eq!(lines[4], "Thermodynamics,Author 3,4.3,300");
    assert_eq!(lines.len(), 6);

    let summary = std::fs::read_to_string(dir.path().join("summary.md")).unwrap();
    assert!(summary.contains("**Total Pages**: 3"));
    assert!(summary.contains("**Config Hash**: abc123"));
}

#[tokio::test]
async fn test_transient_failure_is_retried() {
    let server = MockServer::start().await;

    // Page 2 answers 503 twice, then recovers; the first mounted match wins
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .mount(&server)
        .await;

    mount_listing(&server, 1, &["Optics"]).await;
    mount_listing(&server, 2, &["Relativity"]).await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&server.uri(), &dir, 2);

    let report = harvest(&config, None).await.unwrap();

    let page_two = &report.dataset.pages()[1];
    assert_eq!(page_two.page_number, 2);
    assert_eq!(page_two.outcome, PageOutcome::Succeeded);
    assert_eq!(page_two.attempts, 3);
    assert_eq!(report.statistics.pages_retried, 1);

    let csv = read_csv(&config);
    assert!(csv.contains("Relativity,Author 2,4.2,200"));
}

#[tokio::test]
async fn test_failing_page_is_skipped_without_aborting() {
    let server = MockServer::start().await;
    mount_listing(&server, 1, &["Optics"]).await;
    mount_listing(&server, 3, &["Thermodynamics"]).await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&server.uri(), &dir, 3);

    let report = harvest(&config, None).await.unwrap();

    assert_eq!(report.dataset.page_numbers(), vec![1, 2, 3]);
    assert_eq!(report.dataset.pages()[1].outcome, PageOutcome::Exhausted);
    assert_eq!(report.dataset.pages()[1].attempts, 3);
    assert_eq!(report.statistics.skipped_pages, vec![2]);

    let csv = read_csv(&config);
    assert_eq!(
        csv.lines().collect::<Vec<_>>(),
        vec![
            "Title,Author,Rating,Want to Read",
            "Optics,Author 1,4.1,100",
            "Thermodynamics,Author 3,4.3,300",
        ]
    );
}

#[tokio::test]
async fn test_missing_fields_become_not_available() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<html><body>
                <li class="searchResultItem"><h3 class="booktitle"><a>Untitled Notes</a></h3></li>
            </body></html>"#,
        ))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&server.uri(), &dir, 1);

    harvest(&config, None).await.unwrap();

    let csv = read_csv(&config);
    assert!(csv.lines().any(|line| line == "Untitled Notes,N/A,N/A,N/A"));
}

#[tokio::test]
async fn test_invalid_config_is_rejected_before_fetching() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string(listing_html(1, &["Optics"])))
        .expect(0)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let mut config = create_test_config(&server.uri(), &dir, 2);
    config.source.selectors.rating = "span[[".to_string();

    let result = harvest(&config, None).await;

    assert!(matches!(
        result,
        Err(HarvestError::Config(ConfigError::InvalidSelector(_)))
    ));
    assert!(!std::path::Path::new(&config.output.csv_path).exists());
}
