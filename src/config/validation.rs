use crate::config::types::{
    Config, HarvestConfig, OutputConfig, SelectorConfig, SourceConfig, UserAgentConfig,
};
use crate::ConfigError;
use scraper::Selector;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_source_config(&config.source)?;
    validate_harvest_config(&config.harvest)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates the listing source and its selectors
fn validate_source_config(config: &SourceConfig) -> Result<(), ConfigError> {
    let url = Url::parse(&config.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base_url: {}", e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "base_url '{}' must use http or https",
            config.base_url
        )));
    }

    validate_selectors(&config.selectors)
}

/// Every selector must parse as CSS
fn validate_selectors(selectors: &SelectorConfig) -> Result<(), ConfigError> {
    for (name, selector) in [
        ("result", &selectors.result),
        ("title", &selectors.title),
        ("authors", &selectors.authors),
        ("rating", &selectors.rating),
        ("demand", &selectors.demand),
    ] {
        if selector.trim().is_empty() {
            return Err(ConfigError::InvalidSelector(format!(
                "{} selector cannot be empty",
                name
            )));
        }

        Selector::parse(selector).map_err(|e| {
            ConfigError::InvalidSelector(format!("{} selector '{}': {:?}", name, selector, e))
        })?;
    }

    Ok(())
}

/// Validates harvest pipeline configuration
fn validate_harvest_config(config: &HarvestConfig) -> Result<(), ConfigError> {
    if config.total_pages < 1 {
        return Err(ConfigError::Validation(format!(
            "total_pages must be >= 1, got {}",
            config.total_pages
        )));
    }

    if config.concurrency < 1 || config.concurrency > 100 {
        return Err(ConfigError::Validation(format!(
            "concurrency must be between 1 and 100, got {}",
            config.concurrency
        )));
    }

    if config.max_attempts_per_page < 1 {
        return Err(ConfigError::Validation(format!(
            "max_attempts_per_page must be >= 1, got {}",
            config.max_attempts_per_page
        )));
    }

    if !config.backoff_base.is_finite() || config.backoff_base <= 0.0 {
        return Err(ConfigError::Validation(format!(
            "backoff_base must be a positive number, got {}",
            config.backoff_base
        )));
    }

    if !config.jitter_max.is_finite() || config.jitter_max < 0.0 {
        return Err(ConfigError::Validation(format!(
            "jitter_max must be >= 0, got {}",
            config.jitter_max
        )));
    }

    // The largest delay must fit in a Duration
    let worst_delay =
        config.backoff_base.powi(config.max_attempts_per_page as i32) + config.jitter_max;
    if !worst_delay.is_finite() || worst_delay > u32::MAX as f64 {
        return Err(ConfigError::Validation(format!(
            "backoff_base {} over {} attempts produces an unbounded delay",
            config.backoff_base, config.max_attempts_per_page
        )));
    }

    if config.content_wait_timeout_ms < 1 {
        return Err(ConfigError::Validation(
            "content_wait_timeout_ms must be >= 1".to_string(),
        ));
    }

    if config.navigation_timeout_ms < 1 {
        return Err(ConfigError::Validation(
            "navigation_timeout_ms must be >= 1".to_string(),
        ));
    }

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    // Validate crawler name: non-empty, alphanumeric + hyphens only
    if config.crawler_name.is_empty() {
        return Err(ConfigError::Validation(
            "crawler_name cannot be empty".to_string(),
        ));
    }

    if !config
        .crawler_name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "crawler_name must contain only alphanumeric characters and hyphens, got '{}'",
            config.crawler_name
        )));
    }

    Url::parse(&config.contact_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid contact_url: {}", e)))?;

    validate_email(&config.contact_email)?;

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.csv_path.is_empty() {
        return Err(ConfigError::Validation(
            "csv_path cannot be empty".to_string(),
        ));
    }

    if matches!(&config.summary_path, Some(path) if path.is_empty()) {
        return Err(ConfigError::Validation(
            "summary_path cannot be empty when set".to_string(),
        ));
    }

    Ok(())
}

/// Basic email validation
fn validate_email(email: &str) -> Result<(), ConfigError> {
    if email.is_empty() {
        return Err(ConfigError::Validation(
            "contact_email cannot be empty".to_string(),
        ));
    }

    // Basic email format check: must contain @ and have text on both sides
    let parts: Vec<&str> = email.split('@').collect();
    if parts.len() != 2 {
        return Err(ConfigError::Validation(format!(
            "Invalid email format: '{}'",
            email
        )));
    }

    let local = parts[0];
    let domain = parts[1];

    if local.is_empty() || domain.is_empty() {
        return Err(ConfigError::Validation(format!(
            "Invalid email format: '{}'",
            email
        )));
    }

    if !domain.contains('.') {
        return Err(ConfigError::Validation(format!(
            "Invalid email domain: '{}'",
            email
        )));
    }

    Ok(())
}
