use crate::config::types::{Config, IdentityConfig, OutputConfig, ScraperConfig};
use crate::ConfigError;
use std::collections::HashSet;
use url::Url;

/// Hard ceiling on the configurable page limit
const PAGE_LIMIT_CEILING: u32 = 100;

/// Largest accepted value for any delay or jitter setting, in seconds
const DELAY_CEILING_SECS: f64 = 3600.0;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_scraper_config(&config.scraper)?;
    validate_identity_config(&config.identity)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates request and pacing settings
fn validate_scraper_config(config: &ScraperConfig) -> Result<(), ConfigError> {
    let url = Url::parse(&config.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base_url: {}", e)))?;

    if url.scheme() != "https" && url.scheme() != "http" {
        return Err(ConfigError::InvalidUrl(format!(
            "base_url must use http or https, got '{}'",
            url.scheme()
        )));
    }

    if config.max_pages < 1 || config.max_pages > PAGE_LIMIT_CEILING {
        return Err(ConfigError::Validation(format!(
            "max_pages must be between 1 and {}, got {}",
            PAGE_LIMIT_CEILING, config.max_pages
        )));
    }

    if config.max_attempts < 1 {
        return Err(ConfigError::Validation(format!(
            "max_attempts must be >= 1, got {}",
            config.max_attempts
        )));
    }

    if config.request_timeout_secs < 1 {
        return Err(ConfigError::Validation(
            "request_timeout_secs must be >= 1".to_string(),
        ));
    }

    if !is_valid_delay(config.base_delay_secs) {
        return Err(ConfigError::Validation(format!(
            "base_delay_secs must be between 0 and {}, got {}",
            DELAY_CEILING_SECS, config.base_delay_secs
        )));
    }

    validate_range("jitter", config.jitter_min_secs, config.jitter_max_secs)?;
    validate_range(
        "page_delay",
        config.page_delay_min_secs,
        config.page_delay_max_secs,
    )?;

    if config.category.trim().is_empty() {
        return Err(ConfigError::Validation(
            "category cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates a min/max pair of seconds
fn validate_range(name: &str, min: f64, max: f64) -> Result<(), ConfigError> {
    if !is_valid_delay(min) || !is_valid_delay(max) {
        return Err(ConfigError::Validation(format!(
            "{} bounds must be between 0 and {}, got {}..{}",
            name, DELAY_CEILING_SECS, min, max
        )));
    }

    if min > max {
        return Err(ConfigError::Validation(format!(
            "{}_min_secs ({}) must not exceed {}_max_secs ({})",
            name, min, name, max
        )));
    }

    Ok(())
}

fn is_valid_delay(secs: f64) -> bool {
    (0.0..=DELAY_CEILING_SECS).contains(&secs)
}

/// Validates the identity pool
fn validate_identity_config(config: &IdentityConfig) -> Result<(), ConfigError> {
    if config.user_agents.is_empty() {
        return Err(ConfigError::Validation(
            "user_agents must contain at least one entry".to_string(),
        ));
    }

    if config.user_agents.iter().any(|agent| agent.trim().is_empty()) {
        return Err(ConfigError::Validation(
            "user_agents cannot contain blank entries".to_string(),
        ));
    }

    Ok(())
}

/// Validates output settings
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.directory.is_empty() {
        return Err(ConfigError::Validation(
            "directory cannot be empty".to_string(),
        ));
    }

    if config.columns.is_empty() {
        return Err(ConfigError::Validation(
            "columns must name at least one field".to_string(),
        ));
    }

    let fields = config.fields()?;
    let mut seen = HashSet::new();
    for field in fields {
        if !seen.insert(field) {
            return Err(ConfigError::Validation(format!(
                "column '{}' listed more than once",
                field
            )));
        }
    }

    Ok(())
}
