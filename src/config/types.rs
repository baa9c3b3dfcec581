use crate::identity::DEFAULT_USER_AGENTS;
use crate::listing::{Field, DEFAULT_COLUMNS};
use crate::pacing::secs_to_duration;
use crate::ConfigError;
use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure for Sumi-Sift
///
/// Every key has a default, so an empty file (or no file at all) is valid.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub scraper: ScraperConfig,
    #[serde(default)]
    pub identity: IdentityConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Request and pacing behaviour
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ScraperConfig {
    /// Search results endpoint
    pub base_url: String,

    /// Category filter sent as `_sacat`
    pub category: String,

    /// Upper bound accepted for the requested page count
    pub max_pages: u32,

    /// Attempts per page before giving up on it
    pub max_attempts: u32,

    /// Backoff unit; attempt `n` waits `n * base_delay_secs` plus jitter
    pub base_delay_secs: f64,

    /// Per-request timeout
    pub request_timeout_secs: u64,

    pub jitter_min_secs: f64,
    pub jitter_max_secs: f64,

    /// Random pause between successive pages
    pub page_delay_min_secs: f64,
    pub page_delay_max_secs: f64,

    /// Referer header sent with every request
    pub referer: String,

    /// Accept-Language header sent with every request
    pub accept_language: String,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.ebay.com/sch/i.html".to_string(),
            category: "0".to_string(),
            max_pages: 10,
            max_attempts: 5,
            base_delay_secs: 10.0,
            request_timeout_secs: 15,
            jitter_min_secs: 1.0,
            jitter_max_secs: 5.0,
            page_delay_min_secs: 2.0,
            page_delay_max_secs: 5.0,
            referer: "https://www.ebay.com/".to_string(),
            accept_language: "en-US,en;q=0.9".to_string(),
        }
    }
}

impl ScraperConfig {
    pub fn base_delay(&self) -> Duration {
        secs_to_duration(self.base_delay_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Browser identities rotated across attempts
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct IdentityConfig {
    pub user_agents: Vec<String>,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            user_agents: DEFAULT_USER_AGENTS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct OutputConfig {
    /// Directory the CSV table is written to
    pub directory: String,

    /// Column names, in table order
    pub columns: Vec<String>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: ".".to_string(),
            columns: DEFAULT_COLUMNS
                .iter()
                .map(|field| field.column_name().to_string())
                .collect(),
        }
    }
}

impl OutputConfig {
    /// Resolves the configured column names to fields
    pub fn fields(&self) -> Result<Vec<Field>, ConfigError> {
        self.columns
            .iter()
            .map(|name| Field::from_column_name(name))
            .collect()
    }
}
