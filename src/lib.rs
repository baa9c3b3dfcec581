//! Sumi-Sift: A polite listing harvester
//!
//! This crate retrieves listing records from a paginated marketplace search page,
//! retrying with backoff and rotated browser identities, and renders the recovered
//! records as a delimited table.

pub mod config;
pub mod identity;
pub mod listing;
pub mod output;
pub mod pacing;
pub mod pipeline;

use thiserror::Error;

/// Main error type for Sumi-Sift operations
///
/// Fetch and extraction failures never surface here; they are absorbed by the
/// pipeline and reported as empty pages.
#[derive(Debug, Error)]
pub enum SiftError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Search term must not be empty")]
    EmptySearchTerm,

    #[error("Page count must be between 1 and {max}, got {requested}")]
    InvalidPageCount { requested: u32, max: u32 },

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Output error: {0}")]
    Output(#[from] output::OutputError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
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

    #[error("Unknown column: {0}")]
    UnknownColumn(String),
}

/// Result type alias for Sumi-Sift operations
pub type Result<T> = std::result::Result<T, SiftError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use listing::{Field, ListingRecord, NOT_AVAILABLE};
pub use pipeline::{scrape, ProgressSink, ScrapeRequest, ScrapeResult, Scraper};
