//! Fetch-extract-paginate pipeline
//!
//! This module contains the core scraping logic, including:
//! - Search URL construction
//! - HTTP fetching with retry, backoff and identity rotation
//! - Listing extraction from page markup
//! - Page-by-page orchestration with early stop

mod extractor;
mod fetcher;
mod paginator;
mod query;
pub mod selectors;

pub use extractor::{extract_listings, ListingExtractor};
pub use fetcher::{build_http_client, FetchAttempt, PageFetcher, RetryPolicy};
pub use paginator::{ProgressSink, ScrapeResult, Scraper};
pub use query::{build_page_url, normalize_term, ScrapeRequest};

use crate::config::Config;
use crate::SiftError;

/// Runs a complete scrape
///
/// This is the main entry point. It will:
/// 1. Reject an empty search term or an out-of-range page count
/// 2. Fetch pages 1..=page_count in order, stopping at the first empty page
/// 3. Render the collected records as a table
///
/// # Arguments
///
/// * `config` - The scraper configuration
/// * `search_term` - Free-text search term
/// * `page_count` - Number of result pages to request
/// * `progress` - Optional sink notified with (page, total) before each page
///
/// # Returns
///
/// * `Ok(ScrapeResult)` - Records and table (`table` is `None` when nothing was scraped)
/// * `Err(SiftError)` - Invalid input or configuration
pub async fn scrape(
    config: Config,
    search_term: &str,
    page_count: u32,
    progress: Option<&mut dyn ProgressSink>,
) -> Result<ScrapeResult, SiftError> {
    let request = ScrapeRequest::new(search_term, page_count, config.scraper.max_pages)?;
    let scraper = Scraper::new(config)?;
    scraper.run(&request, progress).await
}
