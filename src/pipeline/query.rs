//! Search request construction
//!
//! Builds the per-page search URL: `_nkw` carries the search term with spaces
//! encoded as `+`, `_sacat` the category filter and `_pgn` the page index.

use crate::config::ScraperConfig;
use crate::SiftError;
use url::Url;

/// A validated scrape request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrapeRequest {
    search_term: String,
    page_count: u32,
}

impl ScrapeRequest {
    /// Validates the caller's input before any network activity
    ///
    /// The search term is trimmed and runs of whitespace collapse to one space.
    ///
    /// # Returns
    ///
    /// * `Ok(ScrapeRequest)` - Term is non-empty and page count is within `1..=max_pages`
    /// * `Err(SiftError::EmptySearchTerm)` - Term is empty or whitespace only
    /// * `Err(SiftError::InvalidPageCount)` - Page count is 0 or above `max_pages`
    pub fn new(search_term: &str, page_count: u32, max_pages: u32) -> Result<Self, SiftError> {
        let search_term = normalize_term(search_term);
        if search_term.is_empty() {
            return Err(SiftError::EmptySearchTerm);
        }

        if page_count < 1 || page_count > max_pages {
            return Err(SiftError::InvalidPageCount {
                requested: page_count,
                max: max_pages,
            });
        }

        Ok(Self {
            search_term,
            page_count,
        })
    }

    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    pub fn page_count(&self) -> u32 {
        self.page_count
    }
}

/// Collapses whitespace runs and trims the ends
pub fn normalize_term(term: &str) -> String {
    term.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Builds the search URL for one page
///
/// # Example
///
/// ```
/// use sumi_sift::config::ScraperConfig;
/// use sumi_sift::pipeline::build_page_url;
///
/// let url = build_page_url(&ScraperConfig::default(), "film camera", 2).unwrap();
/// assert_eq!(
///     url.as_str(),
///     "https://www.ebay.com/sch/i.html?_nkw=film+camera&_sacat=0&_pgn=2"
/// );
/// ```
pub fn build_page_url(config: &ScraperConfig, search_term: &str, page: u32) -> Result<Url, SiftError> {
    let mut url = Url::parse(&config.base_url)?;
    url.query_pairs_mut()
        .clear()
        .append_pair("_nkw", &normalize_term(search_term))
        .append_pair("_sacat", &config.category)
        .append_pair("_pgn", &page.to_string());
    Ok(url)
}
