//! Pagination orchestration - the main scrape loop
//!
//! This module drives the fetcher across the requested page range:
//! - Validating the request before any network activity
//! - Notifying the progress sink for each page
//! - Concatenating page results in page order
//! - Stopping at the first page that yields nothing
//! - Pausing a random interval between pages
//! - Rendering the final table

use crate::config::{validate, Config};
use crate::listing::{Field, ListingRecord};
use crate::output::render_table;
use crate::pacing::{secs_to_duration, Clock, RandomSource, ThreadRandom, TokioClock};
use crate::pipeline::fetcher::{build_http_client, PageFetcher};
use crate::pipeline::query::{build_page_url, ScrapeRequest};
use crate::SiftError;
use std::time::Duration;

/// Receives per-page progress notifications
///
/// Called synchronously, in ascending page order, right before each page is
/// fetched. Implementations should return quickly; the scrape waits on them.
pub trait ProgressSink {
    fn on_page(&mut self, page: u32, total_pages: u32);
}

impl<F> ProgressSink for F
where
    F: FnMut(u32, u32),
{
    fn on_page(&mut self, page: u32, total_pages: u32) {
        self(page, total_pages)
    }
}

/// Outcome of a scrape
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrapeResult {
    /// Normalized search term the pages were requested for
    pub search_term: String,

    /// Records in page order, then in-page order
    pub records: Vec<ListingRecord>,

    /// Serialized table, `None` when no records were scraped
    pub table: Option<String>,

    /// Number of pages requested from the site
    pub pages_fetched: u32,

    /// True when an empty page ended pagination before the last requested page
    pub stopped_early: bool,
}

impl ScrapeResult {
    /// True when nothing was scraped at all
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Sequential multi-page scraper
pub struct Scraper<C = TokioClock, R = ThreadRandom> {
    config: Config,
    columns: Vec<Field>,
    fetcher: PageFetcher<C, R>,
    clock: C,
    random: R,
}

impl Scraper {
    /// Creates a scraper that sleeps on the wall clock and draws from `rand`
    pub fn new(config: Config) -> Result<Self, SiftError> {
        Self::with_pacing(config, TokioClock, ThreadRandom)
    }
}

impl<C: Clock, R: RandomSource> Scraper<C, R> {
    /// Creates a scraper with explicit clock and randomness sources
    ///
    /// # Returns
    ///
    /// * `Ok(Scraper)` - Configuration is valid and the HTTP client was built
    /// * `Err(SiftError)` - Invalid configuration or client build failure
    pub fn with_pacing(config: Config, clock: C, random: R) -> Result<Self, SiftError> {
        validate(&config)?;
        let columns = config.output.fields()?;
        let client = build_http_client()?;
        let fetcher = PageFetcher::new(client, &config, clock.clone(), random.clone());

        Ok(Self {
            config,
            columns,
            fetcher,
            clock,
            random,
        })
    }

    /// Validates the input and scrapes `page_count` pages for `search_term`
    ///
    /// Empty terms and out-of-range page counts are rejected before any request
    /// is sent. Everything else, including a site that returns nothing, produces
    /// an `Ok` result.
    pub async fn scrape(
        &self,
        search_term: &str,
        page_count: u32,
        progress: Option<&mut dyn ProgressSink>,
    ) -> Result<ScrapeResult, SiftError> {
        let request = ScrapeRequest::new(search_term, page_count, self.config.scraper.max_pages)?;
        self.run(&request, progress).await
    }

    /// Runs the page loop for an already validated request
    ///
    /// The request's page count is checked again against this scraper's
    /// configured `max_pages`, since the request may have been built with a
    /// different limit.
    pub async fn run(
        &self,
        request: &ScrapeRequest,
        mut progress: Option<&mut dyn ProgressSink>,
    ) -> Result<ScrapeResult, SiftError> {
        let total_pages = request.page_count();
        let max_pages = self.config.scraper.max_pages;
        if total_pages > max_pages {
            return Err(SiftError::InvalidPageCount {
                requested: total_pages,
                max: max_pages,
            });
        }
        let mut records: Vec<ListingRecord> = Vec::new();
        let mut pages_fetched = 0;
        let mut stopped_early = false;

        tracing::info!(
            "Scraping up to {} pages for '{}'",
            total_pages,
            request.search_term()
        );

        for page in 1..=total_pages {
            if let Some(sink) = progress.as_deref_mut() {
                sink.on_page(page, total_pages);
            }

            let url = build_page_url(&self.config.scraper, request.search_term(), page)?;
            tracing::info!("Scraping page {}/{}", page, total_pages);
            tracing::debug!("Page URL: {}", url);

            let page_records = self.fetcher.fetch_listings(&url).await;
            pages_fetched = page;

            if page_records.is_empty() {
                stopped_early = page < total_pages;
                tracing::info!("Page {} returned no listings, stopping pagination", page);
                break;
            }

            records.extend(page_records);

            if page < total_pages {
                let delay = self.page_delay();
                tracing::debug!("Pausing {:.2}s before next page", delay.as_secs_f64());
                self.clock.sleep(delay).await;
            }
        }

        tracing::info!(
            "Collected {} records from {} pages",
            records.len(),
            pages_fetched
        );

        let table = render_table(&records, &self.columns)?;

        Ok(ScrapeResult {
            search_term: request.search_term().to_string(),
            records,
            table,
            pages_fetched,
            stopped_early,
        })
    }

    /// Random pause between successive pages
    fn page_delay(&self) -> Duration {
        let scraper = &self.config.scraper;
        let secs = self
            .random
            .uniform(scraper.page_delay_min_secs, scraper.page_delay_max_secs);
        secs_to_duration(secs)
    }
}
