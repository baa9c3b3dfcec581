//! Statistics over a scrape result
//!
//! This module summarizes a record set for display: how many records carry a
//! usable price and the spread of those prices.

use crate::listing::ListingRecord;
use crate::output::price::{parse_price, PriceError};
use crate::pipeline::ScrapeResult;

/// Scrape statistics summary
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScrapeStatistics {
    /// Total number of records scraped
    pub total_records: usize,

    /// Pages requested from the site
    pub pages_fetched: u32,

    /// Whether an empty page ended pagination early
    pub stopped_early: bool,

    /// Records whose price parsed to a number
    pub priced_records: usize,

    /// Records with no price at all
    pub missing_prices: usize,

    /// Records whose price text could not be parsed
    pub malformed_prices: usize,

    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub mean_price: Option<f64>,
}

impl ScrapeStatistics {
    /// Computes statistics for a scrape result
    pub fn from_result(result: &ScrapeResult) -> Self {
        let mut stats = Self::from_records(&result.records);
        stats.pages_fetched = result.pages_fetched;
        stats.stopped_early = result.stopped_early;
        stats
    }

    /// Computes price statistics over records
    ///
    /// Malformed prices are counted and skipped.
    pub fn from_records(records: &[ListingRecord]) -> Self {
        let mut stats = Self {
            total_records: records.len(),
            ..Self::default()
        };
        let mut prices = Vec::new();

        for record in records {
            match parse_price(record.price()) {
                Ok(price) => prices.push(price),
                Err(PriceError::Missing) => stats.missing_prices += 1,
                Err(e @ PriceError::Malformed(_)) => {
                    tracing::debug!("Skipping '{}': {}", record.title(), e);
                    stats.malformed_prices += 1;
                }
            }
        }

        stats.priced_records = prices.len();
        if !prices.is_empty() {
            stats.min_price = prices.iter().copied().reduce(f64::min);
            stats.max_price = prices.iter().copied().reduce(f64::max);
            stats.mean_price = Some(prices.iter().sum::<f64>() / prices.len() as f64);
        }

        stats
    }
}

/// Prints statistics to stdout
pub fn print_statistics(stats: &ScrapeStatistics) {
    println!("=== Sumi-Sift Statistics ===\n");

    println!("Pages fetched: {}", stats.pages_fetched);
    if stats.stopped_early {
        println!("  (stopped early at an empty page)");
    }
    println!("Records: {}", stats.total_records);

    println!("\nPrices:");
    println!("  Parsed: {}", stats.priced_records);
    println!("  Missing: {}", stats.missing_prices);
    println!("  Unparsable: {}", stats.malformed_prices);

    if let (Some(min), Some(max), Some(mean)) = (stats.min_price, stats.max_price, stats.mean_price)
    {
        println!("  Min: {:.2}", min);
        println!("  Max: {:.2}", max);
        println!("  Mean: {:.2}", mean);
    }
}
