//! Output module for scraped listings
//!
//! This module handles:
//! - Rendering records as a CSV table with a configurable column set
//! - Writing the table to a file named after the search term
//! - Price midpoint parsing and run statistics for display

pub mod price;
pub mod stats;
mod table;

pub use price::{parse_price, PriceError};
pub use stats::{print_statistics, ScrapeStatistics};
pub use table::{render_table, table_filename, write_table};

use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Failed to write output: {0}")]
    Write(String),

    #[error("Table is not valid UTF-8: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;
