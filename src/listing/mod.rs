//! Listing records and the field catalogue
//!
//! # Components
//!
//! - `Field`: every field a listing record carries, with its column name
//! - `ListingRecord`: one scraped listing, every field always present

mod field;
mod record;

pub use field::{Field, DEFAULT_COLUMNS};
pub use record::{ListingRecord, NOT_AVAILABLE};
