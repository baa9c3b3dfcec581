//! Structural selectors for the search results page
//!
//! Every selector the extractor depends on lives in this file. When the page
//! layout changes, this table is the only thing that should need updating.

use crate::listing::Field;
use scraper::Selector;

/// One result card on the search page
pub const LISTING_CONTAINER: &str = "li.s-item";

/// Titles of cards the site injects that are not real listings
pub const DECORATIVE_TITLES: [&str; 1] = ["Shop on eBay"];

/// How a field's value is read from the matched element
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capture {
    /// Trimmed text content of the element and its descendants
    Text,
    /// First non-empty attribute among the listed names
    Attr(&'static [&'static str]),
}

/// Maps a record field to the sub-selector that provides it
#[derive(Debug, Clone, Copy)]
pub struct FieldSelector {
    pub field: Field,
    pub css: &'static str,
    pub capture: Capture,
}

/// Field -> selector table, relative to a listing container
///
/// `ItemNumber` is absent on purpose: it is derived from the link.
pub const FIELD_SELECTORS: [FieldSelector; 11] = [
    FieldSelector {
        field: Field::Title,
        css: ".s-item__title",
        capture: Capture::Text,
    },
    FieldSelector {
        field: Field::Price,
        css: ".s-item__price",
        capture: Capture::Text,
    },
    FieldSelector {
        field: Field::Condition,
        css: ".SECONDARY_INFO",
        capture: Capture::Text,
    },
    FieldSelector {
        field: Field::Shipping,
        css: ".s-item__shipping, .s-item__freeXDays",
        capture: Capture::Text,
    },
    FieldSelector {
        field: Field::Location,
        css: ".s-item__location",
        capture: Capture::Text,
    },
    FieldSelector {
        field: Field::SellerRating,
        css: ".x-star-rating",
        capture: Capture::Text,
    },
    FieldSelector {
        field: Field::Bids,
        css: ".s-item__bids",
        capture: Capture::Text,
    },
    FieldSelector {
        field: Field::TimeLeft,
        css: ".s-item__time-left",
        capture: Capture::Text,
    },
    FieldSelector {
        field: Field::PostDate,
        css: ".s-item__listingDate",
        capture: Capture::Text,
    },
    FieldSelector {
        field: Field::Link,
        css: ".s-item__link",
        capture: Capture::Attr(&["href"]),
    },
    FieldSelector {
        field: Field::ImageUrl,
        css: ".s-item__image-wrapper img, .s-item__image img",
        capture: Capture::Attr(&["src", "data-src"]),
    },
];

/// Returns the table entry for a field, if the field is read from markup
pub fn selector_for(field: Field) -> Option<&'static FieldSelector> {
    FIELD_SELECTORS.iter().find(|entry| entry.field == field)
}

/// Selectors parsed once and reused across pages
///
/// A selector that fails to parse is kept as `None`; the fields it would have
/// provided fall back to the sentinel instead of failing extraction.
#[derive(Debug)]
pub struct CompiledSelectors {
    pub container: Option<Selector>,
    pub fields: Vec<(FieldSelector, Option<Selector>)>,
}

impl CompiledSelectors {
    pub fn compile() -> Self {
        let container = parse_selector(LISTING_CONTAINER);
        let fields = FIELD_SELECTORS
            .iter()
            .map(|entry| (*entry, parse_selector(entry.css)))
            .collect();

        Self { container, fields }
    }
}

fn parse_selector(css: &str) -> Option<Selector> {
    match Selector::parse(css) {
        Ok(selector) => Some(selector),
        Err(e) => {
            tracing::error!("Invalid selector '{}': {:?}", css, e);
            None
        }
    }
}
