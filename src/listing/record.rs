/// Listing record definition
///
/// A record always carries every field. Missing markup is represented by the
/// `NOT_AVAILABLE` sentinel, never by leaving a field out.
use crate::listing::Field;
use regex::Regex;
use std::sync::OnceLock;

/// Placeholder written for any field the page did not provide
pub const NOT_AVAILABLE: &str = "N/A";

/// Path segment pattern carrying the numeric item identifier
const ITEM_PATH_PATTERN: &str = r"/itm/(\d+)";

/// One scraped listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingRecord {
    title: String,
    price: String,
    condition: String,
    shipping: String,
    location: String,
    seller_rating: String,
    bids: String,
    time_left: String,
    post_date: String,
    item_number: String,
    link: String,
    image_url: String,
}

impl ListingRecord {
    /// Builds a record from a per-field lookup
    ///
    /// `lookup` is asked once for every field except `ItemNumber`, which is always
    /// derived from the link. A `None` answer stores the sentinel.
    ///
    /// # Example
    ///
    /// ```
    /// use sumi_sift::listing::{Field, ListingRecord, NOT_AVAILABLE};
    ///
    /// let record = ListingRecord::from_lookup(|field| match field {
    ///     Field::Title => Some("Film camera".to_string()),
    ///     Field::Link => Some("https://www.ebay.com/itm/12345?hash=x".to_string()),
    ///     _ => None,
    /// });
    /// assert_eq!(record.item_number(), "12345");
    /// assert_eq!(record.get(Field::Price), NOT_AVAILABLE);
    /// ```
    pub fn from_lookup<F>(mut lookup: F) -> Self
    where
        F: FnMut(Field) -> Option<String>,
    {
        let mut value = |field: Field| -> String {
            lookup(field)
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| NOT_AVAILABLE.to_string())
        };

        let title = value(Field::Title);
        let price = value(Field::Price);
        let condition = value(Field::Condition);
        let shipping = value(Field::Shipping);
        let location = value(Field::Location);
        let seller_rating = value(Field::SellerRating);
        let bids = value(Field::Bids);
        let time_left = value(Field::TimeLeft);
        let post_date = value(Field::PostDate);
        let link = value(Field::Link);
        let image_url = value(Field::ImageUrl);
        let item_number = item_number_from_link(&link);

        Self {
            title,
            price,
            condition,
            shipping,
            location,
            seller_rating,
            bids,
            time_left,
            post_date,
            item_number,
            link,
            image_url,
        }
    }

    /// Returns the text stored for a field (the sentinel when absent)
    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::Title => &self.title,
            Field::Price => &self.price,
            Field::Condition => &self.condition,
            Field::Shipping => &self.shipping,
            Field::Location => &self.location,
            Field::SellerRating => &self.seller_rating,
            Field::Bids => &self.bids,
            Field::TimeLeft => &self.time_left,
            Field::PostDate => &self.post_date,
            Field::ItemNumber => &self.item_number,
            Field::Link => &self.link,
            Field::ImageUrl => &self.image_url,
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn price(&self) -> &str {
        &self.price
    }

    pub fn link(&self) -> &str {
        &self.link
    }

    pub fn item_number(&self) -> &str {
        &self.item_number
    }

    /// Returns (column name, value) pairs for every field, in record order
    pub fn entries(&self) -> impl Iterator<Item = (&'static str, &str)> + '_ {
        Field::ALL
            .into_iter()
            .map(move |field| (field.column_name(), self.get(field)))
    }

    /// Returns true if the field holds the sentinel
    pub fn is_missing(&self, field: Field) -> bool {
        self.get(field) == NOT_AVAILABLE
    }
}

/// Extracts the numeric item identifier from a listing link
///
/// Returns the sentinel when the link is the sentinel or has no `/itm/<digits>`
/// segment.
pub fn item_number_from_link(link: &str) -> String {
    if link == NOT_AVAILABLE {
        return NOT_AVAILABLE.to_string();
    }

    item_path_regex()
        .and_then(|re| re.captures(link))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

fn item_path_regex() -> Option<&'static Regex> {
    static ITEM_PATH: OnceLock<Option<Regex>> = OnceLock::new();
    ITEM_PATH
        .get_or_init(|| Regex::new(ITEM_PATH_PATTERN).ok())
        .as_ref()
}
