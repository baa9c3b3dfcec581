/// Field definitions for listing records
///
/// The field set is the superset of every table layout the tool has produced;
/// which fields end up in a table is a configuration choice.
use crate::ConfigError;
use std::fmt;

/// A single field of a listing record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Title,
    Price,
    Condition,
    Shipping,
    Location,
    SellerRating,
    Bids,
    TimeLeft,
    PostDate,
    ItemNumber,
    Link,
    ImageUrl,
}

/// Column order written when no columns are configured
pub const DEFAULT_COLUMNS: [Field; 10] = [
    Field::Title,
    Field::Price,
    Field::Condition,
    Field::Shipping,
    Field::Location,
    Field::SellerRating,
    Field::Bids,
    Field::ItemNumber,
    Field::Link,
    Field::ImageUrl,
];

impl Field {
    /// Every field, in record order
    pub const ALL: [Field; 12] = [
        Field::Title,
        Field::Price,
        Field::Condition,
        Field::Shipping,
        Field::Location,
        Field::SellerRating,
        Field::Bids,
        Field::TimeLeft,
        Field::PostDate,
        Field::ItemNumber,
        Field::Link,
        Field::ImageUrl,
    ];

    /// Returns the column name used in table headers and configuration
    pub fn column_name(&self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Price => "price",
            Self::Condition => "condition",
            Self::Shipping => "shipping",
            Self::Location => "location",
            Self::SellerRating => "seller_rating",
            Self::Bids => "bids",
            Self::TimeLeft => "time_left",
            Self::PostDate => "post_date",
            Self::ItemNumber => "item_number",
            Self::Link => "link",
            Self::ImageUrl => "image_url",
        }
    }

    /// Looks up a field by its column name
    ///
    /// # Arguments
    ///
    /// * `name` - Column name, e.g. `seller_rating`
    ///
    /// # Returns
    ///
    /// * `Ok(Field)` - The matching field
    /// * `Err(ConfigError::UnknownColumn)` - No field uses that column name
    pub fn from_column_name(name: &str) -> Result<Self, ConfigError> {
        let name = name.trim();
        Self::ALL
            .into_iter()
            .find(|field| field.column_name() == name)
            .ok_or_else(|| ConfigError::UnknownColumn(name.to_string()))
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column_name())
    }
}
