//! Display price parsing
//!
//! Prices stay raw text in records. For display, a single price parses to its
//! value and a range (`"<low> to <high>"`) to the midpoint of its bounds.

use crate::listing::NOT_AVAILABLE;
use thiserror::Error;

/// Separator between the bounds of a price range
const RANGE_SEPARATOR: &str = " to ";

/// Why a price text has no numeric value
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PriceError {
    #[error("price not available")]
    Missing,

    #[error("malformed price text: '{0}'")]
    Malformed(String),
}

/// Parses display price text into a number
///
/// Currency symbols, codes and thousands separators are ignored.
///
/// # Example
///
/// ```
/// use sumi_sift::output::parse_price;
///
/// assert_eq!(parse_price("$1,250.00"), Ok(1250.0));
/// assert_eq!(parse_price("$10.00 to $20.00"), Ok(15.0));
/// assert!(parse_price("N/A").is_err());
/// ```
pub fn parse_price(text: &str) -> Result<f64, PriceError> {
    let text = text.trim();
    if text.is_empty() || text == NOT_AVAILABLE {
        return Err(PriceError::Missing);
    }

    match text.split_once(RANGE_SEPARATOR) {
        Some((low, high)) => {
            let low = parse_amount(low).ok_or_else(|| PriceError::Malformed(text.to_string()))?;
            let high =
                parse_amount(high).ok_or_else(|| PriceError::Malformed(text.to_string()))?;
            Ok((low + high) / 2.0)
        }
        None => parse_amount(text).ok_or_else(|| PriceError::Malformed(text.to_string())),
    }
}

/// Parses one amount such as `$1,250.00` or `GBP 12.99`
///
/// Only `.` is read as the decimal point. A `,` must be a thousands separator
/// (followed by exactly three digits), so comma-decimal amounts such as
/// `EUR 1.250,00` are rejected rather than misread.
fn parse_amount(text: &str) -> Option<f64> {
    if !commas_are_grouping(text) {
        return None;
    }

    let digits: String = text
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();

    if digits.is_empty() {
        return None;
    }

    digits.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// True when every `,` is followed by a group of exactly three digits
fn commas_are_grouping(text: &str) -> bool {
    let bytes = text.as_bytes();
    bytes.iter().enumerate().all(|(i, &b)| {
        if b != b',' {
            return true;
        }
        let group = &bytes[i + 1..];
        group.len() >= 3
            && group[..3].iter().all(u8::is_ascii_digit)
            && !group.get(3).is_some_and(u8::is_ascii_digit)
    })
}
