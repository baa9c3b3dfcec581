//! Listing extraction from search result markup
//!
//! Extraction is total: any input produces a (possibly empty) list of records.
//! Each field is looked up independently, so a renamed or missing element costs
//! one field, not the whole record.

use crate::listing::{Field, ListingRecord, NOT_AVAILABLE};
use crate::pipeline::selectors::{Capture, CompiledSelectors, DECORATIVE_TITLES};
use scraper::{ElementRef, Html, Selector};

/// Number of bytes of markup logged when no listing containers match
const DRIFT_PREVIEW_BYTES: usize = 1000;

/// Extracts listing records from search result pages
#[derive(Debug)]
pub struct ListingExtractor {
    selectors: CompiledSelectors,
}

impl Default for ListingExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl ListingExtractor {
    pub fn new() -> Self {
        Self {
            selectors: CompiledSelectors::compile(),
        }
    }

    /// Parses one page of markup into listing records
    ///
    /// # Exclusion Rules
    ///
    /// A card is dropped when its title is the sentinel or one of the
    /// decorative placeholder titles the site injects.
    ///
    /// # Example
    ///
    /// ```
    /// use sumi_sift::pipeline::ListingExtractor;
    ///
    /// let html = r#"<ul><li class="s-item">
    ///     <div class="s-item__title">Film camera</div>
    ///     <span class="s-item__price">$40.00</span>
    /// </li></ul>"#;
    /// let records = ListingExtractor::new().extract(html);
    /// assert_eq!(records.len(), 1);
    /// assert_eq!(records[0].price(), "$40.00");
    /// ```
    pub fn extract(&self, html: &str) -> Vec<ListingRecord> {
        let Some(container) = &self.selectors.container else {
            return Vec::new();
        };

        let document = Html::parse_document(html);
        let cards: Vec<ElementRef<'_>> = document.select(container).collect();

        if cards.is_empty() {
            tracing::warn!("No listings found. The page structure might have changed.");
            tracing::debug!("Page content: {}", preview(html));
            return Vec::new();
        }

        let records: Vec<ListingRecord> = cards
            .into_iter()
            .map(|card| self.extract_card(card))
            .filter(is_real_listing)
            .collect();

        tracing::debug!("Extracted {} listings", records.len());
        records
    }

    /// Builds one record from a listing container
    fn extract_card(&self, card: ElementRef<'_>) -> ListingRecord {
        ListingRecord::from_lookup(|field| self.field_value(card, field))
    }

    /// Looks up a single field inside a card; `None` means absent
    fn field_value(&self, card: ElementRef<'_>, field: Field) -> Option<String> {
        let (entry, selector) = self
            .selectors
            .fields
            .iter()
            .find(|(entry, _)| entry.field == field)?;
        let selector: &Selector = selector.as_ref()?;
        let element = card.select(selector).next()?;

        match entry.capture {
            Capture::Text => {
                let text = element.text().collect::<String>();
                Some(text.trim().to_string())
            }
            Capture::Attr(names) => names
                .iter()
                .filter_map(|name| element.value().attr(name))
                .map(str::trim)
                .find(|value| !value.is_empty())
                .map(str::to_string),
        }
    }
}

/// Convenience function for one-off extraction
pub fn extract_listings(html: &str) -> Vec<ListingRecord> {
    ListingExtractor::new().extract(html)
}

/// Returns false for sentinel-titled and decorative cards
fn is_real_listing(record: &ListingRecord) -> bool {
    let title = record.title();
    title != NOT_AVAILABLE && !DECORATIVE_TITLES.contains(&title)
}

/// Returns at most `DRIFT_PREVIEW_BYTES` of the markup, cut on a char boundary
fn preview(html: &str) -> &str {
    if html.len() <= DRIFT_PREVIEW_BYTES {
        return html;
    }
    let mut end = DRIFT_PREVIEW_BYTES;
    while !html.is_char_boundary(end) {
        end -= 1;
    }
    &html[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card(inner: &str) -> String {
        format!(r#"<li class="s-item">{}</li>"#, inner)
    }

    fn page(cards: &[String]) -> String {
        format!(
            "<html><body><ul class=\"srp-results\">{}</ul></body></html>",
            cards.concat()
        )
    }

    fn full_card() -> String {
        card(
            r#"
            <div class="s-item__image-wrapper"><img src="https://i.ebayimg.com/1.jpg"></div>
            <a class="s-item__link" href="https://www.ebay.com/itm/1234567890?hash=abc">
                <div class="s-item__title"><span>Canon AE-1 Program</span></div>
            </a>
            <span class="SECONDARY_INFO">Pre-Owned</span>
            <span class="s-item__price">$120.00 to $150.00</span>
            <span class="s-item__shipping">+$15.00 shipping</span>
            <span class="s-item__location">from Japan</span>
            <div class="x-star-rating">4.5 out of 5 stars</div>
            <span class="s-item__bids">3 bids</span>
            <span class="s-item__time-left">2d 4h left</span>
            <span class="s-item__listingDate">Oct-12 09:30</span>
        "#,
        )
    }

    #[test]
    fn test_extract_full_card() {
        let records = extract_listings(&page(&[full_card()]));
        assert_eq!(records.len(), 1);

        let record = &records[0];
        assert_eq!(record.title(), "Canon AE-1 Program");
        assert_eq!(record.price(), "$120.00 to $150.00");
        assert_eq!(record.get(Field::Condition), "Pre-Owned");
        assert_eq!(record.get(Field::Shipping), "+$15.00 shipping");
        assert_eq!(record.get(Field::Location), "from Japan");
        assert_eq!(record.get(Field::SellerRating), "4.5 out of 5 stars");
        assert_eq!(record.get(Field::Bids), "3 bids");
        assert_eq!(record.get(Field::TimeLeft), "2d 4h left");
        assert_eq!(record.get(Field::PostDate), "Oct-12 09:30");
        assert_eq!(
            record.link(),
            "https://www.ebay.com/itm/1234567890?hash=abc"
        );
        assert_eq!(record.item_number(), "1234567890");
        assert_eq!(record.get(Field::ImageUrl), "https://i.ebayimg.com/1.jpg");
    }

    #[test]
    fn test_no_containers_returns_empty() {
        let html = "<html><body><div class=\"captcha\">Please verify</div></body></html>";
        assert!(extract_listings(html).is_empty());
    }

    #[test]
    fn test_garbage_input_returns_empty() {
        assert!(extract_listings("").is_empty());
        assert!(extract_listings("<<<not html at all").is_empty());
    }

    #[test]
    fn test_missing_sub_elements_use_sentinel() {
        let html = page(&[card(r#"<div class="s-item__title">Bare listing</div>"#)]);
        let records = extract_listings(&html);
        assert_eq!(records.len(), 1);

        let record = &records[0];
        assert_eq!(record.title(), "Bare listing");
        for field in Field::ALL {
            if field != Field::Title {
                assert_eq!(record.get(field), NOT_AVAILABLE, "{}", field);
            }
        }
    }

    #[test]
    fn test_renamed_field_degrades_only_that_field() {
        let html = page(&[card(
            r#"<div class="s-item__title">Lens</div>
               <span class="s-item__cost">$10.00</span>
               <span class="s-item__location">from Germany</span>"#,
        )]);
        let records = extract_listings(&html);
        assert_eq!(records[0].price(), NOT_AVAILABLE);
        assert_eq!(records[0].get(Field::Location), "from Germany");
    }

    #[test]
    fn test_decorative_card_excluded() {
        let html = page(&[
            card(r#"<div class="s-item__title">Shop on eBay</div><span class="s-item__price">$20.00</span>"#),
            full_card(),
        ]);
        let records = extract_listings(&html);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].title(), "Canon AE-1 Program");
    }

    #[test]
    fn test_untitled_card_excluded() {
        let html = page(&[card(r#"<span class="s-item__price">$20.00</span>"#)]);
        assert!(extract_listings(&html).is_empty());
    }

    #[test]
    fn test_free_shipping_alternative_selector() {
        let html = page(&[card(
            r#"<div class="s-item__title">Strap</div><span class="s-item__freeXDays">Free 3 day shipping</span>"#,
        )]);
        let records = extract_listings(&html);
        assert_eq!(records[0].get(Field::Shipping), "Free 3 day shipping");
    }

    #[test]
    fn test_link_without_item_path() {
        let html = page(&[card(
            r#"<a class="s-item__link" href="https://www.ebay.com/p/998877"><div class="s-item__title">Product page</div></a>"#,
        )]);
        let records = extract_listings(&html);
        assert_eq!(records[0].link(), "https://www.ebay.com/p/998877");
        assert_eq!(records[0].item_number(), NOT_AVAILABLE);
    }

    #[test]
    fn test_link_without_href_is_sentinel() {
        let html = page(&[card(
            r#"<a class="s-item__link"><div class="s-item__title">No href</div></a>"#,
        )]);
        let records = extract_listings(&html);
        assert_eq!(records[0].link(), NOT_AVAILABLE);
        assert_eq!(records[0].item_number(), NOT_AVAILABLE);
    }

    #[test]
    fn test_lazy_image_falls_back_to_data_src() {
        let html = page(&[card(
            r#"<div class="s-item__title">Tripod</div>
               <div class="s-item__image"><img data-src="https://i.ebayimg.com/2.jpg"></div>"#,
        )]);
        let records = extract_listings(&html);
        assert_eq!(records[0].get(Field::ImageUrl), "https://i.ebayimg.com/2.jpg");
    }

    #[test]
    fn test_page_order_preserved() {
        let cards: Vec<String> = (1..=3)
            .map(|i| card(&format!(r#"<div class="s-item__title">Item {}</div>"#, i)))
            .collect();
        let records = extract_listings(&page(&cards));
        let titles: Vec<&str> = records.iter().map(ListingRecord::title).collect();
        assert_eq!(titles, vec!["Item 1", "Item 2", "Item 3"]);
    }

    #[test]
    fn test_preview_respects_char_boundary() {
        let html = "é".repeat(DRIFT_PREVIEW_BYTES);
        let cut = preview(&html);
        assert!(cut.len() <= DRIFT_PREVIEW_BYTES);
        assert!(html.starts_with(cut));
    }
}
