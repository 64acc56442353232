//! AliExpress search page extractor
//!
//! Prices on the Korean storefront are quoted in USD and converted with the
//! snapshot's USD rate.

use crate::services::normalizer::{extract_price, format_krw};
use crate::services::rates::ExchangeRateSnapshot;
use crate::types::{
    Currency, ExtractReport, ItemFailure, PriceCmpError, ProductListing, Result, Source,
};
use scraper::{CaseSensitivity, ElementRef, Html, Selector};
use std::sync::{Arc, LazyLock};
use tracing::{debug, warn};

use super::{secure_url, stripped_text, PageFetcher, NO_TITLE};

/// Link text used when a product container sits outside any product anchor
pub const NO_LINK: &str = "(링크 없음)";

/// Class of the anchor wrapping each product card
const CARD_ANCHOR_CLASS: &str = "search-card-item";

mod selectors {
    use super::*;

    pub static CONTAINER: LazyLock<Selector> =
        LazyLock::new(|| Selector::parse("div.jr_t").expect("valid selector"));

    pub static TITLE: LazyLock<Selector> =
        LazyLock::new(|| Selector::parse("h3.jr_kp").expect("valid selector"));

    pub static IMAGE: LazyLock<Selector> =
        LazyLock::new(|| Selector::parse("img.mm_be").expect("valid selector"));

    pub static PRICE_FRAGMENT: LazyLock<Selector> =
        LazyLock::new(|| Selector::parse("div.jr_kr span").expect("valid selector"));
}

/// Search URL for a keyword; the keyword is interpolated as-is
pub fn search_url(keyword: &str) -> String {
    format!("https://ko.aliexpress.com/w/wholesale-{}.html", keyword)
}

/// Extractor for AliExpress keyword searches
pub struct AliExpressSource {
    fetcher: Arc<dyn PageFetcher>,
    max_items: usize,
}

impl AliExpressSource {
    pub fn new(fetcher: Arc<dyn PageFetcher>, max_items: usize) -> Self {
        Self { fetcher, max_items }
    }

    /// Fetch and extract up to `max_items` listings for `keyword`.
    ///
    /// A failed fetch yields an empty report flagged `fetch_failed`.
    pub async fn fetch(&self, keyword: &str, rates: &ExchangeRateSnapshot) -> ExtractReport {
        let url = search_url(keyword);
        match self.fetcher.fetch_page(&url).await {
            Ok(html) => parse_search_page(&html, rates, self.max_items),
            Err(e) => {
                warn!(source = %Source::AliExpress, error = %e, "Search page request failed");
                ExtractReport::fetch_failed()
            }
        }
    }
}

/// Extract listings from a search results page
pub fn parse_search_page(
    html: &str,
    rates: &ExchangeRateSnapshot,
    max_items: usize,
) -> ExtractReport {
    let document = Html::parse_document(html);
    let mut report = ExtractReport::default();

    for (index, container) in document.select(&selectors::CONTAINER).enumerate() {
        if report.listings.len() >= max_items {
            break;
        }
        match parse_container(container, rates) {
            Ok(listing) => report.listings.push(listing),
            Err(e) => {
                debug!(source = %Source::AliExpress, index, error = %e, "Skipping listing");
                report.failures.push(ItemFailure {
                    index,
                    reason: e.to_string(),
                });
            }
        }
    }

    debug!(
        source = %Source::AliExpress,
        listings = report.listings.len(),
        failures = report.failures.len(),
        "Parsed search page"
    );
    report
}

fn parse_container(
    container: ElementRef<'_>,
    rates: &ExchangeRateSnapshot,
) -> Result<ProductListing> {
    let title = container
        .select(&selectors::TITLE)
        .next()
        .map(stripped_text)
        .unwrap_or_else(|| NO_TITLE.to_string());

    let (link, image_url) = match card_anchor(container) {
        Some(anchor) => {
            let link = secure_url(anchor.value().attr("href").unwrap_or(""));
            let image_url = match anchor.select(&selectors::IMAGE).next() {
                Some(img) => secure_url(img.value().attr("src").ok_or_else(|| {
                    PriceCmpError::Parse("product image has no src".into())
                })?),
                None => String::new(),
            };
            (link, image_url)
        }
        None => (NO_LINK.to_string(), String::new()),
    };

    let raw_price: String = container
        .select(&selectors::PRICE_FRAGMENT)
        .map(stripped_text)
        .collect();
    let price_value = extract_price(raw_price.trim(), Some(Currency::Usd), rates);

    Ok(ProductListing {
        title,
        price_display: format_krw(price_value),
        price_value,
        image_url,
        link,
        source: Source::AliExpress,
    })
}

/// Nearest enclosing `a.search-card-item`
fn card_anchor(container: ElementRef<'_>) -> Option<ElementRef<'_>> {
    container.ancestors().filter_map(ElementRef::wrap).find(|el| {
        el.value().name() == "a"
            && el
                .value()
                .has_class(CARD_ANCHOR_CLASS, CaseSensitivity::CaseSensitive)
    })
}
