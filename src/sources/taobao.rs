//! Taobao category page extractor
//!
//! Taobao listing pages are not addressable from a keyword, so the category
//! page is first discovered through a web search scoped to the Taobao
//! domain. The `local-price` field is already in KRW.

use crate::services::normalizer::{extract_price, format_krw};
use crate::services::rates::ExchangeRateSnapshot;
use crate::types::{Currency, ExtractReport, ProductListing, Source};
use scraper::{ElementRef, Html, Selector};
use std::sync::{Arc, LazyLock};
use tracing::{debug, info, warn};

use super::{secure_url, stripped_text, PageFetcher, WebSearch, NO_TITLE};

/// Domain the category search is scoped to
const SEARCH_SITE: &str = "www.taobao.com";

/// URL fragments of pages that are never category listings
const EXCLUDED_URL_PARTS: [&str; 2] = ["item.taobao.com", "login.taobao.com"];

mod selectors {
    use super::*;

    pub static ITEM: LazyLock<Selector> =
        LazyLock::new(|| Selector::parse("a.item").expect("valid selector"));

    pub static IMAGE: LazyLock<Selector> =
        LazyLock::new(|| Selector::parse("img.item-img").expect("valid selector"));

    pub static TITLE: LazyLock<Selector> =
        LazyLock::new(|| Selector::parse("div.item-title").expect("valid selector"));

    pub static LOCAL_PRICE: LazyLock<Selector> =
        LazyLock::new(|| Selector::parse("div.local-price").expect("valid selector"));
}

/// Extractor for Taobao category pages
pub struct TaobaoSource {
    fetcher: Arc<dyn PageFetcher>,
    search: Arc<dyn WebSearch>,
    max_items: usize,
    max_candidates: usize,
}

impl TaobaoSource {
    pub fn new(
        fetcher: Arc<dyn PageFetcher>,
        search: Arc<dyn WebSearch>,
        max_items: usize,
        max_candidates: usize,
    ) -> Self {
        Self {
            fetcher,
            search,
            max_items,
            max_candidates,
        }
    }

    /// Discover a category page for `query`.
    ///
    /// Search failures resolve to `None` so the caller can skip Taobao.
    pub async fn resolve_category_url(&self, query: &str) -> Option<String> {
        let search_query = format!("site:{} {}", SEARCH_SITE, query);
        match self.search.search(&search_query, self.max_candidates).await {
            Ok(candidates) => {
                let url = pick_category_url(candidates);
                match &url {
                    Some(url) => info!(source = %Source::Taobao, %url, "Resolved category page"),
                    None => info!(source = %Source::Taobao, query, "No category page candidate"),
                }
                url
            }
            Err(e) => {
                warn!(source = %Source::Taobao, error = %e, "Category search failed");
                None
            }
        }
    }

    /// Fetch and extract up to `max_items` listings from a category page
    pub async fn fetch(&self, category_url: &str, rates: &ExchangeRateSnapshot) -> ExtractReport {
        match self.fetcher.fetch_page(category_url).await {
            Ok(html) => parse_category_page(&html, rates, self.max_items),
            Err(e) => {
                warn!(source = %Source::Taobao, error = %e, "Category page request failed");
                ExtractReport::fetch_failed()
            }
        }
    }
}

/// First candidate that is neither an item detail page nor a login page
pub fn pick_category_url(candidates: impl IntoIterator<Item = String>) -> Option<String> {
    candidates
        .into_iter()
        .find(|url| !EXCLUDED_URL_PARTS.iter().any(|part| url.contains(part)))
}

/// Extract listings from a category page
pub fn parse_category_page(
    html: &str,
    rates: &ExchangeRateSnapshot,
    max_items: usize,
) -> ExtractReport {
    let document = Html::parse_document(html);
    let listings: Vec<ProductListing> = document
        .select(&selectors::ITEM)
        .take(max_items)
        .map(|anchor| parse_item(anchor, rates))
        .collect();

    debug!(source = %Source::Taobao, listings = listings.len(), "Parsed category page");
    ExtractReport {
        listings,
        ..ExtractReport::default()
    }
}

fn parse_item(anchor: ElementRef<'_>, rates: &ExchangeRateSnapshot) -> ProductListing {
    let href = anchor.value().attr("href").unwrap_or("");
    let link = if href.starts_with("http") {
        href.to_string()
    } else {
        format!("https:{}", href)
    };

    let image_url = anchor
        .select(&selectors::IMAGE)
        .next()
        .and_then(|img| img.value().attr("src"))
        .map(secure_url)
        .unwrap_or_default();

    let title = anchor
        .select(&selectors::TITLE)
        .next()
        .map(stripped_text)
        .unwrap_or_else(|| NO_TITLE.to_string());

    let local_price = anchor
        .select(&selectors::LOCAL_PRICE)
        .next()
        .map(stripped_text)
        .unwrap_or_default();
    let price_value = extract_price(&local_price, Some(Currency::Krw), rates);

    ProductListing {
        title,
        price_display: format_krw(price_value),
        price_value,
        image_url,
        link,
        source: Source::Taobao,
    }
}
