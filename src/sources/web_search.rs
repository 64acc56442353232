//! Web search used to discover marketplace category pages

use crate::types::{PriceCmpError, Result};
use async_trait::async_trait;
use scraper::{Html, Selector};
use std::collections::HashSet;
use std::sync::{Arc, LazyLock};
use url::Url;

use super::PageFetcher;

const GOOGLE_SEARCH_URL: &str = "https://www.google.com/search";

static RESULT_ANCHOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a[href]").expect("valid selector"));

/// Returns result URLs for a query, best match first
#[async_trait]
pub trait WebSearch: Send + Sync {
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<String>>;
}

/// Scrapes Google's HTML results page
pub struct GoogleSearch {
    fetcher: Arc<dyn PageFetcher>,
}

impl GoogleSearch {
    pub fn new(fetcher: Arc<dyn PageFetcher>) -> Self {
        Self { fetcher }
    }

    fn search_url(query: &str, max_results: usize) -> Result<Url> {
        Url::parse_with_params(
            GOOGLE_SEARCH_URL,
            &[
                ("q", query),
                ("num", &max_results.to_string()),
                ("hl", "en"),
            ],
        )
        .map_err(|e| PriceCmpError::Parse(format!("search url: {}", e)))
    }
}

#[async_trait]
impl WebSearch for GoogleSearch {
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<String>> {
        let url = Self::search_url(query, max_results)?;
        let html = self.fetcher.fetch_page(url.as_str()).await?;
        Ok(parse_result_links(&html, max_results))
    }
}

/// Collect outbound result links from a results page, deduplicated in page order
pub fn parse_result_links(html: &str, max_results: usize) -> Vec<String> {
    let document = Html::parse_document(html);
    let mut seen = HashSet::new();
    let mut links = Vec::new();

    for anchor in document.select(&RESULT_ANCHOR) {
        if links.len() >= max_results {
            break;
        }
        let Some(href) = anchor.value().attr("href") else {
            continue;
        };
        let target = if href.starts_with("/url?") {
            redirect_target(href)
        } else if href.starts_with("http") && !is_google_host(href) {
            Some(href.to_string())
        } else {
            None
        };
        if let Some(target) = target {
            if seen.insert(target.clone()) {
                links.push(target);
            }
        }
    }

    links
}

/// Destination of a `/url?q=<target>&...` redirect link
fn redirect_target(href: &str) -> Option<String> {
    let url = Url::parse("https://www.google.com").ok()?.join(href).ok()?;
    url.query_pairs()
        .find(|(key, _)| key == "q")
        .map(|(_, value)| value.into_owned())
        .filter(|target| target.starts_with("http") && !is_google_host(target))
}

fn is_google_host(href: &str) -> bool {
    Url::parse(href)
        .ok()
        .and_then(|u| u.host_str().map(|host| host.contains("google")))
        .unwrap_or(true)
}
