//! Router-level tests against in-memory marketplaces

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tower::ServiceExt;

use pricecmp::server::{build_router, AppState};
use pricecmp::services::{Aggregator, ExchangeRateSnapshot};
use pricecmp::sources::{AliExpressSource, PageFetcher, TaobaoSource, WebSearch};
use pricecmp::types::{AggregatedListing, PriceCmpError, Result, Source};

const CATEGORY_URL: &str = "https://www.taobao.com/list/product/cup.htm";

/// Serves fixture pages by exact URL and counts requests
#[derive(Default)]
struct FixtureFetcher {
    pages: HashMap<String, String>,
    calls: AtomicUsize,
}

#[async_trait]
impl PageFetcher for FixtureFetcher {
    async fn fetch_page(&self, url: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.pages
            .get(url)
            .cloned()
            .ok_or_else(|| PriceCmpError::Status {
                status: 503,
                url: url.to_string(),
            })
    }
}

struct FixtureSearch {
    results: Vec<String>,
}

#[async_trait]
impl WebSearch for FixtureSearch {
    async fn search(&self, _query: &str, max_results: usize) -> Result<Vec<String>> {
        Ok(self.results.iter().take(max_results).cloned().collect())
    }
}

fn fixture(name: &str) -> String {
    std::fs::read_to_string(format!("tests/fixtures/{}", name)).unwrap()
}

fn app(fetcher: Arc<FixtureFetcher>, search_results: Vec<&str>) -> axum::Router {
    let search = Arc::new(FixtureSearch {
        results: search_results.into_iter().map(String::from).collect(),
    });
    let aggregator = Aggregator::new(
        Arc::new(ExchangeRateSnapshot::fallback()),
        AliExpressSource::new(fetcher.clone(), 10),
        TaobaoSource::new(fetcher, search, 10, 5),
    );
    build_router(AppState {
        aggregator: Arc::new(aggregator),
    })
}

fn marketplaces() -> Arc<FixtureFetcher> {
    let mut pages = HashMap::new();
    pages.insert(
        "https://ko.aliexpress.com/w/wholesale-cup.html".to_string(),
        fixture("aliexpress_search.html"),
    );
    pages.insert(CATEGORY_URL.to_string(), fixture("taobao_category.html"));
    Arc::new(FixtureFetcher {
        pages,
        ..FixtureFetcher::default()
    })
}

async fn get(app: axum::Router, uri: &str) -> (StatusCode, String) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, String::from_utf8(body.to_vec()).unwrap())
}

#[tokio::test]
async fn test_missing_query_returns_empty_list() {
    let fetcher = marketplaces();
    let (status, body) = get(app(fetcher.clone(), vec![CATEGORY_URL]), "/api/search").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "[]");
    assert_eq!(fetcher.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_empty_query_returns_empty_list() {
    let fetcher = marketplaces();
    let (status, body) = get(app(fetcher.clone(), vec![CATEGORY_URL]), "/api/search?query=").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "[]");
    assert_eq!(fetcher.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_search_returns_sorted_priced_listings() {
    let (status, body) = get(
        app(
            marketplaces(),
            vec!["https://item.taobao.com/item.htm?id=1", CATEGORY_URL],
        ),
        "/api/search?query=cup",
    )
    .await;

    assert_eq!(status, StatusCode::OK);

    let raw: Vec<serde_json::Value> = serde_json::from_str(&body).unwrap();
    for item in &raw {
        for field in ["title", "price", "price_value", "image", "link", "source"] {
            assert!(item.get(field).is_some(), "missing {} in {}", field, item);
        }
    }

    let listings: Vec<AggregatedListing> = serde_json::from_str(&body).unwrap();
    assert_eq!(listings.len(), 6);
    let values: Vec<f64> = listings.iter().map(|l| l.price_value.unwrap()).collect();
    assert!(values.windows(2).all(|w| w[0] <= w[1]));
    assert!(listings.iter().any(|l| l.source == Source::AliExpress));
    assert!(listings.iter().any(|l| l.source == Source::Taobao));
}

#[tokio::test]
async fn test_repeated_query_uses_first_value() {
    let (status, body) = get(
        app(marketplaces(), vec![CATEGORY_URL]),
        "/api/search?query=cup&query=mug",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let listings: Vec<AggregatedListing> = serde_json::from_str(&body).unwrap();
    // only the `cup` page is served, so listings prove the first value was used
    assert_eq!(listings.len(), 6);
    assert!(listings.iter().any(|l| l.source == Source::AliExpress));
}

#[tokio::test]
async fn test_all_upstreams_down_still_200() {
    let fetcher = Arc::new(FixtureFetcher::default());
    let (status, body) = get(app(fetcher, Vec::new()), "/api/search?query=cup").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "[]");
}

#[tokio::test]
async fn test_html_views() {
    let (status, body) = get(app(marketplaces(), Vec::new()), "/").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("action=\"/result\""));

    let (status, body) = get(app(marketplaces(), Vec::new()), "/result?query=cup").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("/api/search?query="));
}

#[tokio::test]
async fn test_result_view_only_links_http_urls() {
    let (_, body) = get(app(marketplaces(), Vec::new()), "/result?query=cup").await;

    assert!(body.contains(r#"/^https?:/i.test(link || "")"#));
    assert!(body.contains("title.href = link;"));
    assert!(!body.contains("title.href = item.link"));
}

#[tokio::test]
async fn test_health() {
    let (status, body) = get(app(marketplaces(), Vec::new()), "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "ok");
}
