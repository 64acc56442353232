//! HTTP surface: JSON search API and the two HTML views

use axum::{
    extract::{Query, State},
    response::Html,
    routing::get,
    Json, Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::services::Aggregator;
use crate::types::AggregatedListing;

const INDEX_HTML: &str = include_str!("../../templates/index.html");
const RESULT_HTML: &str = include_str!("../../templates/result.html");

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub aggregator: Arc<Aggregator>,
}

/// Build the Axum application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/result", get(result_handler))
        .route("/api/search", get(search_handler))
        .route("/health", get(health_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Ranked listings for `?query=`; always 200, `[]` when the query is missing
async fn search_handler(
    State(state): State<AppState>,
    Query(params): Query<Vec<(String, String)>>,
) -> Json<Vec<AggregatedListing>> {
    let query = first_param(&params, "query").unwrap_or_default();
    let results = state.aggregator.search(query).await;
    Json(results.listings)
}

/// First value of a repeated query parameter
fn first_param<'a>(params: &'a [(String, String)], key: &str) -> Option<&'a str> {
    params
        .iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.as_str())
}

async fn index_handler() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// Results shell; the page reads `query` from its own URL and calls the API
async fn result_handler() -> Html<&'static str> {
    Html(RESULT_HTML)
}

async fn health_handler() -> &'static str {
    "ok"
}
