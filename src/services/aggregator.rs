//! Aggregator service merging both marketplaces into one ranked list
//!
//! `search` has no error path: every upstream failure degrades to fewer
//! (or zero) listings, and the per-source reports say what went missing.

use crate::services::rates::ExchangeRateSnapshot;
use crate::sources::{AliExpressSource, TaobaoSource};
use crate::types::{AggregatedListing, ExtractReport, ProductListing};
use serde::Serialize;
use std::sync::Arc;
use tracing::info;

/// What one marketplace contributed to a search
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SourceReport {
    pub listings: usize,
    pub item_failures: usize,
    pub fetch_failed: bool,
    /// Taobao only: the discovered category page
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_url: Option<String>,
}

impl SourceReport {
    fn from_extract(report: &ExtractReport) -> Self {
        Self {
            listings: report.listings.len(),
            item_failures: report.failures.len(),
            fetch_failed: report.fetch_failed,
            category_url: None,
        }
    }
}

/// Ranked listings plus per-source diagnostics
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SearchResults {
    pub listings: Vec<AggregatedListing>,
    pub aliexpress: SourceReport,
    pub taobao: SourceReport,
}

/// Merges and ranks listings from both marketplaces
pub struct Aggregator {
    rates: Arc<ExchangeRateSnapshot>,
    aliexpress: AliExpressSource,
    taobao: TaobaoSource,
}

impl Aggregator {
    pub fn new(
        rates: Arc<ExchangeRateSnapshot>,
        aliexpress: AliExpressSource,
        taobao: TaobaoSource,
    ) -> Self {
        Self {
            rates,
            aliexpress,
            taobao,
        }
    }

    pub fn rates(&self) -> &ExchangeRateSnapshot {
        &self.rates
    }

    /// Search both marketplaces and rank the priced listings ascending.
    ///
    /// An empty query returns immediately without any outbound request.
    pub async fn search(&self, query: &str) -> SearchResults {
        if query.is_empty() {
            return SearchResults::default();
        }

        let (ali, (category_url, taobao)) =
            tokio::join!(self.aliexpress.fetch(query, &self.rates), self.search_taobao(query));

        let mut taobao_report = SourceReport::from_extract(&taobao);
        taobao_report.category_url = category_url;
        let aliexpress_report = SourceReport::from_extract(&ali);

        let listings = rank(ali.listings.into_iter().chain(taobao.listings));

        info!(
            query,
            results = listings.len(),
            aliexpress = aliexpress_report.listings,
            taobao = taobao_report.listings,
            "Search complete"
        );

        SearchResults {
            listings,
            aliexpress: aliexpress_report,
            taobao: taobao_report,
        }
    }

    /// Resolve then fetch; no category page means no Taobao listings
    async fn search_taobao(&self, query: &str) -> (Option<String>, ExtractReport) {
        match self.taobao.resolve_category_url(query).await {
            Some(url) => {
                let report = self.taobao.fetch(&url, &self.rates).await;
                (Some(url), report)
            }
            None => (None, ExtractReport::default()),
        }
    }
}

/// Drop unparseable listings, then stable-sort the rest by price ascending
pub fn rank(listings: impl IntoIterator<Item = ProductListing>) -> Vec<AggregatedListing> {
    let mut priced: Vec<(f64, ProductListing)> = listings
        .into_iter()
        .filter_map(|listing| listing.price_value.value().map(|v| (v, listing)))
        .collect();
    priced.sort_by(|(a, _), (b, _)| a.total_cmp(b));
    priced
        .into_iter()
        .map(|(_, listing)| AggregatedListing::from(listing))
        .collect()
}
