//! Exchange rate provider
//!
//! Fetches USD→KRW and CNY→KRW once and freezes them into an immutable
//! [`ExchangeRateSnapshot`]. If either lookup fails, both rates fall back
//! to fixed constants together; a partially live snapshot never exists.
//! There is no refresh, so a long-running process keeps its startup rates.

use crate::types::{Currency, PriceCmpError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{info, warn};

/// Frankfurter API base URL
pub const DEFAULT_RATE_API_URL: &str = "https://api.frankfurter.app";

/// KRW per USD when the live lookup fails
pub const FALLBACK_USD_KRW: f64 = 1350.0;

/// KRW per CNY when the live lookup fails
pub const FALLBACK_CNY_KRW: f64 = 190.0;

/// Where the snapshot's numbers came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RateOrigin {
    Live,
    Fallback,
}

/// Immutable KRW conversion rates, built once per process
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExchangeRateSnapshot {
    usd: f64,
    cny: f64,
    origin: RateOrigin,
    fetched_at: DateTime<Utc>,
}

impl ExchangeRateSnapshot {
    /// Snapshot from live numbers; rejects non-positive or non-finite rates
    pub fn live(usd: f64, cny: f64) -> Result<Self> {
        for (currency, rate) in [(Currency::Usd, usd), (Currency::Cny, cny)] {
            if !rate.is_finite() || rate <= 0.0 {
                return Err(PriceCmpError::Rate(format!(
                    "invalid {}→KRW rate: {}",
                    currency, rate
                )));
            }
        }
        Ok(Self {
            usd,
            cny,
            origin: RateOrigin::Live,
            fetched_at: Utc::now(),
        })
    }

    /// The fixed `{USD: 1350.0, CNY: 190.0}` pair
    pub fn fallback() -> Self {
        Self {
            usd: FALLBACK_USD_KRW,
            cny: FALLBACK_CNY_KRW,
            origin: RateOrigin::Fallback,
            fetched_at: Utc::now(),
        }
    }

    pub fn usd(&self) -> f64 {
        self.usd
    }

    pub fn cny(&self) -> f64 {
        self.cny
    }

    pub fn origin(&self) -> RateOrigin {
        self.origin
    }

    pub fn fetched_at(&self) -> DateTime<Utc> {
        self.fetched_at
    }

    /// Multiplier into KRW, `None` when the currency is already local
    pub fn rate_for(&self, currency: Currency) -> Option<f64> {
        match currency {
            Currency::Usd => Some(self.usd),
            Currency::Cny => Some(self.cny),
            Currency::Krw => None,
        }
    }
}

/// A single currency conversion lookup
#[async_trait]
pub trait RateSource: Send + Sync {
    /// Units of `to` per one unit of `from`
    async fn fetch_rate(&self, from: Currency, to: Currency) -> Result<f64>;
}

/// Frankfurter `/latest` response (minimal fields)
#[derive(Debug, Deserialize)]
struct LatestRates {
    rates: HashMap<String, f64>,
}

/// [`RateSource`] backed by the Frankfurter API
pub struct FrankfurterClient {
    client: reqwest::Client,
    base_url: String,
}

impl FrankfurterClient {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl RateSource for FrankfurterClient {
    async fn fetch_rate(&self, from: Currency, to: Currency) -> Result<f64> {
        let url = format!("{}/latest", self.base_url.trim_end_matches('/'));
        let response = self
            .client
            .get(&url)
            .query(&[("from", from.code()), ("to", to.code())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(PriceCmpError::Status {
                status: status.as_u16(),
                url,
            });
        }

        let latest: LatestRates = response.json().await?;
        latest
            .rates
            .get(to.code())
            .copied()
            .ok_or_else(|| PriceCmpError::Rate(format!("response has no {} rate", to)))
    }
}

/// Builds the process-wide snapshot
pub struct RateProvider;

impl RateProvider {
    /// Fetch both rates, falling back to the fixed pair on any failure
    pub async fn get_rates(source: &dyn RateSource) -> ExchangeRateSnapshot {
        match Self::fetch_live(source).await {
            Ok(snapshot) => {
                info!(
                    usd = snapshot.usd(),
                    cny = snapshot.cny(),
                    "Loaded live exchange rates"
                );
                snapshot
            }
            Err(e) => {
                warn!(error = %e, "Exchange rate lookup failed, using fallback rates");
                ExchangeRateSnapshot::fallback()
            }
        }
    }

    async fn fetch_live(source: &dyn RateSource) -> Result<ExchangeRateSnapshot> {
        let usd = source.fetch_rate(Currency::Usd, Currency::Krw).await?;
        let cny = source.fetch_rate(Currency::Cny, Currency::Krw).await?;
        ExchangeRateSnapshot::live(usd, cny)
    }
}
