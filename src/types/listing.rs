//! Listing types shared by the extractors and the aggregator

use serde::{Deserialize, Serialize};
use std::fmt;

/// Currencies a raw marketplace price can be quoted in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    Usd,
    Cny,
    /// Local currency, no conversion needed
    Krw,
}

impl Currency {
    /// ISO 4217 code
    pub fn code(&self) -> &'static str {
        match self {
            Currency::Usd => "USD",
            Currency::Cny => "CNY",
            Currency::Krw => "KRW",
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.code())
    }
}

/// Marketplace a listing was scraped from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Source {
    AliExpress,
    Taobao,
}

impl Source {
    pub fn name(&self) -> &'static str {
        match self {
            Source::AliExpress => "AliExpress",
            Source::Taobao => "Taobao",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

/// Normalized price in KRW.
///
/// `Priced` always holds a finite, non-negative value; anything else is
/// `Unparseable`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PriceValue {
    Priced(f64),
    Unparseable,
}

impl PriceValue {
    /// Wrap a computed amount, demoting NaN, infinities and negatives
    pub fn from_amount(amount: f64) -> Self {
        if amount.is_finite() && amount >= 0.0 {
            PriceValue::Priced(amount)
        } else {
            PriceValue::Unparseable
        }
    }

    pub fn value(&self) -> Option<f64> {
        match self {
            PriceValue::Priced(v) => Some(*v),
            PriceValue::Unparseable => None,
        }
    }
}

/// One scraped product record
#[derive(Debug, Clone, PartialEq)]
pub struct ProductListing {
    pub title: String,
    /// Display string already formatted in KRW
    pub price_display: String,
    pub price_value: PriceValue,
    pub image_url: String,
    pub link: String,
    pub source: Source,
}

/// A listing as exposed by the search API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatedListing {
    pub title: String,
    pub price: String,
    /// `None` serializes as `null` for unparseable prices
    pub price_value: Option<f64>,
    pub image: String,
    pub link: String,
    pub source: Source,
}

impl From<ProductListing> for AggregatedListing {
    fn from(listing: ProductListing) -> Self {
        Self {
            title: listing.title,
            price: listing.price_display,
            price_value: listing.price_value.value(),
            image: listing.image_url,
            link: listing.link,
            source: listing.source,
        }
    }
}

/// A container on a listing page that could not be turned into a listing
#[derive(Debug, Clone, PartialEq)]
pub struct ItemFailure {
    /// Position of the container on the page
    pub index: usize,
    pub reason: String,
}

/// Outcome of extracting one marketplace page
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractReport {
    pub listings: Vec<ProductListing>,
    pub failures: Vec<ItemFailure>,
    /// The page itself could not be fetched
    pub fetch_failed: bool,
}

impl ExtractReport {
    /// Report for a page that never arrived
    pub fn fetch_failed() -> Self {
        Self {
            fetch_failed: true,
            ..Self::default()
        }
    }
}
