//! Services for rate lookup, price normalization and result aggregation

pub mod aggregator;
pub mod normalizer;
pub mod rates;

pub use aggregator::{Aggregator, SearchResults, SourceReport};
pub use normalizer::{extract_price, format_krw};
pub use rates::{ExchangeRateSnapshot, FrankfurterClient, RateProvider, RateSource};
