use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::services::rates::DEFAULT_RATE_API_URL;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// Timeout applied to every outbound request
    pub http_timeout: Duration,
    /// Per-marketplace listing cap
    pub max_items: usize,
    /// Search results considered when discovering the Taobao category page
    pub taobao_max_candidates: usize,
    pub rate_api_url: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            http_timeout: Duration::from_secs(10),
            max_items: 10,
            taobao_max_candidates: 5,
            rate_api_url: DEFAULT_RATE_API_URL.to_string(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup; missing keys take their defaults
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();
        Ok(Self {
            host: lookup("HOST").unwrap_or(defaults.host),
            port: parse_or(&lookup, "PORT", defaults.port)?,
            http_timeout: Duration::from_secs(parse_or(
                &lookup,
                "HTTP_TIMEOUT_SECS",
                defaults.http_timeout.as_secs(),
            )?),
            max_items: parse_or(&lookup, "MAX_ITEMS", defaults.max_items)?,
            taobao_max_candidates: parse_or(
                &lookup,
                "TAOBAO_MAX_CANDIDATES",
                defaults.taobao_max_candidates,
            )?,
            rate_api_url: lookup("RATE_API_URL").unwrap_or(defaults.rate_api_url),
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{} must be a valid number, got {:?}", key, raw)),
        None => Ok(default),
    }
}
