//! HTTP page fetching shared by the extractors and web search

use crate::types::{PriceCmpError, Result};
use async_trait::async_trait;
use std::time::Duration;

/// Browser-like identifying header sent to every marketplace
pub const USER_AGENT: &str = "Mozilla/5.0";

/// Build the shared HTTP client with a per-request timeout
pub fn build_client(timeout: Duration) -> Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .build()?;
    Ok(client)
}

/// Fetches a page body as text
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// GET `url`; non-success statuses are errors
    async fn fetch_page(&self, url: &str) -> Result<String>;
}

/// [`PageFetcher`] over a shared `reqwest::Client`
#[derive(Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch_page(&self, url: &str) -> Result<String> {
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(PriceCmpError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        Ok(response.text().await?)
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Serves canned pages keyed by URL prefix; unknown URLs answer 404
    #[derive(Default)]
    pub struct StaticFetcher {
        pages: Vec<(String, String)>,
        calls: AtomicUsize,
    }

    impl StaticFetcher {
        pub fn with_page(mut self, url_prefix: &str, body: &str) -> Self {
            self.pages.push((url_prefix.to_string(), body.to_string()));
            self
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl PageFetcher for StaticFetcher {
        async fn fetch_page(&self, url: &str) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.pages
                .iter()
                .find(|(prefix, _)| url.starts_with(prefix.as_str()))
                .map(|(_, body)| body.clone())
                .ok_or_else(|| PriceCmpError::Status {
                    status: 404,
                    url: url.to_string(),
                })
        }
    }
}
