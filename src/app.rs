//! Composition root: wires config, HTTP client, rate snapshot and sources

use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::info;

use crate::config::Config;
use crate::server::{build_router, AppState};
use crate::services::{Aggregator, ExchangeRateSnapshot, FrankfurterClient, RateProvider};
use crate::sources::{
    build_client, AliExpressSource, GoogleSearch, HttpFetcher, PageFetcher, TaobaoSource,
};

/// Fully wired application, built once per process
pub struct App {
    config: Config,
    aggregator: Arc<Aggregator>,
}

impl App {
    /// Build the shared client, fetch the rate snapshot once, and assemble the sources
    pub async fn init(config: Config) -> Result<Self> {
        let client = build_client(config.http_timeout).context("Failed to create HTTP client")?;
        let rates = Arc::new(load_rates(&config, client.clone()).await);

        let fetcher: Arc<dyn PageFetcher> = Arc::new(HttpFetcher::new(client));
        let search = Arc::new(GoogleSearch::new(fetcher.clone()));
        let aggregator = Aggregator::new(
            rates,
            AliExpressSource::new(fetcher.clone(), config.max_items),
            TaobaoSource::new(fetcher, search, config.max_items, config.taobao_max_candidates),
        );

        Ok(Self {
            config,
            aggregator: Arc::new(aggregator),
        })
    }

    pub fn aggregator(&self) -> &Aggregator {
        &self.aggregator
    }

    /// Serve the HTTP API until Ctrl-C
    pub async fn serve(self) -> Result<()> {
        let addr = self.config.bind_addr();
        let app = build_router(AppState {
            aggregator: self.aggregator,
        });

        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .with_context(|| format!("Failed to bind to {}", addr))?;
        info!("Listening on http://{}", addr);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .context("Server error")?;

        info!("Server stopped");
        Ok(())
    }
}

/// Fetch the process-wide snapshot; never fails, falls back to fixed rates
pub async fn load_rates(config: &Config, client: reqwest::Client) -> ExchangeRateSnapshot {
    let source = FrankfurterClient::new(client, config.rate_api_url.clone());
    RateProvider::get_rates(&source).await
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    info!("Shutdown signal received");
}
