use clap::{Parser, Subcommand};

use pricecmp::app::{load_rates, App};
use pricecmp::config::Config;
use pricecmp::services::SearchResults;
use pricecmp::sources::build_client;

/// AliExpress and Taobao price comparison in KRW
#[derive(Parser)]
#[command(name = "pricecmp")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the web server (default)
    Serve {
        /// Listen port, overrides PORT
        #[arg(long)]
        port: Option<u16>,
    },

    /// Run one search and print the ranked listings
    Search {
        /// Search keyword
        query: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the exchange rates a server would start with
    Rates {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let mut config = Config::from_env()?;

        match self.command {
            None => App::init(config).await?.serve().await,
            Some(Commands::Serve { port }) => {
                if let Some(port) = port {
                    config.port = port;
                }
                App::init(config).await?.serve().await
            }
            Some(Commands::Search { query, json }) => {
                let app = App::init(config).await?;
                let results = app.aggregator().search(&query).await;
                if json {
                    println!("{}", serde_json::to_string_pretty(&results)?);
                } else {
                    print_results(&query, &results);
                }
                Ok(())
            }
            Some(Commands::Rates { json }) => {
                let client = build_client(config.http_timeout)?;
                let rates = load_rates(&config, client).await;
                if json {
                    println!("{}", serde_json::to_string_pretty(&rates)?);
                } else {
                    println!(
                        "USD→KRW {:.2}  CNY→KRW {:.2}  ({:?}, {})",
                        rates.usd(),
                        rates.cny(),
                        rates.origin(),
                        rates.fetched_at().format("%Y-%m-%d %H:%M:%S UTC")
                    );
                }
                Ok(())
            }
        }
    }
}

fn print_results(query: &str, results: &SearchResults) {
    if results.listings.is_empty() {
        println!("No priced listings for {:?}", query);
    }
    for listing in &results.listings {
        println!(
            "{:>14}  {:<10}  {}",
            listing.price, listing.source, listing.title
        );
        println!("{:>14}  {}", "", listing.link);
    }

    for (name, report) in [("AliExpress", &results.aliexpress), ("Taobao", &results.taobao)] {
        if report.fetch_failed || report.item_failures > 0 {
            eprintln!(
                "{}: {} listings, {} skipped, fetch failed: {}",
                name, report.listings, report.item_failures, report.fetch_failed
            );
        }
    }
}
