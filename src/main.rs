use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod api;
mod models;
mod services;
mod utils;

use api::coingecko::CoinGeckoClient;
use models::PriceSeries;
use services::{dashboard_service, market_data_service};
use utils::errors::DashboardError;

const NO_DATA_MESSAGE: &str = "No data returned. Check coin ID or date range.";

/// CoinGecko price dashboard (display only)
#[derive(Parser, Debug)]
#[command(name = "crypto-dashboard", version)]
#[command(about = "CoinGecko Price Dashboard (display only)", long_about = None)]
struct Cli {
    /// Coin ID on CoinGecko
    #[arg(long, default_value = "bitcoin")]
    coin: String,

    /// Look-back period in days (max 90)
    #[arg(long, default_value_t = 30)]
    days: u32,
}

/// How a run ended when nothing failed
#[derive(Debug, PartialEq, Eq)]
enum Outcome {
    NoData,
    Displayed,
}

/// Fetch, then hand a non-empty series to `render`
async fn run<R>(cli: &Cli, client: &CoinGeckoClient, render: R) -> Result<Outcome, DashboardError>
where
    R: FnOnce(&PriceSeries, &str) -> Result<(), DashboardError>,
{
    let series = market_data_service::fetch_market_data(client, &cli.coin, cli.days).await?;

    if series.is_empty() {
        println!("{}", NO_DATA_MESSAGE);
        return Ok(Outcome::NoData);
    }

    render(&series, &cli.coin)?;
    Ok(Outcome::Displayed)
}

fn init_tracing() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env()
            .add_directive("crypto_dashboard=info".parse()?)
            .add_directive("reqwest=warn".parse()?))
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing()?;

    info!("Starting crypto-dashboard for {} ({} days)", cli.coin, cli.days);

    let client = CoinGeckoClient::new()?;
    let outcome = run(&cli, &client, dashboard_service::render_dashboard).await?;

    info!("Done: {:?}", outcome);
    Ok(())
}
