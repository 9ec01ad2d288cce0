use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::api::coingecko::CoinGeckoClient;
use crate::models::{PricePoint, PriceSeries};
use crate::utils::errors::DashboardError;

/// Fetch daily USD prices for `coin_id` and derive daily returns
///
/// Returns an empty series when the service has fewer than two price
/// points for the window. `days` is not range checked.
pub async fn fetch_market_data(
    client: &CoinGeckoClient,
    coin_id: &str,
    days: u32,
) -> Result<PriceSeries, DashboardError> {
    info!("Fetching {} day(s) of {} prices", days, coin_id);

    let chart = client.get_market_chart(coin_id, days).await?;
    debug!("Received {} raw price points", chart.prices.len());

    let series = build_price_series(&chart.prices)?;
    debug!("Derived {} daily returns", series.len());

    Ok(series)
}

/// Turn raw `[unix_millis, price]` pairs into a return series
///
/// Samples are ordered by time and duplicate timestamps keep the first
/// sample. The first row and any row whose previous price is zero have no
/// defined return and are dropped.
pub fn build_price_series(raw: &[(f64, f64)]) -> Result<PriceSeries, DashboardError> {
    let mut samples: Vec<(DateTime<Utc>, f64)> = Vec::with_capacity(raw.len());

    for &(unix_ms, price) in raw {
        samples.push((millis_to_utc(unix_ms)?, price));
    }

    samples.sort_by_key(|(timestamp, _)| *timestamp);
    samples.dedup_by_key(|(timestamp, _)| *timestamp);

    let points = samples
        .windows(2)
        .filter_map(|pair| {
            let (_, previous) = pair[0];
            let (timestamp, price) = pair[1];
            pct_change(previous, price).map(|pct_return| PricePoint {
                timestamp,
                price,
                pct_return,
            })
        })
        .collect();

    Ok(PriceSeries::new(points))
}

/// Percent change from `previous` to `current`; undefined when `previous` is zero
pub fn pct_change(previous: f64, current: f64) -> Option<f64> {
    if previous == 0.0 {
        return None;
    }
    Some((current - previous) / previous * 100.0)
}

fn millis_to_utc(unix_ms: f64) -> Result<DateTime<Utc>, DashboardError> {
    if !unix_ms.is_finite() {
        return Err(DashboardError::Data(format!("invalid timestamp: {}", unix_ms)));
    }
    DateTime::<Utc>::from_timestamp_millis(unix_ms as i64)
        .ok_or_else(|| DashboardError::Data(format!("timestamp out of range: {}", unix_ms)))
}
