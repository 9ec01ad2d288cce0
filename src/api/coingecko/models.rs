use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Response from GET /coins/{id}/market_chart
///
/// Only `prices` is consumed; `market_caps` and `total_volumes` are ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketChartResponse {
    /// `[unix_millis, price]` pairs
    pub prices: Vec<(f64, f64)>,
}

/// Error body returned by CoinGecko on failures
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: Option<String>,
}

/// Query parameters for the market chart endpoint
#[derive(Debug, Clone, Serialize)]
pub struct MarketChartQuery<'a> {
    pub vs_currency: &'a str,
    pub days: u32,
    pub interval: &'a str,
}

/// Error type for CoinGecko API operations
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    /// 404 Not Found (usually an unknown coin id)
    #[error("Not Found: {0}")]
    NotFound(String),
    /// 429 Too Many Requests; surfaced, never retried
    #[error("Rate Limited: {0}")]
    RateLimited(String),
    /// 5xx Server Error
    #[error("Server Error ({0}): {1}")]
    ServerError(u16, String),
    /// Any other non-success status
    #[error("HTTP Error ({0}): {1}")]
    HttpError(u16, String),
    /// Request exceeded the client timeout
    #[error("Request timed out after {0} seconds")]
    Timeout(u64),
    /// Connection or transport failure
    #[error("Request Error: {0}")]
    RequestError(String),
    /// Body was not the expected JSON shape
    #[error("Deserialization Error: {0}")]
    DeserializationError(String),
}
