use std::time::Duration;

use reqwest::Client as HttpClient;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use super::models::{ApiError, ErrorResponse, MarketChartQuery, MarketChartResponse};
use tracing::{debug, warn};

/// CoinGecko public API client for historical market data
pub struct CoinGeckoClient {
    http_client: HttpClient,
    base_url: String,
}

impl CoinGeckoClient {
    const DEFAULT_BASE_URL: &'static str = "https://api.coingecko.com/api/v3";
    pub const REQUEST_TIMEOUT_SECS: u64 = 10;

    /// Create a new client against the public endpoint
    pub fn new() -> Result<Self, ApiError> {
        Self::with_base_url(Self::DEFAULT_BASE_URL.to_string())
    }

    /// Create a new client with custom base URL (for testing)
    pub fn with_base_url(base_url: String) -> Result<Self, ApiError> {
        let http_client = HttpClient::builder()
            .timeout(Duration::from_secs(Self::REQUEST_TIMEOUT_SECS))
            .default_headers(Self::create_headers())
            .build()
            .map_err(|e| ApiError::RequestError(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn create_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers
    }

    /// Map a transport failure, keeping timeouts distinguishable
    fn map_send_error(e: reqwest::Error) -> ApiError {
        if e.is_timeout() {
            ApiError::Timeout(Self::REQUEST_TIMEOUT_SECS)
        } else {
            ApiError::RequestError(format!("Request failed: {}", e))
        }
    }

    /// Parse error response based on HTTP status code
    async fn handle_error_response(
        status: reqwest::StatusCode,
        response: reqwest::Response,
    ) -> ApiError {
        let status_code = status.as_u16();
        let body_text = response.text().await.unwrap_or_default();

        // CoinGecko wraps most errors as {"error": "..."}
        let message = serde_json::from_str::<ErrorResponse>(&body_text)
            .ok()
            .and_then(|e| e.error)
            .unwrap_or(body_text);

        match status_code {
            404 => ApiError::NotFound(message),
            429 => {
                warn!("Rate limited by CoinGecko: {}", message);
                ApiError::RateLimited(message)
            }
            500..=599 => {
                warn!("Server error {}: {}", status_code, message);
                ApiError::ServerError(status_code, message)
            }
            _ => ApiError::HttpError(status_code, message),
        }
    }

    /// GET /coins/{coin_id}/market_chart
    ///
    /// Retrieves daily USD prices for the last `days` days. `days` is passed
    /// through as-is; the service decides what to do with large values.
    ///
    /// # Returns
    /// * `Ok(MarketChartResponse)` - Raw `[unix_millis, price]` pairs
    /// * `Err(ApiError)` - Transport, status or body shape failure
    pub async fn get_market_chart(
        &self,
        coin_id: &str,
        days: u32,
    ) -> Result<MarketChartResponse, ApiError> {
        let url = format!("{}/coins/{}/market_chart", self.base_url, coin_id);
        let query = MarketChartQuery {
            vs_currency: "usd",
            days,
            interval: "daily",
        };

        debug!("GET {} days={}", url, days);

        let response = self.http_client
            .get(&url)
            .query(&query)
            .send()
            .await
            .map_err(Self::map_send_error)?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(Self::handle_error_response(status, response).await);
        }

        let body = response
            .text()
            .await
            .map_err(Self::map_send_error)?;

        serde_json::from_str::<MarketChartResponse>(&body)
            .map_err(|e| ApiError::DeserializationError(format!("Failed to parse response: {}", e)))
    }
}
