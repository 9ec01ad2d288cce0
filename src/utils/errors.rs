use thiserror::Error;

use crate::api::coingecko::ApiError;

/// Top-level failure of a dashboard run
///
/// An empty price history is not an error; callers check
/// `PriceSeries::is_empty` instead.
#[derive(Debug, Error)]
pub enum DashboardError {
    /// Transport failure or non-success status from the market data API
    #[error("market data request failed: {0}")]
    Network(ApiError),
    /// Response arrived but its contents were unusable
    #[error("unexpected market data: {0}")]
    Data(String),
    /// Plotting into the frame buffer failed
    #[error("failed to render dashboard: {0}")]
    Render(String),
    /// No usable window could be opened or updated
    #[error("failed to display dashboard: {0}")]
    Display(String),
}

impl From<ApiError> for DashboardError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::DeserializationError(msg) => DashboardError::Data(msg),
            other => DashboardError::Network(other),
        }
    }
}
