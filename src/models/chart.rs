//! Chart generation models

use chrono::{DateTime, Utc};

/// A single data point on a price chart
#[derive(Debug, Clone, PartialEq)]
pub struct PricePoint {
    pub timestamp: DateTime<Utc>,
    pub price: f64,
    /// Percent change from the previous day's price
    pub pct_return: f64,
}

/// Daily price history for one coin, oldest first
///
/// Every row carries a defined return, so the first raw sample never
/// appears here.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PriceSeries {
    points: Vec<PricePoint>,
}

impl PriceSeries {
    pub fn new(points: Vec<PricePoint>) -> Self {
        Self { points }
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first(&self) -> Option<&PricePoint> {
        self.points.first()
    }

    pub fn last(&self) -> Option<&PricePoint> {
        self.points.last()
    }

    pub fn returns(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.pct_return).collect()
    }

    /// (min, max) of prices, or None for an empty series
    pub fn price_bounds(&self) -> Option<(f64, f64)> {
        if self.points.is_empty() {
            return None;
        }
        let min = self.points.iter().map(|p| p.price).fold(f64::INFINITY, f64::min);
        let max = self.points.iter().map(|p| p.price).fold(f64::NEG_INFINITY, f64::max);
        Some((min, max))
    }
}
