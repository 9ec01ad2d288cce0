//! Data models shared by the fetcher and the renderer

pub mod chart;

pub use chart::{PricePoint, PriceSeries};
