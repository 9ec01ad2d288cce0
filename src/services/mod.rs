pub mod dashboard_service;
pub mod histogram;
pub mod market_data_service;
