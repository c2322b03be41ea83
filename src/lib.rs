pub mod binance;
pub mod config;
pub mod error;
pub mod indicator;
pub mod market_data;
pub mod model;
pub mod monitor;
pub mod notify;
pub mod strategy;
