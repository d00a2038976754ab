//! Hourly Long Strategy
//!
//! Goes long on every hour mark after 01:00:00. Exits via TP/SL only.

mod strategy;

pub use strategy::HourlyLongStrategy;

use crate::config::StrategyConfig;
use crate::strategies::Strategy;
use anyhow::Result;

/// Registry name
pub const NAME: &str = "hourly_long";

/// Create strategy from config (called by registry)
pub fn create(config: &StrategyConfig) -> Result<Box<dyn Strategy>> {
    Ok(Box::new(HourlyLongStrategy::new(config.tp, config.sl)))
}
