//! Half-Hour Short Strategy
//!
//! Goes short on half-hour marks that are not hour marks, while it holds
//! no entry. Exits via TP/SL only.

mod strategy;

pub use strategy::HalfHourShortStrategy;

use crate::config::StrategyConfig;
use crate::strategies::Strategy;
use anyhow::Result;

/// Registry name
pub const NAME: &str = "half_hour_short";

/// Create strategy from config (called by registry)
pub fn create(config: &StrategyConfig) -> Result<Box<dyn Strategy>> {
    Ok(Box::new(HalfHourShortStrategy::new(config.tp, config.sl)))
}
