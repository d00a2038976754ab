//! Quarter-Hour Alternating Strategy
//!
//! On every 15-minute mark enters long, then short, then long again, and so
//! on. Exits via TP/SL only.

mod strategy;

pub use strategy::QuarterHourAlternatingStrategy;

use crate::config::StrategyConfig;
use crate::strategies::Strategy;
use anyhow::Result;

/// Registry name
pub const NAME: &str = "quarter_hour_alternating";

/// Create strategy from config (called by registry)
pub fn create(config: &StrategyConfig) -> Result<Box<dyn Strategy>> {
    Ok(Box::new(QuarterHourAlternatingStrategy::new(
        config.tp, config.sl,
    )))
}
