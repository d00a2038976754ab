//! Trading Strategies Module
//!
//! Strategy framework with:
//! - The trait every strategy slot implements
//! - An explicit registry mapping config names to constructors
//! - Built-in time-driven reference strategies

pub mod exits;
pub mod half_hour_short;
pub mod hourly_long;
pub mod quarter_hour_alternating;

use anyhow::Result;
use std::collections::BTreeMap;

use crate::config::StrategyConfig;
use crate::error::ConfigError;
use crate::{Qty, Tick};

// =============================================================================
// Strategy Trait - The contract all strategies must implement
// =============================================================================

/// Trading strategy trait.
///
/// The orchestrator drives every slot with the same fixed call order per
/// tick: `update_indicators`, then at most one entry or exit check chain,
/// then `update_position` when the slot's position opens or closes.
/// Entry checks take `&mut self` so a strategy may consume an entry
/// opportunity when it reports it.
pub trait Strategy: Send {
    /// Strategy identifier (matches the registry name)
    fn name(&self) -> &'static str;

    /// Refresh internal indicators with the latest tick
    fn update_indicators(&mut self, tick: &Tick);

    fn check_long_entry(&mut self) -> bool;

    fn check_short_entry(&mut self) -> bool;

    fn check_long_exit(&mut self) -> bool;

    fn check_short_exit(&mut self) -> bool;

    /// Notification that the slot opened (`position != 0`, with the fill
    /// reference price) or went flat (`position == 0`, `entry_price == 0.0`)
    fn update_position(&mut self, position: Qty, entry_price: f64);

    /// Drop all intraday state (called at end-of-day square-off)
    fn reset(&mut self);
}

// =============================================================================
// Strategy Factory - Type alias for strategy constructor functions
// =============================================================================

/// Factory function type for creating strategies from their slot config
pub type StrategyFactory = fn(&StrategyConfig) -> Result<Box<dyn Strategy>>;

// =============================================================================
// Strategy Registry
// =============================================================================

/// Name -> constructor lookup used to build the slot list at startup
#[derive(Clone, Default)]
pub struct StrategyRegistry {
    factories: BTreeMap<&'static str, StrategyFactory>,
}

impl std::fmt::Debug for StrategyRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StrategyRegistry")
            .field("strategies", &self.available())
            .finish()
    }
}

impl StrategyRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry pre-populated with the built-in strategies
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(hourly_long::NAME, hourly_long::create);
        registry.register(half_hour_short::NAME, half_hour_short::create);
        registry.register(
            quarter_hour_alternating::NAME,
            quarter_hour_alternating::create,
        );
        registry
    }

    /// Register a new strategy (for plugins or testing)
    pub fn register(&mut self, name: &'static str, factory: StrategyFactory) {
        self.factories.insert(name, factory);
    }

    /// Names of registered strategies, sorted
    pub fn available(&self) -> Vec<&'static str> {
        self.factories.keys().copied().collect()
    }

    /// Create one strategy from its slot config
    pub fn create(&self, config: &StrategyConfig) -> Result<Box<dyn Strategy>> {
        let factory = self.factories.get(config.name.as_str()).ok_or_else(|| {
            ConfigError::UnknownStrategy {
                name: config.name.clone(),
                available: self.available().join(", "),
            }
        })?;
        factory(config)
    }

    /// Create every slot, preserving config order
    pub fn create_all(&self, configs: &[StrategyConfig]) -> Result<Vec<Box<dyn Strategy>>> {
        configs.iter().map(|c| self.create(c)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtins_registered() {
        let registry = StrategyRegistry::with_builtins();
        assert_eq!(
            registry.available(),
            vec!["half_hour_short", "hourly_long", "quarter_hour_alternating"]
        );
    }

    #[test]
    fn test_create_all_preserves_order() {
        let registry = StrategyRegistry::with_builtins();
        let configs = vec![
            StrategyConfig::new("quarter_hour_alternating", 1.0, 1.0),
            StrategyConfig::new("hourly_long", 1.0, 1.0),
        ];
        let slots = registry.create_all(&configs).unwrap();
        let names: Vec<_> = slots.iter().map(|s| s.name()).collect();
        assert_eq!(names, vec!["quarter_hour_alternating", "hourly_long"]);
    }

    #[test]
    fn test_unknown_strategy_lists_available() {
        let registry = StrategyRegistry::with_builtins();
        let err = registry
            .create(&StrategyConfig::new("martingale", 1.0, 1.0))
            .err()
            .unwrap();
        let message = err.to_string();
        assert!(message.contains("martingale"));
        assert!(message.contains("hourly_long"));
    }
}
