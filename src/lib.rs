//! Strategy Fleet Netting Engine
//!
//! Tick-by-tick simulation of a fleet of independent trading strategies
//! sharing one inventory-capped position book. Per-strategy targets are
//! netted in a ledger, the resulting net demand is released to the market
//! in capped, cooldown-gated slices, and each strategy's permitted request
//! size adapts to its realized outcomes through AIMD feedback.

pub mod account;
pub mod admission;
pub mod config;
pub mod data;
pub mod error;
pub mod ledger;
pub mod orchestrator;
pub mod report;
pub mod sizer;
pub mod strategies;
pub mod types;

pub use config::Config;
pub use error::ConfigError;
pub use ledger::PositionLedger;
pub use orchestrator::{TickOrchestrator, TickOutcome};
pub use strategies::{Strategy, StrategyRegistry};
pub use types::*;
