//! Configuration management
//!
//! Handles loading, defaulting and validation of the JSON run configuration.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{ConfigError, ConfigResult};
use crate::DayId;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub engine: EngineConfig,
    /// Ordered strategy slots. Order is priority: earlier slots lock the
    /// netting direction and get inventory headroom first.
    #[serde(default)]
    pub strategies: Vec<StrategyConfig>,
    #[serde(default)]
    pub data: DataConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

impl Config {
    /// Load configuration from JSON file and validate it
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = fs::read_to_string(path.as_ref()).context("Failed to read config file")?;
        let config = Self::from_json(&contents)?;
        Ok(config)
    }

    /// Parse and validate configuration from a JSON string
    pub fn from_json(contents: &str) -> Result<Self> {
        let config: Config =
            serde_json::from_str(contents).context("Failed to parse config JSON")?;
        config.validate().context("Invalid configuration")?;
        Ok(config)
    }

    /// Fail fast on settings that would make the engine ill-defined
    pub fn validate(&self) -> ConfigResult<()> {
        self.engine.validate()?;
        if self.strategies.is_empty() {
            return Err(ConfigError::NoStrategies);
        }
        for strategy in &self.strategies {
            check_non_negative("strategies.tp", strategy.tp)?;
            check_non_negative("strategies.sl", strategy.sl)?;
        }
        Ok(())
    }

    /// Strategy names in slot order
    pub fn strategy_names(&self) -> Vec<String> {
        self.strategies.iter().map(|s| s.name.clone()).collect()
    }
}

/// Netting engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Hard cap on the sum of absolute slot positions
    pub inventory_limit: u64,
    /// Largest quantity a single backlog release may fill
    pub trade_limit: u64,
    /// Seconds that must pass (strictly more than) between two releases
    pub cooldown_period: u32,
    /// Starting cash in the same currency as tick prices
    pub initial_equity: f64,
    /// Snapshot whenever time-of-day is a multiple of this many seconds
    pub snapshot_period: u32,
    /// Time-of-day (seconds) at which positions are squared off for the day
    pub day_length: u32,
    /// Fee as a fraction of notional, charged per side
    pub transaction_cost: f64,
    /// Promote fill and snapshot logs from debug to info
    pub verbose_snapshots: bool,
    pub aimd: AimdConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            inventory_limit: 100,
            trade_limit: 100,
            cooldown_period: 15,
            initial_equity: 100_000.0,
            snapshot_period: 300,
            day_length: 6 * 3600,
            transaction_cost: 0.0,
            verbose_snapshots: false,
            aimd: AimdConfig::default(),
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> ConfigResult<()> {
        check_positive("engine.inventory_limit", self.inventory_limit)?;
        check_positive("engine.trade_limit", self.trade_limit)?;
        check_positive("engine.cooldown_period", u64::from(self.cooldown_period))?;
        check_positive("engine.snapshot_period", u64::from(self.snapshot_period))?;
        check_positive("engine.day_length", u64::from(self.day_length))?;
        check_non_negative("engine.initial_equity", self.initial_equity)?;
        check_non_negative("engine.transaction_cost", self.transaction_cost)?;
        self.aimd.validate()
    }
}

/// Additive-increase / multiplicative-decrease ask sizing parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AimdConfig {
    /// Ask limit every slot starts with
    pub initial_ask: u64,
    /// Added to a slot's ask limit after a profitable close
    pub reward_add: u64,
    /// Multiplied into a slot's ask limit after a losing close
    pub penalty_mult: f64,
}

impl Default for AimdConfig {
    fn default() -> Self {
        AimdConfig {
            initial_ask: 10,
            reward_add: 33,
            penalty_mult: 0.666,
        }
    }
}

impl AimdConfig {
    pub fn validate(&self) -> ConfigResult<()> {
        check_positive("engine.aimd.initial_ask", self.initial_ask)?;
        if !(self.penalty_mult > 0.0 && self.penalty_mult <= 1.0) {
            return Err(ConfigError::PenaltyOutOfRange(self.penalty_mult));
        }
        Ok(())
    }
}

/// One strategy slot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategyConfig {
    /// Registry name, e.g. "hourly_long"
    pub name: String,
    /// Take-profit distance (absolute price difference)
    #[serde(default)]
    pub tp: f64,
    /// Stop-loss distance (absolute price difference)
    #[serde(default)]
    pub sl: f64,
}

impl StrategyConfig {
    pub fn new(name: impl Into<String>, tp: f64, sl: f64) -> Self {
        StrategyConfig {
            name: name.into(),
            tp,
            sl,
        }
    }
}

/// Tick data location
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    pub directory: String,
    /// Half-open `[start, end)` day-number ranges, processed in order
    pub file_range: Vec<[DayId; 2]>,
}

impl Default for DataConfig {
    fn default() -> Self {
        DataConfig {
            directory: "data".to_string(),
            file_range: Vec::new(),
        }
    }
}

impl DataConfig {
    /// Every configured day number, in processing order
    pub fn days(&self) -> impl Iterator<Item = DayId> + '_ {
        self.file_range.iter().flat_map(|[start, end]| *start..*end)
    }
}

/// Which reports to persist, and where
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub results_dir: String,
    pub trade_sheets_dir: String,
    pub save_trade_sheets: bool,
    pub save_combined_trades: bool,
    pub save_day_summary: bool,
    pub save_snapshots: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        OutputConfig {
            results_dir: "results".to_string(),
            trade_sheets_dir: "trade_sheets".to_string(),
            save_trade_sheets: true,
            save_combined_trades: true,
            save_day_summary: true,
            save_snapshots: true,
        }
    }
}

impl OutputConfig {
    pub fn results_path(&self, file_name: &str) -> PathBuf {
        Path::new(&self.results_dir).join(file_name)
    }

    pub fn trade_sheet_path(&self, day: DayId) -> PathBuf {
        Path::new(&self.trade_sheets_dir).join(format!("trade_sheet_day{}.csv", day))
    }
}

fn check_positive(field: &'static str, value: u64) -> ConfigResult<()> {
    if value == 0 {
        return Err(ConfigError::NonPositive { field });
    }
    Ok(())
}

fn check_non_negative(field: &'static str, value: f64) -> ConfigResult<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(ConfigError::Negative { field, value });
    }
    Ok(())
}
