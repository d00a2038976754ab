//! Result persistence and run statistics
//!
//! Trade sheets, snapshots and day summaries are written as CSV. The
//! overall statistics block is computed from the per-day summaries.

use anyhow::{Context, Result};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;

use crate::orchestrator::{DayResult, RunResult};
use crate::{DayId, Money};

/// One row of the day-wise summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DaySummary {
    #[serde(rename = "Day")]
    pub day: DayId,
    #[serde(rename = "Total_PnL")]
    pub pnl: Money,
    #[serde(rename = "Total_Fees")]
    pub fees: Money,
    #[serde(rename = "Trade_Count")]
    pub trade_count: usize,
}

impl From<&DayResult> for DaySummary {
    fn from(result: &DayResult) -> Self {
        DaySummary {
            day: result.day,
            pnl: result.day_pnl,
            fees: result.day_fees,
            trade_count: result.trade_count,
        }
    }
}

/// Write serializable rows to a CSV file, creating parent directories
pub fn write_csv<T: Serialize>(path: impl AsRef<Path>, rows: &[T]) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
    }
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    for row in rows {
        writer
            .serialize(row)
            .with_context(|| format!("Failed to write row to {}", path.display()))?;
    }
    writer.flush()?;
    Ok(())
}

/// Overall statistics across processed days
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub total_days: usize,
    pub total_pnl: Money,
    pub total_fees: Money,
    pub total_trades: usize,
    pub avg_daily_pnl: Money,
    /// Percentage of days with positive PnL
    pub win_rate: f64,
    pub best_day: Option<(DayId, Money)>,
    pub worst_day: Option<(DayId, Money)>,
    pub pnl_per_unit: Money,
    pub final_asks: Vec<u64>,
}

impl RunSummary {
    pub fn new(days: &[DaySummary], run: &RunResult, inventory_limit: u64) -> Self {
        let total_days = days.len();
        let day_total: Money = days.iter().map(|d| d.pnl).sum();
        let avg_daily_pnl = if total_days > 0 {
            Money::from(day_total.inner() / rust_decimal::Decimal::from(total_days as u64))
        } else {
            Money::ZERO
        };
        let winning_days = days.iter().filter(|d| d.pnl.is_positive()).count();
        let win_rate = if total_days > 0 {
            winning_days as f64 / total_days as f64 * 100.0
        } else {
            0.0
        };

        // ties resolve to the earliest day
        let best_day = days
            .iter()
            .max_set_by(|a, b| a.pnl.cmp(&b.pnl))
            .first()
            .map(|d| (d.day, d.pnl));
        let worst_day = days
            .iter()
            .min_set_by(|a, b| a.pnl.cmp(&b.pnl))
            .first()
            .map(|d| (d.day, d.pnl));

        let pnl_per_unit = if inventory_limit > 0 {
            Money::from(run.total_pnl.inner() / rust_decimal::Decimal::from(inventory_limit))
        } else {
            Money::ZERO
        };

        RunSummary {
            total_days,
            total_pnl: run.total_pnl,
            total_fees: run.total_fees,
            total_trades: run.fills.len(),
            avg_daily_pnl,
            win_rate,
            best_day,
            worst_day,
            pnl_per_unit,
            final_asks: run.ask_limits.clone(),
        }
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", "=".repeat(60))?;
        writeln!(f, "OVERALL STATISTICS")?;
        writeln!(f, "{}", "=".repeat(60))?;
        writeln!(f, "Total Days Processed: {}", self.total_days)?;
        writeln!(f, "Total PnL:            {:.2}", self.total_pnl.to_f64())?;
        writeln!(f, "Total Fees:           {:.2}", self.total_fees.to_f64())?;
        writeln!(f, "Total Trades:         {}", self.total_trades)?;
        writeln!(f, "Average Daily PnL:    {:.2}", self.avg_daily_pnl.to_f64())?;
        writeln!(f, "Win Rate:             {:.1}%", self.win_rate)?;
        if let Some((day, pnl)) = self.best_day {
            writeln!(f, "Best Day:             {:.2} (Day {})", pnl.to_f64(), day)?;
        }
        if let Some((day, pnl)) = self.worst_day {
            writeln!(f, "Worst Day:            {:.2} (Day {})", pnl.to_f64(), day)?;
        }
        writeln!(f, "PnL per Unit:         {:.4}", self.pnl_per_unit.to_f64())?;
        writeln!(f, "Final Asks:           {:?}", self.final_asks)?;
        write!(f, "{}", "=".repeat(60))
    }
}
