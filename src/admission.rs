//! Admission control for netted trades
//!
//! Net demand from the ledger is queued as a signed backlog and metered
//! out in slices of at most `trade_limit`, with a cooldown between slices.
//! Cooldown is measured on tick timestamps (seconds of day), never on wall
//! clock time.

use crate::error::{ConfigError, ConfigResult};
use crate::Qty;

#[derive(Debug, Clone)]
pub struct AdmissionController {
    backlog: Qty,
    last_release: i64,
    trade_limit: Qty,
    cooldown_period: i64,
}

impl AdmissionController {
    pub fn new(trade_limit: u64, cooldown_period: u32) -> ConfigResult<Self> {
        if trade_limit == 0 {
            return Err(ConfigError::NonPositive {
                field: "trade_limit",
            });
        }
        if cooldown_period == 0 {
            return Err(ConfigError::NonPositive {
                field: "cooldown_period",
            });
        }
        let cooldown_period = i64::from(cooldown_period);
        Ok(AdmissionController {
            backlog: 0,
            last_release: -cooldown_period,
            trade_limit: Qty::try_from(trade_limit).unwrap_or(Qty::MAX),
            cooldown_period,
        })
    }

    pub fn backlog(&self) -> Qty {
        self.backlog
    }

    pub fn last_release(&self) -> i64 {
        self.last_release
    }

    /// Queue a net trade delta
    pub fn accumulate(&mut self, delta: Qty) {
        self.backlog += delta;
    }

    /// Whether a release would fire at `now`
    pub fn is_ready(&self, now: i64) -> bool {
        self.backlog != 0 && now - self.last_release > self.cooldown_period
    }

    /// Release the next slice of backlog, if the gate is open.
    ///
    /// The slice has the backlog's sign and magnitude `min(|backlog|, trade_limit)`.
    pub fn try_release(&mut self, now: i64) -> Option<Qty> {
        if !self.is_ready(now) {
            return None;
        }
        let released = self.backlog.abs().min(self.trade_limit) * self.backlog.signum();
        self.backlog -= released;
        self.last_release = now;
        Some(released)
    }

    /// Re-arm the cooldown so the first tick of a new day may release
    pub fn reset_cooldown(&mut self) {
        self.last_release = -self.cooldown_period;
    }
}
