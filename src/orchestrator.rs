//! Tick orchestrator
//!
//! Drives the per-tick protocol over the strategy fleet:
//!
//! 1. day rollover (equity/fee baselines, cooldown re-arm, EOD flag cleared)
//! 2. indicator refresh for every strategy (skipped once squared off)
//! 3. portfolio snapshot on snapshot-period boundaries
//! 4. backlog release through the admission controller (ends the tick)
//! 5. nothing more once the day is squared off
//! 6. end-of-day square-off at `day_length` (ends the tick)
//! 7. signal collection and ledger netting
//! 8. entry bookkeeping for slots that opened or went flat
//! 9. realized PnL attribution and AIMD feedback
//!
//! Everything is sequential and slot order is preserved, so the same tick
//! stream and configuration always replay to the same fills and ask limits.

use anyhow::Result;
use chrono::NaiveTime;
use tracing::{debug, info};

use crate::account::Account;
use crate::admission::AdmissionController;
use crate::config::{Config, EngineConfig};
use crate::error::{ConfigError, ConfigResult};
use crate::ledger::PositionLedger;
use crate::sizer::AskSizer;
use crate::strategies::{Strategy, StrategyRegistry};
use crate::{DayId, Fill, Money, Qty, Side, Signal, Snapshot, Tick};

/// How a tick ended
#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    /// A backlog slice was filled; nothing else ran this tick
    Released(Fill),
    /// End-of-day square-off fired and queued `delta`
    SquaredOff { delta: Qty },
    /// The day is already squared off
    Halted,
    /// Signals were netted into the ledger
    Evaluated { net_delta: Qty, closed: Vec<bool> },
}

/// Entry bookkeeping for an open slot
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Entry {
    pub price: f64,
    pub time: NaiveTime,
}

/// Running per-slot outcome statistics
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SlotStats {
    pub name: String,
    pub closed_trades: usize,
    pub wins: usize,
    pub losses: usize,
    pub realized_pnl: Money,
}

impl SlotStats {
    fn record(&mut self, pnl: Money) {
        self.closed_trades += 1;
        if pnl.is_positive() {
            self.wins += 1;
        } else if pnl.is_negative() {
            self.losses += 1;
        }
        self.realized_pnl += pnl;
    }
}

#[derive(Debug, Clone, Copy)]
struct DayState {
    day: DayId,
    start_equity: Money,
    start_fees: Money,
    start_fill_index: usize,
}

/// Results for the current day
#[derive(Debug, Clone)]
pub struct DayResult {
    pub day: DayId,
    pub fills: Vec<Fill>,
    pub day_pnl: Money,
    pub day_fees: Money,
    pub trade_count: usize,
}

/// Results for the whole run
#[derive(Debug, Clone)]
pub struct RunResult {
    pub fills: Vec<Fill>,
    pub snapshots: Vec<Snapshot>,
    pub total_pnl: Money,
    pub total_fees: Money,
    pub final_positions: Vec<Qty>,
    pub ask_limits: Vec<u64>,
    pub slots: Vec<SlotStats>,
}

pub struct TickOrchestrator {
    strategies: Vec<Box<dyn Strategy>>,
    config: EngineConfig,
    ledger: PositionLedger,
    sizer: AskSizer,
    admission: AdmissionController,
    account: Account,
    entries: Vec<Option<Entry>>,
    stats: Vec<SlotStats>,
    day: Option<DayState>,
    eod_squared_off: bool,
    last_price: Money,
    initial_equity: Money,
    fills: Vec<Fill>,
    snapshots: Vec<Snapshot>,
}

impl TickOrchestrator {
    /// Build an orchestrator over an ordered strategy fleet
    pub fn new(strategies: Vec<Box<dyn Strategy>>, config: EngineConfig) -> ConfigResult<Self> {
        config.validate()?;
        if strategies.is_empty() {
            return Err(ConfigError::NoStrategies);
        }
        let n = strategies.len();
        let ledger = PositionLedger::new(n, config.inventory_limit)?;
        let sizer = AskSizer::new(n, &config.aimd)?;
        let admission = AdmissionController::new(config.trade_limit, config.cooldown_period)?;
        let account = Account::new(config.initial_equity, config.transaction_cost);
        let stats = strategies
            .iter()
            .map(|s| SlotStats {
                name: s.name().to_string(),
                ..Default::default()
            })
            .collect();

        Ok(TickOrchestrator {
            initial_equity: account.cash(),
            strategies,
            ledger,
            sizer,
            admission,
            account,
            entries: vec![None; n],
            stats,
            day: None,
            eod_squared_off: false,
            last_price: Money::ZERO,
            fills: Vec::new(),
            snapshots: Vec::new(),
            config,
        })
    }

    /// Build the strategy fleet from config through the registry
    pub fn from_config(config: &Config, registry: &StrategyRegistry) -> Result<Self> {
        config.validate()?;
        let strategies = registry.create_all(&config.strategies)?;
        Ok(Self::new(strategies, config.engine.clone())?)
    }

    /// Process one tick belonging to `day`
    pub fn process_tick(&mut self, tick: &Tick, day: DayId) -> TickOutcome {
        if self.day.map(|d| d.day) != Some(day) {
            self.begin_day(day, tick);
        }
        let now = tick.seconds();
        self.last_price = Money::from_f64(tick.price);

        if !self.eod_squared_off {
            for strategy in self.strategies.iter_mut() {
                strategy.update_indicators(tick);
            }
        }

        if now % self.config.snapshot_period == 0 {
            self.take_snapshot(tick);
        }

        if let Some(quantity) = self.admission.try_release(i64::from(now)) {
            return TickOutcome::Released(self.record_fill(tick, quantity));
        }

        if self.eod_squared_off {
            return TickOutcome::Halted;
        }

        if now >= self.config.day_length {
            return self.square_off_day();
        }

        let signals = self.collect_signals();
        let previous = self.ledger.positions().to_vec();
        let outcome = self.ledger.update_position(&signals, self.sizer.asks());
        self.admission.accumulate(outcome.net_delta);

        let realized = self.settle_transitions(tick, &previous);
        self.sizer.update(&realized, &outcome.closed);

        TickOutcome::Evaluated {
            net_delta: outcome.net_delta,
            closed: outcome.closed,
        }
    }

    /// Process a whole day of ticks and return its result
    pub fn run_day(&mut self, day: DayId, ticks: &[Tick]) -> DayResult {
        for tick in ticks {
            self.process_tick(tick, day);
        }
        self.day_result()
    }

    fn begin_day(&mut self, day: DayId, tick: &Tick) {
        let equity = self.account.equity(Money::from_f64(tick.price));
        self.day = Some(DayState {
            day,
            start_equity: equity,
            start_fees: self.account.total_fees(),
            start_fill_index: self.fills.len(),
        });
        self.eod_squared_off = false;
        self.admission.reset_cooldown();
        info!(day, equity = %equity.round_dp(2), asks = ?self.sizer.asks(), "Starting day");
    }

    /// One signal per slot: entries while flat (long checked first), the
    /// matching exit while holding.
    fn collect_signals(&mut self) -> Vec<Signal> {
        let positions = self.ledger.positions();
        self.strategies
            .iter_mut()
            .zip(positions.iter())
            .map(|(strategy, &position)| {
                if position == 0 {
                    if strategy.check_long_entry() {
                        Signal::Long
                    } else if strategy.check_short_entry() {
                        Signal::Short
                    } else {
                        Signal::Flat
                    }
                } else if position > 0 && strategy.check_long_exit() {
                    Signal::Short
                } else if position < 0 && strategy.check_short_exit() {
                    Signal::Long
                } else {
                    Signal::Flat
                }
            })
            .collect()
    }

    /// Realize PnL for slots that went flat and update entry bookkeeping.
    ///
    /// Returns realized PnL per slot (zero where nothing closed).
    fn settle_transitions(&mut self, tick: &Tick, previous: &[Qty]) -> Vec<Money> {
        let exit_price = Money::from_f64(tick.price);
        let mut realized = vec![Money::ZERO; previous.len()];

        for (i, &before) in previous.iter().enumerate() {
            let after = self.ledger.position(i);

            if before != 0 && after.signum() * before.signum() <= 0 {
                if let Some(entry) = self.entries[i] {
                    let pnl = self.realized_pnl(Money::from_f64(entry.price), exit_price, before);
                    realized[i] = pnl;
                    self.stats[i].record(pnl);
                    debug!(
                        strategy = %self.stats[i].name,
                        slot = i,
                        position = before,
                        entry = entry.price,
                        exit = tick.price,
                        pnl = %pnl.round_dp(4),
                        "Position closed"
                    );
                }
            }

            if before == 0 && after != 0 {
                self.strategies[i].update_position(after, tick.price);
                self.entries[i] = Some(Entry {
                    price: tick.price,
                    time: tick.time,
                });
            } else if before != 0 && after == 0 {
                self.strategies[i].update_position(0, 0.0);
                self.entries[i] = None;
            }
        }
        realized
    }

    /// Round-trip PnL of `position` units, net of entry and exit costs
    fn realized_pnl(&self, entry: Money, exit: Money, position: Qty) -> Money {
        let size = Money::from_i64(position.abs());
        let direction = Money::from_i64(position.signum());
        let cost = self.account.transaction_cost() * (entry + exit) * size;
        (exit - entry) * direction * size - cost
    }

    fn square_off_day(&mut self) -> TickOutcome {
        let delta = -self.ledger.net_position();
        debug!(positions = ?self.ledger.positions(), "Squaring off book");
        self.ledger.reset();
        self.admission.accumulate(delta);
        self.eod_squared_off = true;
        self.entries.iter_mut().for_each(|e| *e = None);
        for strategy in self.strategies.iter_mut() {
            strategy.reset();
        }
        info!(
            day = ?self.current_day(),
            delta,
            backlog = self.admission.backlog(),
            "End-of-day square-off"
        );
        TickOutcome::SquaredOff { delta }
    }

    fn record_fill(&mut self, tick: &Tick, quantity: Qty) -> Fill {
        let price = Money::from_f64(tick.price);
        let settlement = self.account.settle(quantity, price);
        let fill = Fill {
            time: tick.time,
            price,
            quantity: quantity.unsigned_abs(),
            side: Side::of(quantity),
            inventory: self.ledger.net_position(),
            fee: settlement.fee,
            day: self.current_day().unwrap_or_default(),
        };
        if self.config.verbose_snapshots {
            info!(time = %fill.time, side = %fill.side, qty = fill.quantity, price = tick.price, notional = %settlement.notional, backlog = self.admission.backlog(), "Executed trade");
        } else {
            debug!(time = %fill.time, side = %fill.side, qty = fill.quantity, price = tick.price, notional = %settlement.notional, backlog = self.admission.backlog(), "Executed trade");
        }
        self.fills.push(fill.clone());
        fill
    }

    fn take_snapshot(&mut self, tick: &Tick) {
        let price = Money::from_f64(tick.price);
        let snapshot = Snapshot {
            time: tick.time,
            day: self.current_day().unwrap_or_default(),
            price: tick.price,
            equity: self.account.equity(price),
            cash: self.account.cash(),
            inventory: self.ledger.net_position(),
            executed_inventory: self.account.inventory(),
        };
        if self.config.verbose_snapshots {
            info!(time = %snapshot.time, equity = %snapshot.equity.round_dp(2), cash = %snapshot.cash.round_dp(2), positions = ?self.ledger.positions(), "Snapshot");
        } else {
            debug!(time = %snapshot.time, equity = %snapshot.equity.round_dp(2), cash = %snapshot.cash.round_dp(2), positions = ?self.ledger.positions(), "Snapshot");
        }
        self.snapshots.push(snapshot);
    }

    // =========================================================================
    // Results and accessors
    // =========================================================================

    /// Cash plus executed inventory marked at the last seen price
    pub fn equity(&self) -> Money {
        self.account.equity(self.last_price)
    }

    pub fn day_result(&self) -> DayResult {
        let (day, start_equity, start_fees, start) = match self.day {
            Some(d) => (d.day, d.start_equity, d.start_fees, d.start_fill_index),
            None => (0, self.initial_equity, Money::ZERO, 0),
        };
        let fills = self.fills[start..].to_vec();
        DayResult {
            day,
            trade_count: fills.len(),
            fills,
            day_pnl: self.equity() - start_equity,
            day_fees: self.account.total_fees() - start_fees,
        }
    }

    pub fn result(&self) -> RunResult {
        RunResult {
            fills: self.fills.clone(),
            snapshots: self.snapshots.clone(),
            total_pnl: self.equity() - self.initial_equity,
            total_fees: self.account.total_fees(),
            final_positions: self.ledger.positions().to_vec(),
            ask_limits: self.sizer.asks().to_vec(),
            slots: self.stats.clone(),
        }
    }

    pub fn current_day(&self) -> Option<DayId> {
        self.day.map(|d| d.day)
    }

    pub fn is_squared_off(&self) -> bool {
        self.eod_squared_off
    }

    pub fn ledger(&self) -> &PositionLedger {
        &self.ledger
    }

    pub fn asks(&self) -> &[u64] {
        self.sizer.asks()
    }

    pub fn backlog(&self) -> Qty {
        self.admission.backlog()
    }

    pub fn account(&self) -> &Account {
        &self.account
    }

    pub fn entry(&self, slot: usize) -> Option<Entry> {
        self.entries.get(slot).copied().flatten()
    }

    pub fn fills(&self) -> &[Fill] {
        &self.fills
    }

    pub fn snapshots(&self) -> &[Snapshot] {
        &self.snapshots
    }

    pub fn slot_stats(&self) -> &[SlotStats] {
        &self.stats
    }

    pub fn num_slots(&self) -> usize {
        self.strategies.len()
    }
}
