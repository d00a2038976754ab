//! Integration tests for the netting engine
//!
//! These tests drive the orchestrator tick by tick with scripted strategies
//! and check the observable protocol: metering, EOD handling, AIMD feedback
//! and accounting.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use fleet_netting::config::{AimdConfig, EngineConfig, StrategyConfig};
use fleet_netting::{
    Config, Money, Qty, Side, Strategy, StrategyRegistry, Tick, TickOrchestrator, TickOutcome,
};
use rust_decimal_macros::dec;

// =============================================================================
// Test Utilities
// =============================================================================

type CallLog = Arc<Mutex<Vec<String>>>;

/// Strategy that fires checks at fixed times of day and logs every call
#[derive(Default)]
struct Scripted {
    long_entry: HashSet<u32>,
    short_entry: HashSet<u32>,
    long_exit: HashSet<u32>,
    short_exit: HashSet<u32>,
    now: u32,
    calls: CallLog,
}

impl Scripted {
    fn new(calls: &CallLog) -> Self {
        Scripted {
            calls: Arc::clone(calls),
            ..Default::default()
        }
    }

    fn long_at(mut self, times: &[u32]) -> Self {
        self.long_entry.extend(times);
        self
    }

    fn short_at(mut self, times: &[u32]) -> Self {
        self.short_entry.extend(times);
        self
    }

    fn exit_long_at(mut self, times: &[u32]) -> Self {
        self.long_exit.extend(times);
        self
    }

    fn log(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    fn boxed(self) -> Box<dyn Strategy> {
        Box::new(self)
    }
}

impl Strategy for Scripted {
    fn name(&self) -> &'static str {
        "scripted"
    }

    fn update_indicators(&mut self, tick: &Tick) {
        self.now = tick.seconds();
        self.log(format!("indicators@{}", self.now));
    }

    fn check_long_entry(&mut self) -> bool {
        self.log(format!("long_entry@{}", self.now));
        self.long_entry.contains(&self.now)
    }

    fn check_short_entry(&mut self) -> bool {
        self.log(format!("short_entry@{}", self.now));
        self.short_entry.contains(&self.now)
    }

    fn check_long_exit(&mut self) -> bool {
        self.log(format!("long_exit@{}", self.now));
        self.long_exit.contains(&self.now)
    }

    fn check_short_exit(&mut self) -> bool {
        self.log(format!("short_exit@{}", self.now));
        self.short_exit.contains(&self.now)
    }

    fn update_position(&mut self, position: Qty, entry_price: f64) {
        self.log(format!("position({},{})", position, entry_price));
    }

    fn reset(&mut self) {
        self.log("reset".to_string());
    }
}

fn engine(initial_ask: u64) -> EngineConfig {
    EngineConfig {
        inventory_limit: 100,
        trade_limit: 100,
        cooldown_period: 5,
        initial_equity: 100_000.0,
        snapshot_period: 3_600,
        day_length: 20_000,
        transaction_cost: 0.0,
        verbose_snapshots: false,
        aimd: AimdConfig {
            initial_ask,
            reward_add: 33,
            penalty_mult: 0.666,
        },
    }
}

fn calls(log: &CallLog) -> Vec<String> {
    log.lock().unwrap().clone()
}

// =============================================================================
// Netting and Admission Tests
// =============================================================================

#[test]
fn test_netted_demand_is_metered_out() {
    let log = CallLog::default();
    let config = EngineConfig {
        trade_limit: 30,
        ..engine(60)
    };
    let fleet = vec![
        Scripted::new(&log).long_at(&[100]).boxed(),
        Scripted::new(&log).long_at(&[100]).boxed(),
    ];
    let mut orch = TickOrchestrator::new(fleet, config).unwrap();

    let outcome = orch.process_tick(&Tick::at_seconds(100, 10.0), 1);
    assert_eq!(
        outcome,
        TickOutcome::Evaluated {
            net_delta: 100,
            closed: vec![false, false]
        }
    );
    assert_eq!(orch.ledger().positions(), &[60, 40]);
    assert_eq!(orch.backlog(), 100);

    let mut released = Vec::new();
    for t in 101..=130 {
        if let TickOutcome::Released(fill) = orch.process_tick(&Tick::at_seconds(t, 10.0), 1) {
            released.push((t, fill.signed_quantity()));
        }
    }
    assert_eq!(released, vec![(101, 30), (107, 30), (113, 30), (119, 10)]);
    assert_eq!(orch.backlog(), 0);
    assert_eq!(orch.account().inventory(), 100);
    assert_eq!(orch.account().cash(), Money::from(dec!(99000)));
    assert!(orch.fills().iter().all(|f| f.inventory == 100 && f.side == Side::Buy));
}

#[test]
fn test_release_consumes_the_tick() {
    let log = CallLog::default();
    let config = EngineConfig {
        trade_limit: 30,
        ..engine(60)
    };
    let fleet = vec![
        Scripted::new(&log).long_at(&[100]).boxed(),
        Scripted::new(&log).long_at(&[100]).boxed(),
        Scripted::new(&log).long_at(&[101]).boxed(),
    ];
    let mut orch = TickOrchestrator::new(fleet, config).unwrap();

    orch.process_tick(&Tick::at_seconds(100, 10.0), 1);
    let outcome = orch.process_tick(&Tick::at_seconds(101, 10.0), 1);
    assert!(matches!(outcome, TickOutcome::Released(_)));

    let log = calls(&log);
    assert!(log.contains(&"indicators@101".to_string()));
    assert!(!log.contains(&"long_entry@101".to_string()));
    assert_eq!(orch.ledger().positions(), &[60, 40, 0]);
}

#[test]
fn test_backlog_conservation_across_window() {
    let log = CallLog::default();
    let config = EngineConfig {
        trade_limit: 7,
        cooldown_period: 2,
        ..engine(25)
    };
    let fleet = vec![
        Scripted::new(&log).long_at(&[10]).exit_long_at(&[40]).boxed(),
        Scripted::new(&log).long_at(&[12]).boxed(),
    ];
    let mut orch = TickOrchestrator::new(fleet, config).unwrap();

    let mut netted: Qty = 0;
    let mut released: Qty = 0;
    for t in 10..=80 {
        match orch.process_tick(&Tick::at_seconds(t, 50.0), 1) {
            TickOutcome::Evaluated { net_delta, .. } => netted += net_delta,
            TickOutcome::Released(fill) => released += fill.signed_quantity(),
            TickOutcome::SquaredOff { delta } => netted += delta,
            TickOutcome::Halted => {}
        }
        assert_eq!(orch.backlog(), netted - released);
    }
    assert_eq!(orch.account().inventory(), released);
}

// =============================================================================
// End-of-Day Tests
// =============================================================================

#[test]
fn test_end_of_day_squares_off_and_halts() {
    let log = CallLog::default();
    let config = EngineConfig {
        day_length: 200,
        ..engine(10)
    };
    let fleet = vec![Scripted::new(&log).long_at(&[100]).boxed()];
    let mut orch = TickOrchestrator::new(fleet, config).unwrap();

    orch.process_tick(&Tick::at_seconds(100, 10.0), 1);
    assert!(matches!(
        orch.process_tick(&Tick::at_seconds(101, 10.0), 1),
        TickOutcome::Released(_)
    ));
    orch.process_tick(&Tick::at_seconds(150, 10.0), 1);

    let outcome = orch.process_tick(&Tick::at_seconds(200, 11.0), 1);
    assert_eq!(outcome, TickOutcome::SquaredOff { delta: -10 });
    assert!(orch.is_squared_off());
    assert_eq!(orch.ledger().positions(), &[0]);
    assert_eq!(orch.backlog(), -10);
    assert!(orch.entry(0).is_none());

    log.lock().unwrap().clear();
    match orch.process_tick(&Tick::at_seconds(201, 11.0), 1) {
        TickOutcome::Released(fill) => {
            assert_eq!(fill.side, Side::Sell);
            assert_eq!(fill.quantity, 10);
        }
        other => panic!("expected release, got {:?}", other),
    }
    for t in 202..260 {
        assert_eq!(
            orch.process_tick(&Tick::at_seconds(t, 11.0), 1),
            TickOutcome::Halted
        );
    }
    // squared off: no indicator refresh and no signal checks
    assert!(calls(&log).is_empty());
    assert_eq!(orch.account().inventory(), 0);
    assert_eq!(orch.ledger().positions(), &[0]);

    // next day re-opens
    let outcome = orch.process_tick(&Tick::at_seconds(100, 12.0), 2);
    assert!(!orch.is_squared_off());
    assert_eq!(orch.current_day(), Some(2));
    assert!(matches!(outcome, TickOutcome::Evaluated { net_delta: 10, .. }));
}

#[test]
fn test_square_off_resets_strategies_once() {
    let log = CallLog::default();
    let config = EngineConfig {
        day_length: 50,
        ..engine(10)
    };
    let fleet = vec![
        Scripted::new(&log).boxed(),
        Scripted::new(&log).boxed(),
    ];
    let mut orch = TickOrchestrator::new(fleet, config).unwrap();
    for t in 49..60 {
        orch.process_tick(&Tick::at_seconds(t, 1.0), 1);
    }
    let resets = calls(&log).iter().filter(|c| *c == "reset").count();
    assert_eq!(resets, 2);
}

// =============================================================================
// AIMD Feedback Tests
// =============================================================================

fn round_trip(exit_price: f64) -> TickOrchestrator {
    let log = CallLog::default();
    let fleet = vec![Scripted::new(&log)
        .long_at(&[10])
        .exit_long_at(&[20])
        .boxed()];
    let mut orch = TickOrchestrator::new(fleet, engine(10)).unwrap();
    orch.process_tick(&Tick::at_seconds(10, 100.0), 1);
    orch.process_tick(&Tick::at_seconds(11, 100.0), 1);
    let outcome = orch.process_tick(&Tick::at_seconds(20, exit_price), 1);
    assert_eq!(
        outcome,
        TickOutcome::Evaluated {
            net_delta: -10,
            closed: vec![true]
        }
    );
    orch
}

#[test]
fn test_profitable_close_grows_ask() {
    let orch = round_trip(105.0);
    assert_eq!(orch.asks(), &[43]);
    let stats = &orch.slot_stats()[0];
    assert_eq!(stats.wins, 1);
    assert_eq!(stats.realized_pnl, Money::from(dec!(50)));
}

#[test]
fn test_losing_close_shrinks_ask() {
    let orch = round_trip(95.0);
    assert_eq!(orch.asks(), &[6]);
    assert_eq!(orch.slot_stats()[0].losses, 1);
}

#[test]
fn test_flat_close_leaves_ask() {
    let orch = round_trip(100.0);
    assert_eq!(orch.asks(), &[10]);
    assert_eq!(orch.slot_stats()[0].closed_trades, 1);
}

#[test]
fn test_entry_bookkeeping_and_notifications() {
    let log = CallLog::default();
    let fleet = vec![Scripted::new(&log)
        .long_at(&[10])
        .exit_long_at(&[20])
        .boxed()];
    let mut orch = TickOrchestrator::new(fleet, engine(10)).unwrap();

    orch.process_tick(&Tick::at_seconds(10, 100.0), 1);
    let entry = orch.entry(0).unwrap();
    assert_eq!(entry.price, 100.0);
    assert_eq!(entry.time, Tick::at_seconds(10, 0.0).time);

    orch.process_tick(&Tick::at_seconds(11, 100.0), 1);
    orch.process_tick(&Tick::at_seconds(20, 104.0), 1);
    assert!(orch.entry(0).is_none());

    let positions: Vec<_> = calls(&log)
        .into_iter()
        .filter(|c| c.starts_with("position"))
        .collect();
    assert_eq!(positions, vec!["position(10,100)", "position(0,0)"]);
}

#[test]
fn test_direction_lock_squares_off_lagging_short() {
    let log = CallLog::default();
    let fleet = vec![
        Scripted::new(&log).long_at(&[20]).boxed(),
        Scripted::new(&log).short_at(&[10]).boxed(),
    ];
    let mut orch = TickOrchestrator::new(fleet, engine(10)).unwrap();

    orch.process_tick(&Tick::at_seconds(10, 100.0), 1);
    assert_eq!(orch.ledger().positions(), &[0, -10]);
    assert!(matches!(
        orch.process_tick(&Tick::at_seconds(11, 100.0), 1),
        TickOutcome::Released(_)
    ));
    assert_eq!(orch.backlog(), 0);

    // strategy 0 locks long; strategy 1 is flattened at a loss for a short
    let outcome = orch.process_tick(&Tick::at_seconds(20, 101.0), 1);
    assert_eq!(
        outcome,
        TickOutcome::Evaluated {
            net_delta: 20,
            closed: vec![false, true]
        }
    );
    assert_eq!(orch.ledger().positions(), &[10, 0]);
    assert_eq!(orch.asks(), &[10, 6]);
}

// =============================================================================
// Accounting and Reporting Tests
// =============================================================================

#[test]
fn test_fill_fees_and_snapshots() {
    let log = CallLog::default();
    let config = EngineConfig {
        snapshot_period: 60,
        transaction_cost: 0.001,
        ..engine(10)
    };
    let fleet = vec![Scripted::new(&log).long_at(&[30]).boxed()];
    let mut orch = TickOrchestrator::new(fleet, config).unwrap();

    orch.process_tick(&Tick::at_seconds(30, 10.0), 1);
    let fill = match orch.process_tick(&Tick::at_seconds(31, 10.0), 1) {
        TickOutcome::Released(fill) => fill,
        other => panic!("expected release, got {:?}", other),
    };
    assert_eq!(fill.fee, Money::from(dec!(0.1)));
    assert_eq!(orch.account().cash(), Money::from(dec!(99899.9)));

    orch.process_tick(&Tick::at_seconds(120, 12.0), 1);
    let snapshot = orch.snapshots().last().unwrap();
    assert_eq!(snapshot.cash, Money::from(dec!(99899.9)));
    assert_eq!(snapshot.equity, Money::from(dec!(100019.9)));
    assert_eq!(snapshot.inventory, 10);
    assert_eq!(snapshot.executed_inventory, 10);

    let day = orch.day_result();
    assert_eq!(day.trade_count, 1);
    assert_eq!(day.day_fees, Money::from(dec!(0.1)));
    assert_eq!(day.day_pnl, Money::from(dec!(19.9)));
}

#[test]
fn test_day_result_only_counts_current_day() {
    let log = CallLog::default();
    let fleet = vec![Scripted::new(&log).long_at(&[10]).boxed()];
    let mut orch = TickOrchestrator::new(fleet, engine(10)).unwrap();

    let day1 = orch.run_day(1, &[Tick::at_seconds(10, 5.0), Tick::at_seconds(11, 5.0)]);
    assert_eq!(day1.trade_count, 1);

    let day2 = orch.run_day(2, &[Tick::at_seconds(50, 5.0)]);
    assert_eq!(day2.day, 2);
    assert_eq!(day2.trade_count, 0);
    assert_eq!(orch.result().fills.len(), 1);
}

#[test]
fn test_from_config_with_registry() {
    let config = Config::from_json(
        r#"{
            "engine": { "inventory_limit": 40 },
            "strategies": [
                { "name": "hourly_long", "tp": 0.5, "sl": 0.5 },
                { "name": "half_hour_short", "tp": 0.5, "sl": 0.5 }
            ]
        }"#,
    )
    .unwrap();
    let registry = StrategyRegistry::with_builtins();
    let orch = TickOrchestrator::from_config(&config, &registry).unwrap();
    assert_eq!(orch.num_slots(), 2);
    assert_eq!(orch.asks(), &[10, 10]);
    assert_eq!(orch.ledger().inventory_limit(), 40);

    let mut bad = config.clone();
    bad.strategies.push(StrategyConfig::new("does_not_exist", 1.0, 1.0));
    let err = TickOrchestrator::from_config(&bad, &registry).err().unwrap();
    assert!(err.to_string().contains("does_not_exist"));
}
