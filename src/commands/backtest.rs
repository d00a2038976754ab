//! Backtest command implementation

use anyhow::Result;
use fleet_netting::report::{self, DaySummary, RunSummary};
use fleet_netting::{data, Config, StrategyRegistry, TickOrchestrator};
use tracing::{debug, info, warn};

pub fn run(
    config_path: String,
    data_dir_override: Option<String>,
    inventory_limit_override: Option<u64>,
    trade_limit_override: Option<u64>,
    capital_override: Option<f64>,
) -> Result<()> {
    info!("Starting backtest");

    // Load configuration
    let mut config = Config::from_file(&config_path)?;
    info!("Loaded configuration from: {}", config_path);

    // Apply overrides
    if let Some(dir) = data_dir_override {
        info!("Overriding data directory to: {}", dir);
        config.data.directory = dir;
    }

    if let Some(limit) = inventory_limit_override {
        info!("Overriding inventory limit to: {}", limit);
        config.engine.inventory_limit = limit;
    }

    if let Some(limit) = trade_limit_override {
        info!("Overriding trade limit to: {}", limit);
        config.engine.trade_limit = limit;
    }

    if let Some(capital) = capital_override {
        info!("Overriding initial equity to: {:.2}", capital);
        config.engine.initial_equity = capital;
    }

    config.validate()?;

    let registry = StrategyRegistry::with_builtins();
    let mut engine = TickOrchestrator::from_config(&config, &registry)?;

    info!(
        strategies = ?config.strategy_names(),
        inventory_limit = config.engine.inventory_limit,
        trade_limit = config.engine.trade_limit,
        cooldown = config.engine.cooldown_period,
        asks = ?engine.asks(),
        "Orchestrator initialized"
    );
    info!("Data directory: {}", config.data.directory);

    let mut summaries = Vec::new();

    for day in config.data.days() {
        let ticks = match data::try_load_day(&config.data.directory, day)? {
            Some(ticks) => ticks,
            None => {
                warn!(day, "Skipping day - file not found");
                continue;
            }
        };

        let validation = data::validate_ticks(&ticks);
        for warning in &validation.warnings {
            warn!(day, "{}", warning);
        }
        if !validation.is_valid() {
            for error in &validation.errors {
                warn!(day, "{}", error);
            }
            warn!(day, "Skipping day - invalid tick data");
            continue;
        }

        info!(day, ticks = ticks.len(), starting_asks = ?engine.asks(), "Processing day");
        let result = engine.run_day(day, &ticks);
        info!(
            day,
            ending_asks = ?engine.asks(),
            pnl = %result.day_pnl.round_dp(2),
            trades = result.trade_count,
            "Day complete"
        );

        if config.output.save_trade_sheets && !result.fills.is_empty() {
            let path = config.output.trade_sheet_path(day);
            report::write_csv(&path, &result.fills)?;
            debug!("Trade sheet saved to {}", path.display());
        }

        summaries.push(DaySummary::from(&result));
    }

    let run = engine.result();

    if config.output.save_combined_trades && !run.fills.is_empty() {
        let path = config.output.results_path("all_trades.csv");
        report::write_csv(&path, &run.fills)?;
        info!("Combined trade book saved to {}", path.display());
    }

    if config.output.save_snapshots && !run.snapshots.is_empty() {
        let path = config.output.results_path("portfolio_snapshots.csv");
        report::write_csv(&path, &run.snapshots)?;
        info!("Portfolio snapshots saved to {}", path.display());
    }

    if summaries.is_empty() {
        warn!("No results to save - no days were processed");
        return Ok(());
    }

    if config.output.save_day_summary {
        let path = config.output.results_path("day_wise_summary.csv");
        report::write_csv(&path, &summaries)?;
        info!("Day-wise summary saved to {}", path.display());
    }

    let summary = RunSummary::new(&summaries, &run, config.engine.inventory_limit);
    println!("\n{}", summary);

    println!("\nPER-STRATEGY");
    for (slot, stats) in run.slots.iter().enumerate() {
        println!(
            "  [{}] {:<26} closed: {:>4}  wins: {:>4}  losses: {:>4}  realized: {:>12.2}  ask: {}",
            slot,
            stats.name,
            stats.closed_trades,
            stats.wins,
            stats.losses,
            stats.realized_pnl.to_f64(),
            run.ask_limits.get(slot).copied().unwrap_or_default()
        );
    }

    info!("Backtest completed successfully");

    Ok(())
}
