//! Strategy fleet netting - main entry point
//!
//! This binary provides two subcommands:
//! - backtest: Replay day files through the netting engine
//! - strategies: List the registered strategies

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod commands;

#[derive(Parser, Debug)]
#[command(name = "fleet-netting")]
#[command(about = "Strategy fleet netting with AIMD ask sizing and cooldown-gated admission", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run a tick-by-tick backtest over the configured days
    Backtest {
        /// Path to configuration file
        #[arg(short, long, default_value = "configs/default.json")]
        config: String,

        /// Tick data directory (overrides config file)
        #[arg(short, long)]
        data_dir: Option<String>,

        /// Inventory limit (overrides config file)
        #[arg(long)]
        inventory_limit: Option<u64>,

        /// Trade limit per release (overrides config file)
        #[arg(long)]
        trade_limit: Option<u64>,

        /// Initial equity
        #[arg(long)]
        capital: Option<f64>,
    },

    /// List available strategies
    Strategies,
}

fn setup_logging(verbose: bool, command_name: &str) -> Result<()> {
    // Create logs directory
    std::fs::create_dir_all("logs")?;

    // Create log file with naming pattern: {command}_{date}.log
    let log_filename = format!(
        "{}_{}.log",
        command_name,
        chrono::Local::now().format("%Y-%m-%d_%H-%M-%S")
    );
    let log_path = PathBuf::from("logs").join(&log_filename);

    let level = if verbose { "debug" } else { "info" };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    // File appender
    let file_appender = tracing_appender::rolling::never("logs", &log_filename);

    let console_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_line_number(true)
        .with_file(true)
        .with_ansi(true);

    // File layer - same format but without ANSI colors
    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(file_appender)
        .with_target(true)
        .with_line_number(true)
        .with_file(true)
        .with_ansi(false);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .init();

    info!("Logging initialized");
    info!("Log file: {}", log_path.display());

    Ok(())
}

fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    match cli.command {
        Commands::Backtest {
            config,
            data_dir,
            inventory_limit,
            trade_limit,
            capital,
        } => {
            setup_logging(cli.verbose, "backtest")?;
            commands::backtest::run(config, data_dir, inventory_limit, trade_limit, capital)
        }

        Commands::Strategies => commands::strategies::run(),
    }
}
