pub mod backtest;
pub mod strategies;
