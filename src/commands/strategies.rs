//! Strategy listing command

use anyhow::Result;
use fleet_netting::StrategyRegistry;

pub fn run() -> Result<()> {
    let registry = StrategyRegistry::with_builtins();
    println!("Available strategies:");
    for name in registry.available() {
        println!("  {}", name);
    }
    Ok(())
}
