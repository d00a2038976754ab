//! Tick data loading
//!
//! Each trading day lives in its own CSV file (`day{n}.csv`) with at least
//! a `Time` column (`HH:MM:SS`) and a `Price` column. Extra columns are
//! ignored.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use crate::{DayId, Tick};

// =============================================================================
// CSV Data Loading
// =============================================================================

/// Path of the tick file for `day` inside `dir`
pub fn day_path(dir: impl AsRef<Path>, day: DayId) -> PathBuf {
    dir.as_ref().join(format!("day{}.csv", day))
}

/// Load one day of ticks from a CSV file
pub fn load_day(path: impl AsRef<Path>) -> Result<Vec<Tick>> {
    let path = path.as_ref();
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("Failed to open tick file {}", path.display()))?;

    let mut ticks = Vec::new();
    for (row_idx, result) in reader.deserialize::<Tick>().enumerate() {
        let tick = result.with_context(|| {
            format!("Failed to parse row {} of {}", row_idx + 1, path.display())
        })?;
        ticks.push(tick);
    }
    Ok(ticks)
}

/// Load a day if its file exists; `Ok(None)` means the day is missing
pub fn try_load_day(dir: impl AsRef<Path>, day: DayId) -> Result<Option<Vec<Tick>>> {
    let path = day_path(dir, day);
    if !path.exists() {
        return Ok(None);
    }
    load_day(&path).map(Some)
}

// =============================================================================
// Data Validation
// =============================================================================

/// Validate tick data for consistency
pub fn validate_ticks(ticks: &[Tick]) -> ValidationResult {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    if ticks.is_empty() {
        warnings.push("No ticks provided".to_string());
        return ValidationResult { errors, warnings };
    }

    for (i, tick) in ticks.iter().enumerate() {
        if !tick.price.is_finite() || tick.price <= 0.0 {
            errors.push(format!("Tick {}: invalid price ({})", i, tick.price));
        }
        if i > 0 && tick.time < ticks[i - 1].time {
            warnings.push(format!(
                "Tick {}: {} precedes previous tick {}",
                i,
                tick.time,
                ticks[i - 1].time
            ));
        }
    }

    ValidationResult { errors, warnings }
}

/// Result of data validation
#[derive(Debug)]
pub struct ValidationResult {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}
