//! Engine error types

use thiserror::Error;

/// Construction-time configuration faults.
///
/// Every engine component validates its parameters when it is built, so a
/// run either starts with a consistent configuration or not at all.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("{field} must be positive")]
    NonPositive { field: &'static str },

    #[error("{field} must be finite and >= 0, got {value}")]
    Negative { field: &'static str, value: f64 },

    #[error("aimd.penalty_mult must lie in (0, 1], got {0}")]
    PenaltyOutOfRange(f64),

    #[error("at least one strategy must be configured")]
    NoStrategies,

    #[error("unknown strategy '{name}'. Available: {available}")]
    UnknownStrategy { name: String, available: String },
}

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;
