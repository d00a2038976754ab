//! Core data types used across the netting engine

use chrono::{NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

/// Signed order/position quantity (units of the traded instrument)
pub type Qty = i64;

/// Day identifier supplied by the tick source
pub type DayId = u32;

/// Seconds since midnight for a wall-clock time
pub fn seconds_of_day(time: NaiveTime) -> u32 {
    time.num_seconds_from_midnight()
}

/// Wall-clock time for a seconds-since-midnight value (wraps at 24h)
pub fn time_of_seconds(seconds: u32) -> NaiveTime {
    NaiveTime::from_num_seconds_from_midnight_opt(seconds % 86_400, 0).unwrap_or(NaiveTime::MIN)
}

/// One market tick: a reference price at a time of day.
///
/// Ticks arrive grouped by day and in nondecreasing time order within a day.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tick {
    #[serde(rename = "Time")]
    pub time: NaiveTime,
    #[serde(rename = "Price")]
    pub price: f64,
}

impl Tick {
    pub fn new(time: NaiveTime, price: f64) -> Self {
        Tick { time, price }
    }

    /// Build a tick from seconds since midnight (handy for tests and generators)
    pub fn at_seconds(seconds: u32, price: f64) -> Self {
        Tick {
            time: time_of_seconds(seconds),
            price,
        }
    }

    /// Time of day in whole seconds
    pub fn seconds(&self) -> u32 {
        seconds_of_day(self.time)
    }
}

/// Entry/exit signal produced for one strategy slot on one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Signal {
    Long,
    Short,
    #[default]
    Flat,
}

impl Signal {
    /// +1 for long, -1 for short, 0 for flat
    pub fn sign(self) -> Qty {
        match self {
            Signal::Long => 1,
            Signal::Short => -1,
            Signal::Flat => 0,
        }
    }
}

/// Trade direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    /// Side of a signed quantity (zero is treated as a buy)
    pub fn of(quantity: Qty) -> Self {
        if quantity < 0 {
            Side::Sell
        } else {
            Side::Buy
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Buy => write!(f, "Buy"),
            Side::Sell => write!(f, "Sell"),
        }
    }
}

/// A simulated fill produced by one admission-controlled backlog release
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fill {
    #[serde(rename = "Time")]
    pub time: NaiveTime,
    #[serde(rename = "Price")]
    pub price: Money,
    /// Unsigned size; direction is carried by `side`
    #[serde(rename = "Quantity")]
    pub quantity: u64,
    #[serde(rename = "Side")]
    pub side: Side,
    /// Aggregate strategy book (sum of slot positions) at the time of the fill
    #[serde(rename = "Inventory")]
    pub inventory: Qty,
    #[serde(rename = "Transaction Cost")]
    pub fee: Money,
    #[serde(rename = "Day")]
    pub day: DayId,
}

impl Fill {
    /// Signed quantity (+ for buys, - for sells)
    pub fn signed_quantity(&self) -> Qty {
        match self.side {
            Side::Buy => self.quantity as Qty,
            Side::Sell => -(self.quantity as Qty),
        }
    }
}

/// Periodic portfolio snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(rename = "Time")]
    pub time: NaiveTime,
    #[serde(rename = "Day")]
    pub day: DayId,
    #[serde(rename = "Price")]
    pub price: f64,
    /// cash + executed inventory x price
    #[serde(rename = "Equity")]
    pub equity: Money,
    #[serde(rename = "Cash")]
    pub cash: Money,
    /// Aggregate strategy book (target, not necessarily executed yet)
    #[serde(rename = "Inventory")]
    pub inventory: Qty,
    /// Inventory actually filled through the admission controller
    #[serde(rename = "Executed")]
    pub executed_inventory: Qty,
}

// ============================================================================
// Money Type - Precise Decimal Arithmetic for Monetary Values
// ============================================================================

use rust_decimal::Decimal;
use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};

/// Money type for precise decimal arithmetic in monetary calculations.
///
/// Wraps `rust_decimal::Decimal` so cash, fees and realized PnL replay
/// identically for identical tick streams.
///
/// # Example
/// ```
/// use fleet_netting::Money;
/// let price = Money::from_f64(100.50);
/// let qty = Money::from_i64(2);
/// let total = price * qty;
/// assert_eq!(total.to_f64(), 201.0);
/// ```
#[derive(Debug, Clone, Copy, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(#[serde(with = "rust_decimal::serde::str")] Decimal);

impl Money {
    /// Zero value
    pub const ZERO: Money = Money(Decimal::ZERO);

    /// One value
    pub const ONE: Money = Money(Decimal::ONE);

    /// Create from f64
    /// Note: This conversion may lose precision for values with many decimal places
    pub fn from_f64(value: f64) -> Self {
        Money(Decimal::try_from(value).unwrap_or_else(|_| {
            // Fallback for extreme values (NaN, Infinity)
            if value.is_nan() || value.is_infinite() {
                Decimal::ZERO
            } else {
                Decimal::from_f64_retain(value).unwrap_or(Decimal::ZERO)
            }
        }))
    }

    /// Convert to f64 (for reporting and statistics)
    pub fn to_f64(self) -> f64 {
        use rust_decimal::prelude::ToPrimitive;
        self.0.to_f64().unwrap_or(0.0)
    }

    /// Create from i64 (for whole number values such as quantities)
    pub fn from_i64(value: i64) -> Self {
        Money(Decimal::from(value))
    }

    /// Get absolute value
    pub fn abs(self) -> Self {
        Money(self.0.abs())
    }

    /// Check if value is zero
    pub fn is_zero(self) -> bool {
        self.0.is_zero()
    }

    /// Check if value is strictly positive
    pub fn is_positive(self) -> bool {
        self.0.is_sign_positive() && !self.0.is_zero()
    }

    /// Check if value is strictly negative
    pub fn is_negative(self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }

    /// Round to specified decimal places
    pub fn round_dp(self, dp: u32) -> Self {
        Money(self.0.round_dp(dp))
    }

    /// Get the underlying Decimal
    pub fn inner(self) -> Decimal {
        self.0
    }
}

impl Default for Money {
    fn default() -> Self {
        Self::ZERO
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl PartialEq for Money {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl PartialOrd for Money {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Money {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.cmp(&other.0)
    }
}

impl Add for Money {
    type Output = Self;
    fn add(self, rhs: Self) -> Self::Output {
        Money(self.0 + rhs.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl Sub for Money {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self::Output {
        Money(self.0 - rhs.0)
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, rhs: Self) {
        self.0 -= rhs.0;
    }
}

impl Mul for Money {
    type Output = Self;
    fn mul(self, rhs: Self) -> Self::Output {
        Money(self.0 * rhs.0)
    }
}

impl Neg for Money {
    type Output = Self;
    fn neg(self) -> Self::Output {
        Money(-self.0)
    }
}

impl From<f64> for Money {
    fn from(value: f64) -> Self {
        Money::from_f64(value)
    }
}

impl From<i64> for Money {
    fn from(value: i64) -> Self {
        Money::from_i64(value)
    }
}

impl From<Decimal> for Money {
    fn from(value: Decimal) -> Self {
        Money(value)
    }
}

impl std::iter::Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Money::ZERO, |acc, x| acc + x)
    }
}

impl<'a> std::iter::Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Self>>(iter: I) -> Self {
        iter.fold(Money::ZERO, |acc, x| acc + *x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_money_precision() {
        // 0.1 + 0.2 != 0.3 in f64
        let a = Money::from_f64(0.1);
        let b = Money::from_f64(0.2);
        let c = Money::from_f64(0.3);
        assert_eq!(a + b, c);
    }

    #[test]
    fn test_money_sign_checks() {
        assert!(Money::from(dec!(1.5)).is_positive());
        assert!(Money::from(dec!(-1.5)).is_negative());
        assert!(!Money::ZERO.is_positive());
        assert!(!Money::ZERO.is_negative());
        assert!(!(-Money::ZERO).is_negative());
    }

    #[test]
    fn test_money_serde() {
        let money = Money::from_f64(123.456);
        let json = serde_json::to_string(&money).unwrap();
        assert_eq!(json, "\"123.456\"");
        let parsed: Money = serde_json::from_str(&json).unwrap();
        assert_eq!(money, parsed);
    }

    #[test]
    fn test_seconds_roundtrip() {
        let t = NaiveTime::from_hms_opt(9, 15, 30).unwrap();
        assert_eq!(seconds_of_day(t), 9 * 3600 + 15 * 60 + 30);
        assert_eq!(time_of_seconds(seconds_of_day(t)), t);
        assert_eq!(Tick::at_seconds(3600, 10.0).seconds(), 3600);
    }

    #[test]
    fn test_signal_and_side() {
        assert_eq!(Signal::Long.sign(), 1);
        assert_eq!(Signal::Short.sign(), -1);
        assert_eq!(Signal::Flat.sign(), 0);
        assert_eq!(Side::of(-3), Side::Sell);
        assert_eq!(Side::of(3), Side::Buy);
    }
}
