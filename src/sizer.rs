//! AIMD ask sizing
//!
//! Each strategy slot carries an ask limit: the largest size it may request
//! on the next tick. Profitable closes grow the limit additively, losing
//! closes shrink it multiplicatively with a floor of one unit.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::config::AimdConfig;
use crate::error::ConfigResult;
use crate::Money;

#[derive(Debug, Clone)]
pub struct AskSizer {
    asks: Vec<u64>,
    reward_add: u64,
    penalty_mult: Decimal,
}

impl AskSizer {
    pub fn new(num_slots: usize, config: &AimdConfig) -> ConfigResult<Self> {
        config.validate()?;
        Ok(AskSizer {
            asks: vec![config.initial_ask; num_slots],
            reward_add: config.reward_add,
            penalty_mult: Money::from_f64(config.penalty_mult).inner(),
        })
    }

    /// Current ask limits, in slot order
    pub fn asks(&self) -> &[u64] {
        &self.asks
    }

    /// Apply one round of feedback.
    ///
    /// Only slots flagged in `closed` with a nonzero realized PnL move.
    pub fn update(&mut self, realized_pnl: &[Money], closed: &[bool]) -> &[u64] {
        for (i, ask) in self.asks.iter_mut().enumerate() {
            let pnl = realized_pnl.get(i).copied().unwrap_or_default();
            if !closed.get(i).copied().unwrap_or(false) || pnl.is_zero() {
                continue;
            }
            if pnl.is_positive() {
                *ask = ask.saturating_add(self.reward_add);
            } else {
                let scaled = (Decimal::from(*ask) * self.penalty_mult)
                    .floor()
                    .to_u64()
                    .unwrap_or(0);
                *ask = scaled.max(1);
            }
        }
        &self.asks
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn sizer(initial_ask: u64) -> AskSizer {
        let config = AimdConfig {
            initial_ask,
            reward_add: 33,
            penalty_mult: 0.666,
        };
        AskSizer::new(3, &config).unwrap()
    }

    #[test]
    fn test_profitable_close_adds_reward() {
        let mut s = sizer(10);
        s.update(&[Money::from(dec!(5)), Money::ZERO, Money::ZERO], &[true, false, false]);
        assert_eq!(s.asks(), &[43, 10, 10]);
    }

    #[test]
    fn test_losing_close_multiplies_and_floors() {
        let mut s = sizer(10);
        s.update(&[Money::from(dec!(-1)), Money::ZERO, Money::ZERO], &[true, false, false]);
        // floor(10 * 0.666) = 6
        assert_eq!(s.asks()[0], 6);
    }

    #[test]
    fn test_floor_of_one_keeps_slot_alive() {
        let mut s = sizer(1);
        let loss = Money::from(dec!(-3));
        s.update(&[loss, loss, loss], &[true, true, true]);
        assert_eq!(s.asks(), &[1, 1, 1]);
    }

    #[test]
    fn test_unflagged_or_zero_pnl_untouched() {
        let mut s = sizer(10);
        s.update(
            &[Money::from(dec!(7)), Money::ZERO, Money::from(dec!(-7))],
            &[false, true, false],
        );
        assert_eq!(s.asks(), &[10, 10, 10]);
    }

    #[test]
    fn test_invalid_penalty_rejected() {
        let config = AimdConfig {
            initial_ask: 10,
            reward_add: 1,
            penalty_mult: 0.0,
        };
        assert!(AskSizer::new(1, &config).is_err());
    }
}
