use crate::strategies::exits::TargetStop;
use crate::strategies::Strategy;
use crate::{Qty, Tick};

const HALF_HOUR: u32 = 1800;
const HOUR: u32 = 3600;

pub struct HalfHourShortStrategy {
    exits: TargetStop,
}

impl HalfHourShortStrategy {
    pub fn new(tp: f64, sl: f64) -> Self {
        HalfHourShortStrategy {
            exits: TargetStop::new(tp, sl),
        }
    }
}

impl Strategy for HalfHourShortStrategy {
    fn name(&self) -> &'static str {
        super::NAME
    }

    fn update_indicators(&mut self, tick: &Tick) {
        self.exits.observe(tick);
    }

    fn check_long_entry(&mut self) -> bool {
        false
    }

    fn check_short_entry(&mut self) -> bool {
        let on_mark = matches!(
            self.exits.seconds(),
            Some(s) if s % HALF_HOUR == 0 && s % HOUR != 0
        );
        on_mark && !self.exits.has_entry()
    }

    fn check_long_exit(&mut self) -> bool {
        false
    }

    fn check_short_exit(&mut self) -> bool {
        self.exits.short_exit()
    }

    fn update_position(&mut self, position: Qty, entry_price: f64) {
        self.exits.set_entry(position, entry_price);
    }

    fn reset(&mut self) {
        self.exits.clear_entry();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enters_only_on_odd_half_hours() {
        let mut s = HalfHourShortStrategy::new(1.0, 1.0);
        s.update_indicators(&Tick::at_seconds(5400, 100.0));
        assert!(s.check_short_entry());
        s.update_indicators(&Tick::at_seconds(7200, 100.0));
        assert!(!s.check_short_entry());
        assert!(!s.check_long_entry());
    }

    #[test]
    fn test_no_entry_while_holding() {
        let mut s = HalfHourShortStrategy::new(1.0, 1.0);
        s.update_position(-10, 100.0);
        s.update_indicators(&Tick::at_seconds(1800, 100.0));
        assert!(!s.check_short_entry());
    }

    #[test]
    fn test_short_stop_loss() {
        let mut s = HalfHourShortStrategy::new(5.0, 1.0);
        s.update_position(-10, 100.0);
        s.update_indicators(&Tick::at_seconds(1801, 101.0));
        assert!(s.check_short_exit());
    }
}
