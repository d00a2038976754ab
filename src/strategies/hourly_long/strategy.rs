use crate::strategies::exits::TargetStop;
use crate::strategies::Strategy;
use crate::{Qty, Tick};

const HOUR: u32 = 3600;

pub struct HourlyLongStrategy {
    exits: TargetStop,
}

impl HourlyLongStrategy {
    pub fn new(tp: f64, sl: f64) -> Self {
        HourlyLongStrategy {
            exits: TargetStop::new(tp, sl),
        }
    }
}

impl Strategy for HourlyLongStrategy {
    fn name(&self) -> &'static str {
        super::NAME
    }

    fn update_indicators(&mut self, tick: &Tick) {
        self.exits.observe(tick);
    }

    fn check_long_entry(&mut self) -> bool {
        matches!(self.exits.seconds(), Some(s) if s % HOUR == 0 && s > HOUR)
    }

    fn check_short_entry(&mut self) -> bool {
        false
    }

    fn check_long_exit(&mut self) -> bool {
        self.exits.long_exit()
    }

    fn check_short_exit(&mut self) -> bool {
        false
    }

    fn update_position(&mut self, position: Qty, entry_price: f64) {
        self.exits.set_entry(position, entry_price);
    }

    fn reset(&mut self) {
        self.exits.clear_entry();
    }
}
