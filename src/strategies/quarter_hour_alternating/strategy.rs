use crate::strategies::exits::TargetStop;
use crate::strategies::Strategy;
use crate::{Qty, Tick};

const QUARTER_HOUR: u32 = 900;

pub struct QuarterHourAlternatingStrategy {
    exits: TargetStop,
    /// Entries fired so far today; parity picks the next direction
    entries: u64,
}

impl QuarterHourAlternatingStrategy {
    pub fn new(tp: f64, sl: f64) -> Self {
        QuarterHourAlternatingStrategy {
            exits: TargetStop::new(tp, sl),
            entries: 0,
        }
    }

    fn on_mark(&self) -> bool {
        matches!(self.exits.seconds(), Some(s) if s % QUARTER_HOUR == 0)
    }

    /// Fire an entry if it is this parity's turn
    fn take_entry(&mut self, parity: u64) -> bool {
        if self.on_mark() && self.entries % 2 == parity {
            self.entries += 1;
            return true;
        }
        false
    }
}

impl Strategy for QuarterHourAlternatingStrategy {
    fn name(&self) -> &'static str {
        super::NAME
    }

    fn update_indicators(&mut self, tick: &Tick) {
        self.exits.observe(tick);
    }

    fn check_long_entry(&mut self) -> bool {
        self.take_entry(0)
    }

    fn check_short_entry(&mut self) -> bool {
        self.take_entry(1)
    }

    fn check_long_exit(&mut self) -> bool {
        self.exits.long_exit()
    }

    fn check_short_exit(&mut self) -> bool {
        self.exits.short_exit()
    }

    fn update_position(&mut self, position: Qty, entry_price: f64) {
        self.exits.set_entry(position, entry_price);
    }

    fn reset(&mut self) {
        self.exits.clear_entry();
        self.entries = 0;
    }
}
