//! Take-profit / stop-loss exit rule shared by the built-in strategies

use crate::Tick;

/// Tracks the entry price handed in by the engine and the last seen tick,
/// and answers exit checks by absolute distance from entry.
#[derive(Debug, Clone, Default)]
pub struct TargetStop {
    tp: f64,
    sl: f64,
    entry_price: f64,
    last: Option<Tick>,
}

impl TargetStop {
    pub fn new(tp: f64, sl: f64) -> Self {
        TargetStop {
            tp,
            sl,
            ..Default::default()
        }
    }

    pub fn observe(&mut self, tick: &Tick) {
        self.last = Some(*tick);
    }

    /// Time of day of the last tick, in seconds
    pub fn seconds(&self) -> Option<u32> {
        self.last.map(|t| t.seconds())
    }

    pub fn has_entry(&self) -> bool {
        self.entry_price != 0.0
    }

    pub fn set_entry(&mut self, position: i64, entry_price: f64) {
        self.entry_price = if position != 0 { entry_price } else { 0.0 };
    }

    pub fn clear_entry(&mut self) {
        self.entry_price = 0.0;
    }

    pub fn long_exit(&self) -> bool {
        self.exit_on(|price, entry| price - entry)
    }

    pub fn short_exit(&self) -> bool {
        self.exit_on(|price, entry| entry - price)
    }

    fn exit_on(&self, pnl: impl Fn(f64, f64) -> f64) -> bool {
        if !self.has_entry() {
            return false;
        }
        match self.last {
            Some(tick) => {
                let gain = pnl(tick.price, self.entry_price);
                gain >= self.tp || gain <= -self.sl
            }
            None => false,
        }
    }
}
