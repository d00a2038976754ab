//! Shared position ledger
//!
//! Holds the per-strategy target positions that together form one
//! inventory-capped book, and nets each tick's requests into it.
//!
//! Two rules keep the book consistent within a single netting pass:
//! - **square-off**: a request opposing a slot's open position flattens it
//!   instead of flipping it;
//! - **direction lock**: the first slot that expresses a direction fixes it
//!   for the rest of the pass; later flat slots may only open in that
//!   direction, later slots holding the opposite direction are flattened.
//!
//! Slot order is priority. It picks the locked direction and, when the cap
//! binds, which slots are starved (first come, first served).

use crate::error::{ConfigError, ConfigResult};
use crate::{Qty, Signal};

/// Result of one netting pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NettingOutcome {
    /// sum(new positions) - sum(old positions): what must be executed
    pub net_delta: Qty,
    /// Slots whose position was forced flat by square-off or direction lock
    pub closed: Vec<bool>,
}

/// Inventory-capped book of per-strategy positions
#[derive(Debug, Clone)]
pub struct PositionLedger {
    positions: Vec<Qty>,
    inventory_limit: Qty,
}

impl PositionLedger {
    pub fn new(num_slots: usize, inventory_limit: u64) -> ConfigResult<Self> {
        if inventory_limit == 0 {
            return Err(ConfigError::NonPositive {
                field: "inventory_limit",
            });
        }
        Ok(PositionLedger {
            positions: vec![0; num_slots],
            inventory_limit: Qty::try_from(inventory_limit).unwrap_or(Qty::MAX),
        })
    }

    pub fn positions(&self) -> &[Qty] {
        &self.positions
    }

    pub fn position(&self, slot: usize) -> Qty {
        self.positions[slot]
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn inventory_limit(&self) -> Qty {
        self.inventory_limit
    }

    /// Net aggregate book (signed sum of slot positions)
    pub fn net_position(&self) -> Qty {
        self.positions.iter().sum()
    }

    /// Gross aggregate book (sum of absolute slot positions)
    pub fn gross_position(&self) -> Qty {
        self.positions.iter().map(|p| p.abs()).sum()
    }

    /// Clamp positions so that their absolute sum fits `inventory_limit`.
    ///
    /// Walks in slot order. The first entry that would overflow gets the
    /// remaining headroom (keeping its sign); from then on headroom is zero
    /// and every later nonzero entry clamps to zero.
    pub fn normalize(positions: &mut [Qty], inventory_limit: Qty) {
        let mut used: Qty = 0;
        for value in positions.iter_mut() {
            if used + value.abs() > inventory_limit {
                let sign = if *value < 0 { -1 } else { 1 };
                *value = (inventory_limit - used) * sign;
                used = inventory_limit;
            } else {
                used += value.abs();
            }
        }
    }

    /// Net one tick of signals against the current book.
    ///
    /// `ask_limits[i]` is the size slot `i` may request; the signed request
    /// is `ask_limits[i] * signals[i]`. Slots beyond the shorter of the two
    /// inputs are treated as flat requests.
    pub fn update_position(&mut self, signals: &[Signal], ask_limits: &[u64]) -> NettingOutcome {
        let n = self.positions.len();
        let previous: Qty = self.net_position();
        let mut positions = self.positions.clone();
        let mut closed = vec![false; n];
        let mut direction: Qty = 0;

        for i in 0..n {
            let sign = signals.get(i).copied().unwrap_or_default().sign();
            let size = ask_limits
                .get(i)
                .map(|&a| Qty::try_from(a).unwrap_or(Qty::MAX))
                .unwrap_or(0);
            let ask = size * sign;
            let position = positions[i];

            if ask.signum() * position.signum() < 0 {
                // square-off
                positions[i] = 0;
                closed[i] = true;
            } else if direction != 0 {
                if ask.signum() == direction && position == 0 {
                    positions[i] = ask;
                } else if position.signum() == -direction {
                    positions[i] = 0;
                    closed[i] = true;
                }
            } else {
                direction = if ask != 0 {
                    ask.signum()
                } else {
                    position.signum()
                };
                positions[i] = position + ask;
            }
        }

        Self::normalize(&mut positions, self.inventory_limit);
        self.positions = positions;

        NettingOutcome {
            net_delta: self.net_position() - previous,
            closed,
        }
    }

    /// Flatten every slot
    pub fn reset(&mut self) {
        self.positions.iter_mut().for_each(|p| *p = 0);
    }

    #[cfg(test)]
    pub(crate) fn with_positions(positions: Vec<Qty>, inventory_limit: Qty) -> Self {
        PositionLedger {
            positions,
            inventory_limit,
        }
    }
}
