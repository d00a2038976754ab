//! Cash and inventory book for simulated fills

use crate::{Money, Qty};

/// What a fill cost
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settlement {
    pub fee: Money,
    pub notional: Money,
}

/// Cash, executed inventory and cumulative fees
#[derive(Debug, Clone)]
pub struct Account {
    cash: Money,
    inventory: Qty,
    total_fees: Money,
    transaction_cost: Money,
}

impl Account {
    pub fn new(initial_cash: f64, transaction_cost: f64) -> Self {
        Account {
            cash: Money::from_f64(initial_cash),
            inventory: 0,
            total_fees: Money::ZERO,
            transaction_cost: Money::from_f64(transaction_cost),
        }
    }

    pub fn cash(&self) -> Money {
        self.cash
    }

    pub fn inventory(&self) -> Qty {
        self.inventory
    }

    pub fn total_fees(&self) -> Money {
        self.total_fees
    }

    pub fn transaction_cost(&self) -> Money {
        self.transaction_cost
    }

    /// Fee charged on a fill of `quantity` at `price`
    pub fn fee_for(&self, quantity: Qty, price: Money) -> Money {
        self.transaction_cost * price * Money::from_i64(quantity.abs())
    }

    /// Book a fill: cash pays notional plus fee, inventory moves by `quantity`
    pub fn settle(&mut self, quantity: Qty, price: Money) -> Settlement {
        let notional = Money::from_i64(quantity) * price;
        let fee = self.fee_for(quantity, price);
        self.cash -= notional + fee;
        self.inventory += quantity;
        self.total_fees += fee;
        Settlement { fee, notional }
    }

    /// Cash plus executed inventory marked at `price`
    pub fn equity(&self, price: Money) -> Money {
        self.cash + Money::from_i64(self.inventory) * price
    }
}
