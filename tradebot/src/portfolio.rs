//! # portfolio — Virtual cash + share account
//!
//! Applies one signal at one price, one share at a time, charging a flat
//! fee per executed order.
//!
//! ## Rules
//! * **Buy** executes when `balance > price`. The fee is *not* part of that
//!   check, so a buy with `price < balance <= price + fee` goes through and
//!   leaves the balance negative.
//! * **Sell** executes when at least one share is held.
//! * **Hold**, or a buy/sell whose condition fails, changes nothing.

use tracing::{debug, info};

use crate::models::{Signal, TradeAction, TradeRecord};

#[derive(Debug, Clone)]
pub struct PortfolioLedger {
    balance:  f64,
    holdings: u32,
    fee:      f64,
}

impl PortfolioLedger {
    pub fn new(starting_balance: f64, fee: f64) -> Self {
        Self {
            balance: starting_balance,
            holdings: 0,
            fee,
        }
    }

    pub fn balance(&self) -> f64 {
        self.balance
    }

    pub fn holdings(&self) -> u32 {
        self.holdings
    }

    /// Execute `signal` at `price`. Returns the trade if one happened.
    pub fn apply(&mut self, signal: Signal, price: f64) -> Option<TradeRecord> {
        match signal {
            Signal::Buy if self.balance > price => {
                self.balance -= price + self.fee;
                self.holdings += 1;
                Some(self.executed(TradeAction::Buy, price))
            }
            Signal::Sell if self.holdings > 0 => {
                self.balance += price - self.fee;
                self.holdings -= 1;
                Some(self.executed(TradeAction::Sell, price))
            }
            Signal::Hold => {
                debug!(price, balance = self.balance, holdings = self.holdings, "Hold");
                None
            }
            Signal::Buy | Signal::Sell => {
                info!(
                    action   = %signal,
                    price,
                    balance  = self.balance,
                    holdings = self.holdings,
                    "No trade executed — precondition not met"
                );
                None
            }
        }
    }

    fn executed(&self, action: TradeAction, price: f64) -> TradeRecord {
        info!(
            %action,
            price,
            balance  = self.balance,
            holdings = self.holdings,
            "💸 Trade executed"
        );
        TradeRecord::new(action, price, self.balance, self.holdings)
    }
}
