//! # models — Wire tick, trading signals and trade records
//!
//! `PriceTick` mirrors the simulator's frame (`{"price": 97.41}`).
//! `TradeRecord` is the immutable receipt of one executed order.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

// ─── PriceTick ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceTick {
    pub price: f64,
}

#[derive(Debug, Error)]
pub enum DecodeError {
    /// Not JSON, no `price` field, or `price` is not a number.
    #[error("malformed tick payload: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("tick price must be finite and positive, got {0}")]
    InvalidPrice(f64),
}

impl PriceTick {
    /// Parse one text frame. No range check beyond "finite and positive".
    pub fn decode(frame: &str) -> Result<Self, DecodeError> {
        let tick: PriceTick = serde_json::from_str(frame)?;
        if !tick.price.is_finite() || tick.price <= 0.0 {
            return Err(DecodeError::InvalidPrice(tick.price));
        }
        Ok(tick)
    }
}

// ─── Signal ───────────────────────────────────────────────────────────────────

/// A strategy's decision for one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    Buy,
    Sell,
    Hold,
}

impl Signal {
    /// Map the sign of `price - reference` onto a signal; equality holds.
    pub fn from_comparison(price: f64, reference: f64) -> Self {
        if price > reference {
            Signal::Buy
        } else if price < reference {
            Signal::Sell
        } else {
            Signal::Hold
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Signal::Buy  => write!(f, "BUY"),
            Signal::Sell => write!(f, "SELL"),
            Signal::Hold => write!(f, "HOLD"),
        }
    }
}

// ─── TradeRecord ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TradeAction {
    Buy,
    Sell,
}

impl fmt::Display for TradeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TradeAction::Buy  => write!(f, "BUY"),
            TradeAction::Sell => write!(f, "SELL"),
        }
    }
}

/// One executed order and the portfolio it left behind.
#[derive(Debug, Clone, PartialEq)]
pub struct TradeRecord {
    pub trade_id:       Uuid,
    pub action:         TradeAction,
    pub price:          f64,
    pub balance_after:  f64,
    pub holdings_after: u32,
    pub executed_at:    DateTime<Utc>,
}

impl TradeRecord {
    pub fn new(action: TradeAction, price: f64, balance_after: f64, holdings_after: u32) -> Self {
        Self {
            trade_id: Uuid::new_v4(),
            action,
            price,
            balance_after,
            holdings_after,
            executed_at: Utc::now(),
        }
    }

    /// The trade-log line, without the trailing newline.
    pub fn ledger_line(&self) -> String {
        format!(
            "Action: {} | Price: {:.2} | Balance: {:.2} | Stocks held: {}",
            self.action, self.price, self.balance_after, self.holdings_after
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_accepts_integer_and_float_prices() {
        assert_eq!(PriceTick::decode(r#"{"price": 100}"#).unwrap().price, 100.0);
        assert_eq!(PriceTick::decode(r#"{"price":87.5}"#).unwrap().price, 87.5);
    }

    #[test]
    fn test_decode_ignores_range_and_extra_fields() {
        let tick = PriceTick::decode(r#"{"price": 100000.0, "symbol": "X"}"#).unwrap();
        assert_eq!(tick.price, 100000.0);
    }

    #[test]
    fn test_decode_rejects_malformed_payloads() {
        for frame in [
            r#"{"price": "abc"}"#,
            r#"{"cost": 10.0}"#,
            r#"{"price": null}"#,
            "not json",
            "",
        ] {
            assert!(
                matches!(PriceTick::decode(frame), Err(DecodeError::Malformed(_))),
                "{frame:?} should be malformed"
            );
        }
    }

    #[test]
    fn test_decode_rejects_non_positive_price() {
        assert!(matches!(
            PriceTick::decode(r#"{"price": 0}"#),
            Err(DecodeError::InvalidPrice(p)) if p == 0.0
        ));
        assert!(matches!(
            PriceTick::decode(r#"{"price": -3.5}"#),
            Err(DecodeError::InvalidPrice(_))
        ));
    }

    #[test]
    fn test_wire_roundtrip_preserves_price() {
        let tick = PriceTick { price: 123.456789 };
        let frame = serde_json::to_string(&tick).unwrap();
        let back = PriceTick::decode(&frame).unwrap();
        assert!((back.price - tick.price).abs() < 1e-9);
    }

    #[test]
    fn test_signal_from_comparison() {
        assert_eq!(Signal::from_comparison(101.0, 100.0), Signal::Buy);
        assert_eq!(Signal::from_comparison(99.0, 100.0), Signal::Sell);
        assert_eq!(Signal::from_comparison(100.0, 100.0), Signal::Hold);
    }

    #[test]
    fn test_ledger_line_format() {
        let record = TradeRecord::new(TradeAction::Buy, 100.0, 9895.0, 1);
        assert_eq!(
            record.ledger_line(),
            "Action: BUY | Price: 100.00 | Balance: 9895.00 | Stocks held: 1"
        );

        let record = TradeRecord::new(TradeAction::Sell, 120.456, -3.5, 0);
        assert_eq!(
            record.ledger_line(),
            "Action: SELL | Price: 120.46 | Balance: -3.50 | Stocks held: 0"
        );
    }
}
