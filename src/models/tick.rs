//! # models::tick
//!
//! Defines [`PriceTick`], the market pulse the simulator pushes to its
//! subscriber once per timer interval, and [`PriceRange`], the band every
//! generated price must fall into.
//!
//! The wire form is a single JSON text frame: `{"price": 101.37}`.

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ─── PriceTick ────────────────────────────────────────────────────────────────

/// One synthetic price observation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceTick {
    pub price: f64,
}

impl PriceTick {
    pub fn new(price: f64) -> Self {
        Self { price }
    }

    /// Serialise into the JSON text frame sent to the subscriber.
    #[inline]
    pub fn encode(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

// ─── PriceRange ───────────────────────────────────────────────────────────────

#[derive(Debug, Error, PartialEq)]
pub enum RangeError {
    #[error("price bounds must be finite (low={low}, high={high})")]
    NotFinite { low: f64, high: f64 },

    #[error("price low bound {low} must be below high bound {high}")]
    Inverted { low: f64, high: f64 },
}

/// Closed band `[low, high]` of generated prices.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceRange {
    low: f64,
    high: f64,
}

impl PriceRange {
    pub fn new(low: f64, high: f64) -> Result<Self, RangeError> {
        if !low.is_finite() || !high.is_finite() {
            return Err(RangeError::NotFinite { low, high });
        }
        if low >= high {
            return Err(RangeError::Inverted { low, high });
        }
        Ok(Self { low, high })
    }

    #[inline]
    pub fn low(&self) -> f64 {
        self.low
    }

    #[inline]
    pub fn high(&self) -> f64 {
        self.high
    }

    #[inline]
    pub fn span(&self) -> f64 {
        self.high - self.low
    }

    #[inline]
    pub fn contains(&self, price: f64) -> bool {
        price >= self.low && price <= self.high
    }
}

impl Default for PriceRange {
    fn default() -> Self {
        Self { low: 50.0, high: 150.0 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_is_bare_price_object() {
        let frame = PriceTick::new(101.25).encode().unwrap();
        assert_eq!(frame, r#"{"price":101.25}"#);
    }

    #[test]
    fn test_encode_decode_preserves_price() {
        let tick = PriceTick::new(87.123456789);
        let back: PriceTick = serde_json::from_str(&tick.encode().unwrap()).unwrap();
        assert!((back.price - tick.price).abs() < 1e-12);
    }

    #[test]
    fn test_range_rejects_inverted_and_non_finite() {
        assert_eq!(
            PriceRange::new(150.0, 50.0),
            Err(RangeError::Inverted { low: 150.0, high: 50.0 })
        );
        assert!(matches!(
            PriceRange::new(f64::NAN, 10.0),
            Err(RangeError::NotFinite { .. })
        ));
        assert!(PriceRange::new(10.0, 10.0).is_err());
    }

    #[test]
    fn test_default_range_bounds() {
        let range = PriceRange::default();
        assert_eq!(range.low(), 50.0);
        assert_eq!(range.high(), 150.0);
        assert!(range.contains(50.0));
        assert!(range.contains(150.0));
        assert!(!range.contains(150.01));
    }
}
