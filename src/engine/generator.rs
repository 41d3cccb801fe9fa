//! # engine::generator
//!
//! The **Price Generator** — produces one synthetic price per call, drawn
//! uniformly from the configured [`PriceRange`].
//!
//! The random source is owned by the generator instance rather than being a
//! process global, so tests can inject a seeded RNG and get a repeatable
//! series.

use std::time::{SystemTime, UNIX_EPOCH};

use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::models::{PriceRange, PriceTick};

pub struct PriceGenerator<R = StdRng> {
    rng: R,
    range: PriceRange,
}

impl PriceGenerator<StdRng> {
    /// Seed a fresh `StdRng` from the current wall-clock time.
    pub fn seeded_from_clock(range: PriceRange) -> Self {
        let seed = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or_default();

        Self::with_rng(StdRng::seed_from_u64(seed), range)
    }
}

impl<R: Rng> PriceGenerator<R> {
    pub fn with_rng(rng: R, range: PriceRange) -> Self {
        Self { rng, range }
    }

    /// `low + u * (high - low)` with `u` uniform in `[0, 1)`.
    pub fn next_tick(&mut self) -> PriceTick {
        let u: f64 = self.rng.gen();
        let price = self.range.low() + u * self.range.span();
        debug_assert!(self.range.contains(price));
        PriceTick::new(price)
    }
}
