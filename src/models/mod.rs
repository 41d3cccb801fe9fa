//! Domain models shared across the simulator.

pub mod tick;

pub use tick::{PriceRange, PriceTick};
