//! Feed engine: price generation and the per-subscriber tick loop.

pub mod broadcaster;
pub mod generator;
