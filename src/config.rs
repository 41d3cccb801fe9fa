//! # config — Simulator configuration from environment variables

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::Context;

use crate::models::PriceRange;

/// Everything the simulator needs at startup.
#[derive(Debug, Clone)]
pub struct SimConfig {
    /// Address the WebSocket feed listens on
    pub bind_addr:     SocketAddr,
    /// Pause between one tick's send completing and the next tick
    pub tick_interval: Duration,
    /// Band every generated price falls into
    pub price_range:   PriceRange,
}

impl SimConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let bind_addr: SocketAddr = std::env::var("BIND_ADDR")
            .unwrap_or_else(|_| "0.0.0.0:7999".to_string())
            .parse()
            .context("BIND_ADDR must be a socket address, e.g. 0.0.0.0:7999")?;

        let interval_ms: u64 = std::env::var("TICK_INTERVAL_MS")
            .unwrap_or_else(|_| "1000".to_string())
            .parse()
            .context("TICK_INTERVAL_MS must be a number")?;

        if interval_ms == 0 {
            anyhow::bail!("TICK_INTERVAL_MS must be greater than zero");
        }

        let low = env_f64("PRICE_LOW", 50.0)?;
        let high = env_f64("PRICE_HIGH", 150.0)?;
        let price_range = PriceRange::new(low, high).context("Invalid PRICE_LOW / PRICE_HIGH")?;

        Ok(Self {
            bind_addr,
            tick_interval: Duration::from_millis(interval_ms),
            price_range,
        })
    }
}

#[cfg(test)]
impl Default for SimConfig {
    fn default() -> Self {
        Self {
            bind_addr:     SocketAddr::from(([0, 0, 0, 0], 7999)),
            tick_interval: Duration::from_secs(1),
            price_range:   PriceRange::default(),
        }
    }
}

fn env_f64(key: &str, default: f64) -> anyhow::Result<f64> {
    match std::env::var(key) {
        Ok(raw) => raw
            .parse()
            .with_context(|| format!("{key} must be a number, got '{raw}'")),
        Err(_) => Ok(default),
    }
}
