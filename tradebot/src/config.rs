//! # config — Read bot configuration from environment variables

use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{bail, Context};

use crate::strategy::StrategyKind;

/// Everything Tradebot needs at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// WebSocket URI of the market feed, e.g. `ws://localhost:7999`
    pub feed_uri:         String,
    /// Cash the virtual portfolio starts with
    pub starting_balance: f64,
    /// Flat fee charged on every executed order
    pub transaction_fee:  f64,
    /// Moving-average window (prices)
    pub ma_window:        NonZeroUsize,
    /// Strategy whose signal drives trading; the other runs as a shadow
    pub primary_strategy: StrategyKind,
    /// Append-only trade log
    pub trade_log_path:   PathBuf,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let feed_uri = std::env::var("FEED_URI")
            .unwrap_or_else(|_| "ws://localhost:7999".to_string());

        if !feed_uri.starts_with("ws://") && !feed_uri.starts_with("wss://") {
            bail!("FEED_URI must be a ws:// URI, got '{feed_uri}'");
        }

        let starting_balance: f64 = env_parse("STARTING_BALANCE", 10_000.0)?;
        let transaction_fee: f64 = env_parse("TRANSACTION_FEE", 5.0)?;

        if !starting_balance.is_finite() {
            bail!("STARTING_BALANCE must be a finite number");
        }
        if !transaction_fee.is_finite() || transaction_fee < 0.0 {
            bail!("TRANSACTION_FEE must be a finite, non-negative number");
        }

        let window: usize = env_parse("MA_WINDOW", 10)?;
        let ma_window = NonZeroUsize::new(window).context("MA_WINDOW must be at least 1")?;

        let primary_strategy = std::env::var("PRIMARY_STRATEGY")
            .unwrap_or_else(|_| "moving_average".to_string())
            .parse::<StrategyKind>()?;

        Ok(Self {
            feed_uri,
            starting_balance,
            transaction_fee,
            ma_window,
            primary_strategy,
            trade_log_path: std::env::var("TRADE_LOG_PATH")
                .unwrap_or_else(|_| "trade_log.txt".to_string())
                .into(),
        })
    }
}

fn env_parse<T>(key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{key} must be a number, got '{raw}'")),
        Err(_) => Ok(default),
    }
}
