//! # Tradebot — Reactive Trading Agent
//!
//! Subscribes to the Ticksim feed and trades a virtual portfolio, one share
//! per signal.
//!
//! ## Flow
//! ```text
//! for every tick frame:
//!   1. Decode {"price": …}            (malformed → warn, skip)
//!   2. Primary strategy → BUY/SELL/HOLD  (shadow strategy logged only)
//!   3. Portfolio applies the signal   (fee 5.0, one share)
//!   4. Executed trades → trade_log.txt
//! ```
//!
//! The bot does not reconnect: when the feed goes away the process exits
//! and must be restarted.

use anyhow::Context;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod config;
mod ledger;
mod market;
mod models;
mod portfolio;
mod strategy;

use config::Config;
use ledger::FileTradeLog;
use market::MarketDataClient;
use portfolio::PortfolioLedger;
use strategy::StrategyEngine;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env()
            .add_directive("tradebot=debug".parse()?))
        .init();

    info!(r#"

  ╔═══════════════════════════════════════════╗
  ║   TRADEBOT — Reactive Trading Agent       ║
  ║   Ticksim Market Feed Consumer            ║
  ╚═══════════════════════════════════════════╝"#);

    let config = Config::from_env().context("Failed to load config")?;

    let primary = config.primary_strategy;
    let engine = StrategyEngine::new(primary.build(config.ma_window))
        .with_shadow(primary.other().build(config.ma_window));

    let trade_log = FileTradeLog::open(&config.trade_log_path)
        .context("Failed to open trade log")?;

    info!(
        feed      = %config.feed_uri,
        primary   = %primary,
        shadow    = %primary.other(),
        window    = config.ma_window.get(),
        balance   = config.starting_balance,
        fee       = config.transaction_fee,
        trade_log = %trade_log.path().display(),
        "Tradebot started"
    );

    let portfolio = PortfolioLedger::new(config.starting_balance, config.transaction_fee);
    let mut client = MarketDataClient::new(engine, portfolio, trade_log);

    let summary = client
        .run(&config.feed_uri, shutdown_signal())
        .await
        .context("Market feed session failed")?;

    info!(
        end      = ?summary.end,
        ticks    = summary.ticks_evaluated,
        trades   = summary.stats.trades_executed,
        balance  = client.portfolio().balance(),
        holdings = client.portfolio().holdings(),
        "👋 Tradebot stopped"
    );

    Ok(())
}

/// Resolves on Ctrl-C, or SIGTERM on unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
