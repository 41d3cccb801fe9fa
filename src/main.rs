//! # Ticksim — Market Feed Simulator
//!
//! ## Architecture Overview
//!
//! ```text
//!  ┌──────────────────┐                   ┌──────────────────────────────┐
//!  │  PriceGenerator  │── next_tick() ──▶│  Tick loop (one session)     │
//!  │  (seeded StdRng) │                   │  send → wait interval → send │
//!  └──────────────────┘                   └──────────────┬───────────────┘
//!                                                        │ {"price": 97.41}
//!                                                        ▼
//!                                          ┌──────────────────────────────┐
//!                                          │  Subscriber (trading bot)    │
//!                                          │  ws://host:7999              │
//!                                          └──────────────────────────────┘
//! ```
//!
//! Exactly one subscriber is served at a time; a second one receives
//! `409 Conflict` until the first disconnects.
//!
//! ## Environment Variables
//!
//! | Variable           | Default         | Description                        |
//! |--------------------|-----------------|------------------------------------|
//! | `BIND_ADDR`        | `0.0.0.0:7999`  | Address the feed listens on        |
//! | `TICK_INTERVAL_MS` | `1000`          | Pause between ticks                |
//! | `PRICE_LOW`        | `50.0`          | Lower bound of generated prices    |
//! | `PRICE_HIGH`       | `150.0`         | Upper bound of generated prices    |
//! | `RUST_LOG`         | `ticksim=debug` | Tracing filter                     |

use std::time::Duration;

use anyhow::Context;
use axum::{routing::get, Router};
use tokio::sync::watch;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod config;
mod engine;
mod error;
mod models;
mod routes;
mod state;

use config::SimConfig;
use routes::feed::{health, ws_feed};
use state::{build_state, SharedState};

// ─── Entry Point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── 1. Load .env ──────────────────────────────────────────────────────────
    dotenvy::dotenv().ok();

    // ── 2. Structured logging ─────────────────────────────────────────────────
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::from_default_env()
                .add_directive("ticksim=debug".parse()?)
                .add_directive("tower_http=info".parse()?),
        )
        .init();

    info!(r#"

  ╔═══════════════════════════════════════════════╗
  ║        TICKSIM — Market Feed Simulator        ║
  ╚═══════════════════════════════════════════════╝"#);

    // ── 3. Config + shared state ──────────────────────────────────────────────
    let config = SimConfig::from_env().context("Failed to load config")?;
    let addr = config.bind_addr;

    info!(
        interval = ?config.tick_interval,
        low      = config.price_range.low(),
        high     = config.price_range.high(),
        "Feed configured"
    );

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let state = build_state(config, shutdown_rx);
    let feed_state = state.clone();

    // ── 4. Bind (fatal on failure — no partial start) ─────────────────────────
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind feed listener on {addr}"))?;

    info!(?addr, "🚀 Ticksim feed listening");

    // ── 5. Serve until a termination signal ───────────────────────────────────
    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            // Sessions cancel their pending timer and close the socket.
            let _ = shutdown_tx.send(true);
        })
        .await?;

    // Give an active session the chance to send its Close frame.
    wait_for_session_end(&feed_state, Duration::from_secs(2)).await;

    info!("👋 Ticksim stopped");
    Ok(())
}

fn build_router(state: SharedState) -> Router {
    Router::new()
        .route("/",       get(ws_feed))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn wait_for_session_end(state: &SharedState, limit: Duration) {
    let deadline = tokio::time::Instant::now() + limit;
    while state.has_subscriber() && tokio::time::Instant::now() < deadline {
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
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

    info!("Termination signal received");
}
