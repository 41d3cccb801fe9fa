//! # market — Market data client
//!
//! Holds one WebSocket connection to the feed and pushes every decoded tick
//! through the decision chain, synchronously and in arrival order:
//!
//! ```text
//! frame ─▶ decode ─▶ StrategyEngine::evaluate ─▶ PortfolioLedger::apply ─▶ TradeSink
//!            │
//!            └─ malformed → warn + discard, keep listening
//! ```
//!
//! Transport and decode problems stop here; the strategies and the
//! portfolio only ever see well-formed prices.

use std::future::Future;

use futures_util::{SinkExt, StreamExt};
use thiserror::Error;
use tokio_tungstenite::{
    connect_async,
    tungstenite::{self, Message},
};
use tracing::{debug, error, info, warn};

use crate::{
    ledger::TradeSink,
    models::{PriceTick, TradeRecord},
    portfolio::PortfolioLedger,
    strategy::StrategyEngine,
};

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("failed to connect to {uri}: {source}")]
    Connect {
        uri: String,
        #[source]
        source: tungstenite::Error,
    },

    #[error("feed connection failed: {0}")]
    Stream(#[from] tungstenite::Error),
}

/// Why a feed session ended without error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    /// The feed sent Close or the stream ended.
    FeedClosed,
    /// Local shutdown was requested.
    Shutdown,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClientStats {
    pub frames_received: u64,
    pub decode_failures: u64,
    pub trades_executed: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionSummary {
    pub end:             SessionEnd,
    pub stats:           ClientStats,
    pub ticks_evaluated: u64,
}

// ─── Client ───────────────────────────────────────────────────────────────────

pub struct MarketDataClient<S> {
    engine:    StrategyEngine,
    portfolio: PortfolioLedger,
    sink:      S,
    stats:     ClientStats,
}

impl<S: TradeSink> MarketDataClient<S> {
    pub fn new(engine: StrategyEngine, portfolio: PortfolioLedger, sink: S) -> Self {
        Self {
            engine,
            portfolio,
            sink,
            stats: ClientStats::default(),
        }
    }

    pub fn portfolio(&self) -> &PortfolioLedger {
        &self.portfolio
    }

    /// Process one inbound text frame. Returns the trade it caused, if any.
    pub fn handle_frame(&mut self, frame: &str) -> Option<TradeRecord> {
        self.stats.frames_received += 1;

        let tick = match PriceTick::decode(frame) {
            Ok(tick) => tick,
            Err(e) => {
                self.stats.decode_failures += 1;
                warn!(error = %e, frame, "Discarding malformed tick");
                return None;
            }
        };

        let signal = self.engine.evaluate(tick.price);
        debug!(price = tick.price, %signal, strategy = self.engine.primary_name(), "📥 Tick evaluated");

        let trade = self.portfolio.apply(signal, tick.price)?;
        self.stats.trades_executed += 1;

        if let Err(e) = self.sink.record(&trade) {
            error!(error = %e, trade_id = %trade.trade_id, "Failed to append trade to log");
        }

        Some(trade)
    }

    /// Connect to `uri` and consume ticks until the feed closes, the
    /// connection fails, or `shutdown` resolves.
    pub async fn run<F>(&mut self, uri: &str, shutdown: F) -> Result<SessionSummary, ClientError>
    where
        F: Future<Output = ()>,
    {
        let (ws, _) = connect_async(uri).await.map_err(|source| ClientError::Connect {
            uri: uri.to_string(),
            source,
        })?;
        info!(uri, "🔌 Connected to market feed");

        let (mut write, mut read) = ws.split();
        tokio::pin!(shutdown);

        let end = loop {
            tokio::select! {
                biased;

                _ = &mut shutdown => {
                    info!("Shutdown requested — closing feed connection");
                    let _ = write.send(Message::Close(None)).await;
                    break SessionEnd::Shutdown;
                }

                frame = read.next() => match frame {
                    Some(Ok(Message::Text(text))) => {
                        self.handle_frame(&text);
                    }
                    Some(Ok(Message::Binary(bytes))) => match std::str::from_utf8(&bytes) {
                        Ok(text) => {
                            self.handle_frame(text);
                        }
                        Err(_) => {
                            self.stats.frames_received += 1;
                            self.stats.decode_failures += 1;
                            warn!(len = bytes.len(), "Discarding non-UTF-8 binary frame");
                        }
                    },
                    Some(Ok(Message::Ping(data))) => write.send(Message::Pong(data)).await?,
                    Some(Ok(Message::Close(_))) | None => break SessionEnd::FeedClosed,
                    Some(Ok(_)) => {}
                    Some(Err(e)) => return Err(ClientError::Stream(e)),
                },
            }
        };

        let summary = SessionSummary {
            end,
            stats: self.stats,
            ticks_evaluated: self.engine.evaluations(),
        };

        info!(
            ?end,
            frames   = summary.stats.frames_received,
            rejected = summary.stats.decode_failures,
            trades   = summary.stats.trades_executed,
            balance  = self.portfolio.balance(),
            holdings = self.portfolio.holdings(),
            "Feed session finished"
        );

        Ok(summary)
    }
}
