//! # engine::broadcaster
//!
//! The **Tick Broadcaster** — drives one subscriber session.
//!
//! ```text
//! connect ──▶ send tick ──▶ wait interval ──▶ send tick ──▶ …
//!                  │              │
//!                  │              ├─ Close / EOF   → SubscriberLeft
//!                  │              └─ shutdown      → Close frame, Shutdown
//!                  └─ send error  → SendFailed (no retry)
//! ```
//!
//! The wait is measured from the moment the previous send completed, so the
//! feed drifts rather than aligning to the wall clock. One send is in flight
//! at most; ticks reach the subscriber in generation order.

use std::sync::atomic::Ordering;

use axum::extract::ws::{Message, WebSocket};
use futures_util::{SinkExt, StreamExt};
use tokio::time::{sleep_until, Instant};
use tracing::{debug, info, warn};

use crate::state::SharedState;

/// Why a session's tick loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    /// The subscriber sent Close or the stream ended.
    SubscriberLeft,
    /// Writing a frame to the subscriber failed.
    SendFailed,
    /// The process is stopping.
    Shutdown,
}

/// Run the tick loop for one connected subscriber until it ends.
pub async fn stream_ticks(socket: WebSocket, state: SharedState) -> SessionEnd {
    let (mut sender, mut receiver) = socket.split();
    let mut shutdown = state.shutdown.clone();
    let interval = state.config.tick_interval;

    loop {
        // ── 1. Generate + encode + send ───────────────────────────────────────
        let tick = state.next_tick().await;
        match tick.encode() {
            Ok(frame) => {
                if let Err(e) = sender.send(Message::Text(frame)).await {
                    warn!(error = %e, "Send to subscriber failed — stopping feed");
                    return SessionEnd::SendFailed;
                }
                state.ticks_sent.fetch_add(1, Ordering::Relaxed);
                debug!(price = tick.price, "📈 Tick sent");
            }
            Err(e) => warn!(error = %e, price = tick.price, "Tick encoding failed — skipped"),
        }

        // ── 2. Wait for the next fire, watching the socket and shutdown ──────
        let next_fire = Instant::now() + interval;
        loop {
            tokio::select! {
                // Shutdown wins over a timer that is due in the same poll.
                biased;

                _ = shutdown.changed() => {
                    info!("Shutdown requested — closing subscriber");
                    let _ = sender.send(Message::Close(None)).await;
                    return SessionEnd::Shutdown;
                }

                incoming = receiver.next() => match incoming {
                    Some(Ok(Message::Close(_))) | None => return SessionEnd::SubscriberLeft,
                    Some(Ok(Message::Ping(data))) => {
                        if sender.send(Message::Pong(data)).await.is_err() {
                            return SessionEnd::SendFailed;
                        }
                    }
                    Some(Err(e)) => {
                        debug!(error = %e, "Subscriber stream error");
                        return SessionEnd::SubscriberLeft;
                    }
                    Some(Ok(_)) => {} // inbound text/binary is not part of the protocol
                },

                _ = sleep_until(next_fire) => break,
            }
        }
    }
}
