//! # routes::feed
//!
//! Axum route handlers for the **tick feed**.
//!
//! ## Endpoints
//!
//! | Method    | Path      | Description                                        |
//! |-----------|-----------|----------------------------------------------------|
//! | GET (WS)  | `/`       | Subscribe to the tick stream (one subscriber max)  |
//! | GET       | `/health` | Feed status: subscriber, tick counter, uptime      |

use std::sync::atomic::Ordering;

use axum::{
    extract::{
        ws::{WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use serde_json::json;
use tracing::{info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::{
    engine::broadcaster::stream_ticks,
    error::SimError,
    state::{SharedState, SubscriberGuard},
};

// ─── GET / (WebSocket) ────────────────────────────────────────────────────────

/// Claim the subscriber slot, then upgrade to WebSocket and start streaming.
///
/// A second subscriber is turned away with `409 Conflict` while the first
/// one is connected; it may retry once the slot frees up.
pub async fn ws_feed(
    ws: WebSocketUpgrade,
    State(state): State<SharedState>,
) -> Result<impl IntoResponse, SimError> {
    if state.is_shutting_down() {
        return Err(SimError::ShuttingDown);
    }

    let guard = state.claim_subscriber().ok_or_else(|| {
        warn!("Rejected subscriber — feed already has one");
        SimError::SubscriberBusy("the feed already has a subscriber".into())
    })?;

    Ok(ws.on_upgrade(move |socket| run_session(socket, state, guard)))
}

async fn run_session(socket: WebSocket, state: SharedState, guard: SubscriberGuard) {
    let session = Uuid::new_v4();

    async move {
        info!("🔌 Subscriber connected");
        let end = stream_ticks(socket, state).await;
        info!(?end, "🔌 Subscriber session ended");
        drop(guard);
    }
    .instrument(info_span!("subscriber", %session))
    .await
}

// ─── GET /health ──────────────────────────────────────────────────────────────

pub async fn health(State(state): State<SharedState>) -> impl IntoResponse {
    let uptime = Utc::now() - state.started_at;

    Json(json!({
        "ok":                   true,
        "subscriber_connected": state.has_subscriber(),
        "ticks_sent":           state.ticks_sent.load(Ordering::Relaxed),
        "sessions":             state.sessions.load(Ordering::Relaxed),
        "started_at":           state.started_at,
        "uptime_secs":          uptime.num_seconds(),
    }))
}

#[cfg(test)]
mod tests {
    use std::net::SocketAddr;
    use std::time::Duration;

    use futures_util::{SinkExt, StreamExt};
    use rand::{rngs::StdRng, SeedableRng};
    use tokio::net::TcpListener;
    use tokio::sync::watch;
    use tokio::time::{timeout, Instant};
    use tokio_tungstenite::{
        connect_async,
        tungstenite::{Error as WsError, Message},
    };

    use super::*;
    use crate::config::SimConfig;
    use crate::engine::generator::PriceGenerator;
    use crate::models::{PriceRange, PriceTick};
    use crate::state::AppState;

    struct TestServer {
        url:      String,
        state:    SharedState,
        shutdown: watch::Sender<bool>,
    }

    async fn start_test_server(interval: Duration) -> TestServer {
        let config = SimConfig {
            bind_addr:     SocketAddr::from(([127, 0, 0, 1], 0)),
            tick_interval: interval,
            price_range:   PriceRange::default(),
        };
        let (shutdown, rx) = watch::channel(false);
        let generator = PriceGenerator::with_rng(StdRng::seed_from_u64(11), config.price_range);
        let state = std::sync::Arc::new(AppState::new(config, generator, rx));

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let app = crate::build_router(state.clone());

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        TestServer { url: format!("ws://{addr}"), state, shutdown }
    }

    fn rejection_status(err: WsError) -> u16 {
        match err {
            WsError::Http(response) => response.status().as_u16(),
            other => panic!("expected an HTTP rejection, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_subscriber_receives_paced_ticks_in_range() {
        let server = start_test_server(Duration::from_millis(50)).await;
        let (mut ws, _) = connect_async(&server.url).await.expect("connect");

        let mut prices = Vec::new();
        let started = Instant::now();
        while prices.len() < 3 {
            let frame = timeout(Duration::from_secs(2), ws.next())
                .await
                .expect("tick within deadline")
                .expect("stream open")
                .expect("frame ok");
            if let Message::Text(text) = frame {
                let tick: PriceTick = serde_json::from_str(&text).unwrap();
                prices.push(tick.price);
            }
        }

        // first tick is immediate, the next two each wait one interval
        assert!(started.elapsed() >= Duration::from_millis(100));
        assert!(prices.iter().all(|p| (50.0..=150.0).contains(p)));
        assert!(server.state.ticks_sent.load(Ordering::Relaxed) >= 3);
    }

    #[tokio::test]
    async fn test_second_subscriber_is_rejected_with_conflict() {
        let server = start_test_server(Duration::from_millis(50)).await;
        let (_first, _) = connect_async(&server.url).await.expect("first connects");

        let err = connect_async(&server.url).await.unwrap_err();
        assert_eq!(rejection_status(err), 409);
        assert!(server.state.has_subscriber());
    }

    #[tokio::test]
    async fn test_slot_frees_after_subscriber_leaves() {
        let server = start_test_server(Duration::from_millis(20)).await;
        let (mut first, _) = connect_async(&server.url).await.expect("first connects");
        first.send(Message::Close(None)).await.unwrap();
        drop(first);

        let deadline = Instant::now() + Duration::from_secs(2);
        let mut second = loop {
            match connect_async(&server.url).await {
                Ok((ws, _)) => break ws,
                Err(_) if Instant::now() < deadline => {
                    tokio::time::sleep(Duration::from_millis(20)).await;
                }
                Err(e) => panic!("slot never freed: {e:?}"),
            }
        };

        let frame = timeout(Duration::from_secs(2), second.next()).await.unwrap();
        assert!(matches!(frame, Some(Ok(Message::Text(_)))));
        assert_eq!(server.state.sessions.load(Ordering::Relaxed), 2);
    }

    #[tokio::test]
    async fn test_slot_frees_after_abrupt_disconnect() {
        let server = start_test_server(Duration::from_millis(10)).await;
        let (mut ws, _) = connect_async(&server.url).await.expect("connect");
        let _ = timeout(Duration::from_secs(2), ws.next()).await.unwrap();

        // drop the TCP stream with no Close handshake; the next tick's send
        // or the read half sees the dead peer and ends the session
        drop(ws);

        let deadline = Instant::now() + Duration::from_secs(2);
        while server.state.has_subscriber() {
            assert!(Instant::now() < deadline, "slot never freed after abrupt disconnect");
            tokio::time::sleep(Duration::from_millis(10)).await;
        }

        let (mut next, _) = connect_async(&server.url).await.expect("slot reusable");
        let frame = timeout(Duration::from_secs(2), next.next()).await.unwrap();
        assert!(matches!(frame, Some(Ok(Message::Text(_)))));
    }

    #[tokio::test]
    async fn test_shutdown_closes_subscriber_and_refuses_new_ones() {
        let server = start_test_server(Duration::from_millis(200)).await;
        let (mut ws, _) = connect_async(&server.url).await.expect("connect");

        // consume the immediate first tick, then stop mid-interval
        let _ = timeout(Duration::from_secs(2), ws.next()).await.unwrap();
        server.shutdown.send(true).unwrap();

        let closed = timeout(Duration::from_secs(2), async {
            while let Some(frame) = ws.next().await {
                match frame {
                    Ok(Message::Close(_)) | Err(_) => return true,
                    Ok(Message::Text(_)) => return false,
                    Ok(_) => {}
                }
            }
            true
        })
        .await
        .expect("close within deadline");
        assert!(closed, "no tick may fire after shutdown");

        let err = connect_async(&server.url).await.unwrap_err();
        assert_eq!(rejection_status(err), 503);
    }

    #[tokio::test]
    async fn test_health_reports_feed_status() {
        let server = start_test_server(Duration::from_secs(1)).await;
        let _guard = server.state.claim_subscriber();

        let response = health(State(server.state.clone())).await.into_response();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();

        assert_eq!(json["ok"], true);
        assert_eq!(json["subscriber_connected"], true);
        assert_eq!(json["sessions"], 1);
        assert_eq!(json["ticks_sent"], 0);
    }
}
