//! # state
//!
//! The simulator's **shared application state**: the process-wide price
//! generator, the single subscriber slot, feed counters and the shutdown
//! signal every session listens to.
//!
//! ## Subscriber Slot
//!
//! Only one subscriber may hold the feed at a time. A connection claims the
//! slot with [`AppState::claim_subscriber`] before the WebSocket upgrade and
//! keeps the returned [`SubscriberGuard`] for the life of its session.
//! Dropping the guard frees the slot, whether the session ended cleanly,
//! the send failed, or the upgrade never completed.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::{watch, Mutex};

use crate::config::SimConfig;
use crate::engine::generator::PriceGenerator;
use crate::models::PriceTick;

// ─── AppState ─────────────────────────────────────────────────────────────────

/// Top-level shared state injected into every Axum handler.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<SimConfig>,

    /// Process-scoped random price source, shared by successive subscribers.
    /// Locked only for the duration of one `next_tick()` call.
    pub generator: Arc<Mutex<PriceGenerator>>,

    /// `true` while a subscriber session owns the feed.
    pub subscriber_active: Arc<AtomicBool>,

    // ── Metrics ───────────────────────────────────────────────────────────────
    pub ticks_sent: Arc<AtomicU64>,
    pub sessions:   Arc<AtomicU64>,
    pub started_at: DateTime<Utc>,

    /// Flips to `true` once the process has been asked to stop.
    pub shutdown: watch::Receiver<bool>,
}

impl AppState {
    pub fn new(
        config: SimConfig,
        generator: PriceGenerator,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        Self {
            config:            Arc::new(config),
            generator:         Arc::new(Mutex::new(generator)),
            subscriber_active: Arc::new(AtomicBool::new(false)),
            ticks_sent:        Arc::new(AtomicU64::new(0)),
            sessions:          Arc::new(AtomicU64::new(0)),
            started_at:        Utc::now(),
            shutdown,
        }
    }

    // ── Helper Methods ────────────────────────────────────────────────────────

    /// Try to take the single subscriber slot.
    /// Returns `None` when another session already holds it.
    pub fn claim_subscriber(&self) -> Option<SubscriberGuard> {
        self.subscriber_active
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| {
                self.sessions.fetch_add(1, Ordering::Relaxed);
                SubscriberGuard {
                    slot: Arc::clone(&self.subscriber_active),
                }
            })
    }

    pub fn has_subscriber(&self) -> bool {
        self.subscriber_active.load(Ordering::Acquire)
    }

    pub fn is_shutting_down(&self) -> bool {
        *self.shutdown.borrow()
    }

    /// Draw the next price from the shared generator.
    pub async fn next_tick(&self) -> PriceTick {
        self.generator.lock().await.next_tick()
    }
}

// ─── SubscriberGuard ──────────────────────────────────────────────────────────

/// Proof of ownership of the subscriber slot; releases it on drop.
#[derive(Debug)]
pub struct SubscriberGuard {
    slot: Arc<AtomicBool>,
}

impl Drop for SubscriberGuard {
    fn drop(&mut self) {
        self.slot.store(false, Ordering::Release);
    }
}

/// Convenience type alias
pub type SharedState = Arc<AppState>;

/// Build the shared state with a clock-seeded generator, ready for the router.
pub fn build_state(config: SimConfig, shutdown: watch::Receiver<bool>) -> SharedState {
    let generator = PriceGenerator::seeded_from_clock(config.price_range);
    Arc::new(AppState::new(config, generator, shutdown))
}
