//! # error
//!
//! Centralised simulator error type.
//!
//! HTTP-facing handlers return `Result<_, SimError>`; the `IntoResponse`
//! impl turns these into a JSON body so a rejected subscriber still sees a
//! machine-readable reason before the socket is closed.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    /// Another subscriber already holds the feed.
    #[error("Subscriber slot busy: {0}")]
    SubscriberBusy(String),

    /// The simulator is shutting down and accepts no new subscribers.
    #[error("Shutting down")]
    ShuttingDown,
}

impl IntoResponse for SimError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            SimError::SubscriberBusy(msg) => (StatusCode::CONFLICT, msg.clone()),
            SimError::ShuttingDown => (StatusCode::SERVICE_UNAVAILABLE, self.to_string()),
        };

        let body = Json(json!({
            "ok":    false,
            "error": message,
        }));

        (status, body).into_response()
    }
}
