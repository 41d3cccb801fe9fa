//! HTTP / WebSocket route handlers.

pub mod feed;
