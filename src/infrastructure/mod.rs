//! Infrastructure Layer
//!
//! Implementations for external services:
//! - WebSocket transport (tokio-tungstenite)
//! - REST client for the dashboard backend
//! - Local file-backed storage
//! - Prometheus metrics

pub mod api;
pub mod metrics;
pub mod storage;
pub mod websocket;
