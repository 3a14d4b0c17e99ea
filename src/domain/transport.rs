//! Transport contracts for the live channel.
//!
//! The connection task only sees these traits; the WebSocket client in
//! the infrastructure layer implements them, and tests substitute an
//! in-memory transport.

use async_trait::async_trait;

use crate::shared::error::AppError;

/// An open, bidirectional text-frame transport.
#[async_trait]
pub trait Transport: Send {
    /// Send one text frame.
    async fn send_text(&mut self, text: String) -> Result<(), AppError>;

    /// Next inbound text frame. `None` once the peer has closed.
    ///
    /// Must be cancel-safe: it is polled inside `tokio::select!`.
    async fn next_text(&mut self) -> Option<Result<String, AppError>>;

    /// Start the close handshake and release the transport.
    async fn close(&mut self) -> Result<(), AppError>;
}

/// Opens transports to a URL.
#[async_trait]
pub trait Connector: Send + Sync + 'static {
    async fn connect(&self, url: &str) -> Result<Box<dyn Transport>, AppError>;
}
