//! WebSocket Transport
//!
//! `tokio-tungstenite` implementation of the live channel transport.

mod endpoint;

pub use endpoint::resolve_endpoint;

use std::time::Duration;

use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::{self, protocol::Message};
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

use crate::domain::transport::{Connector, Transport};
use crate::shared::error::AppError;

/// Opens WebSocket connections with a bounded handshake.
#[derive(Debug, Clone)]
pub struct WebSocketConnector {
    connect_timeout: Duration,
}

impl WebSocketConnector {
    pub fn new(connect_timeout: Duration) -> Self {
        Self { connect_timeout }
    }
}

#[async_trait]
impl Connector for WebSocketConnector {
    async fn connect(&self, url: &str) -> Result<Box<dyn Transport>, AppError> {
        let (stream, response) = tokio::time::timeout(self.connect_timeout, connect_async(url))
            .await
            .map_err(|_| AppError::Timeout(self.connect_timeout.as_millis() as u64))??;

        tracing::debug!(
            url = %url,
            status = %response.status(),
            "WebSocket handshake complete"
        );

        Ok(Box::new(WebSocketTransport { stream }))
    }
}

/// An open client WebSocket.
pub struct WebSocketTransport {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

#[async_trait]
impl Transport for WebSocketTransport {
    async fn send_text(&mut self, text: String) -> Result<(), AppError> {
        self.stream.send(Message::Text(text.into())).await?;
        Ok(())
    }

    async fn next_text(&mut self) -> Option<Result<String, AppError>> {
        loop {
            match self.stream.next().await? {
                Ok(Message::Text(text)) => return Some(Ok(text.as_str().to_owned())),
                Ok(Message::Binary(data)) => match String::from_utf8(data.to_vec()) {
                    Ok(text) => return Some(Ok(text)),
                    Err(_) => {
                        tracing::warn!(len = data.len(), "Dropping non-UTF-8 binary frame");
                    }
                },
                Ok(Message::Close(frame)) => {
                    match frame {
                        Some(f) => tracing::debug!(
                            code = u16::from(f.code),
                            reason = f.reason.as_str(),
                            "Server closed connection"
                        ),
                        None => tracing::debug!("Server closed connection"),
                    }
                    return None;
                }
                // Pong replies to protocol pings are queued by tungstenite itself
                Ok(Message::Ping(_)) | Ok(Message::Pong(_)) | Ok(Message::Frame(_)) => {}
                Err(e) => return Some(Err(e.into())),
            }
        }
    }

    async fn close(&mut self) -> Result<(), AppError> {
        match self.stream.close(None).await {
            Ok(()) => Ok(()),
            Err(tungstenite::Error::ConnectionClosed) | Err(tungstenite::Error::AlreadyClosed) => {
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }
}
