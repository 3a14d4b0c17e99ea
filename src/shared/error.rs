//! Application Error Types
//!
//! Centralized error handling. None of these ever reach consumers of the
//! live channel; the channel task logs them and turns them into state
//! transitions and notifications instead.

use tokio_tungstenite::tungstenite;

/// Application error type
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Invalid endpoint: {0}")]
    Endpoint(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tungstenite::Error),

    #[error("Connection timeout after {0}ms")]
    Timeout(u64),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },
}

impl AppError {
    /// Whether retrying the same operation later may succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            AppError::Transport(_) | AppError::WebSocket(_) | AppError::Timeout(_) => true,
            AppError::Http(e) => e.is_timeout() || e.is_connect(),
            AppError::Api { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;
