//! Connection state and the values broadcast to consumers.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::message::ServerMessage;

/// Lifecycle state of the live channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ConnectionState {
    /// Not started, stopped, or retries exhausted
    Idle,
    Connecting,
    Open,
    /// Close handshake in progress after `stop()`
    Closing,
    /// Waiting `delay` before retry number `attempt`
    Reconnecting {
        #[serde(with = "millis")]
        delay: Duration,
        attempt: u32,
    },
}

impl ConnectionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Connecting => "connecting",
            Self::Open => "open",
            Self::Closing => "closing",
            Self::Reconnecting { .. } => "reconnecting",
        }
    }
}

impl std::fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Most recent decoded server message with its arrival time.
#[derive(Debug, Clone, PartialEq)]
pub struct ReceivedMessage {
    pub message: ServerMessage,
    pub received_at: DateTime<Utc>,
}

/// Broadcast state shared with every consumer.
///
/// `connected` is true only while `state` is `Open`.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelSnapshot {
    pub state: ConnectionState,
    pub connected: bool,
    pub latest_message: Option<Arc<ReceivedMessage>>,
}

impl ChannelSnapshot {
    pub fn idle() -> Self {
        Self {
            state: ConnectionState::Idle,
            connected: false,
            latest_message: None,
        }
    }
}

impl Default for ChannelSnapshot {
    fn default() -> Self {
        Self::idle()
    }
}

/// Severity of a user-facing notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationLevel {
    Success,
    Info,
    Warning,
    Error,
}

/// What a notification reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NotificationKind {
    Connected,
    Retrying {
        #[serde(with = "millis")]
        delay: Duration,
        attempt: u32,
        max_attempts: u32,
    },
    ReconnectFailed,
}

/// One-shot user-facing status notification.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notification {
    pub level: NotificationLevel,
    #[serde(flatten)]
    pub kind: NotificationKind,
    pub message: String,
    pub at: DateTime<Utc>,
}

impl Notification {
    pub fn connected() -> Self {
        Self::new(
            NotificationLevel::Success,
            NotificationKind::Connected,
            "Live updates connected".to_string(),
        )
    }

    /// Retry notice; `attempt` is 1-based.
    pub fn retrying(delay: Duration, attempt: u32, max_attempts: u32) -> Self {
        let secs = (delay.as_millis() as f64 / 1000.0).round() as u64;
        Self::new(
            NotificationLevel::Warning,
            NotificationKind::Retrying {
                delay,
                attempt,
                max_attempts,
            },
            format!(
                "Live updates disconnected, retrying in {}s ({}/{})",
                secs, attempt, max_attempts
            ),
        )
    }

    pub fn reconnect_failed() -> Self {
        Self::new(
            NotificationLevel::Error,
            NotificationKind::ReconnectFailed,
            "Live updates could not reconnect, reload required".to_string(),
        )
    }

    fn new(level: NotificationLevel, kind: NotificationKind, message: String) -> Self {
        Self {
            level,
            kind,
            message,
            at: Utc::now(),
        }
    }
}

mod millis {
    use std::time::Duration;

    use serde::Serializer;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_millis() as u64)
    }
}
