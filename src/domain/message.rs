//! Live channel wire messages.
//!
//! Text frames only. The keepalive pair is literal ASCII (`ping` out,
//! `pong` in); everything else is a JSON envelope `{"type", "data"}`
//! decoded into a closed set of variants.

use serde::{Deserialize, Serialize};

use super::dashboard::DashboardStats;

/// Outbound keepalive frame.
pub const HEARTBEAT_REQUEST: &str = "ping";

/// Inbound keepalive acknowledgement.
pub const HEARTBEAT_ACK: &str = "pong";

/// Messages pushed by the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum ServerMessage {
    #[serde(rename = "dashboard_update")]
    DashboardUpdate(DashboardStats),
}

impl ServerMessage {
    /// Wire name of the variant
    pub fn kind(&self) -> &'static str {
        match self {
            ServerMessage::DashboardUpdate(_) => "dashboard_update",
        }
    }
}

/// A decoded inbound text frame.
#[derive(Debug, Clone, PartialEq)]
pub enum InboundFrame {
    HeartbeatAck,
    Message(ServerMessage),
}

/// Why an inbound frame was rejected.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    #[error("frame is not a JSON envelope: {0}")]
    Malformed(#[source] serde_json::Error),

    #[error("unknown message type '{0}'")]
    UnknownType(String),

    #[error("invalid '{kind}' payload: {source}")]
    InvalidPayload {
        kind: String,
        #[source]
        source: serde_json::Error,
    },
}

impl FrameError {
    /// Short label for logs and metrics
    pub fn label(&self) -> &'static str {
        match self {
            FrameError::Malformed(_) => "malformed",
            FrameError::UnknownType(_) => "unknown_type",
            FrameError::InvalidPayload { .. } => "invalid_payload",
        }
    }
}

#[derive(Deserialize)]
struct Envelope {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    data: serde_json::Value,
}

/// Decode one inbound text frame.
pub fn decode_frame(text: &str) -> Result<InboundFrame, FrameError> {
    if text == HEARTBEAT_ACK {
        return Ok(InboundFrame::HeartbeatAck);
    }

    let envelope: Envelope = serde_json::from_str(text).map_err(FrameError::Malformed)?;
    let message = match envelope.kind.as_str() {
        "dashboard_update" => serde_json::from_value(envelope.data)
            .map(ServerMessage::DashboardUpdate)
            .map_err(|source| FrameError::InvalidPayload {
                kind: envelope.kind,
                source,
            })?,
        _ => return Err(FrameError::UnknownType(envelope.kind)),
    };

    Ok(InboundFrame::Message(message))
}
