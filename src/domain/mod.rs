//! # Domain Layer
//!
//! Types shared by the channel, its consumers and the REST client.
//! Nothing here performs I/O.
//!
//! ## Structure
//!
//! - **message**: wire vocabulary and frame decoding
//! - **state**: connection state, snapshots and notifications
//! - **backoff**: reconnect delay policy
//! - **transport**: the seam between the channel and a WebSocket
//! - **dashboard** / **filters**: payloads of the dashboard views

pub mod backoff;
pub mod dashboard;
pub mod filters;
pub mod message;
pub mod state;
pub mod transport;

pub use backoff::ReconnectPolicy;
pub use message::{decode_frame, FrameError, InboundFrame, ServerMessage};
pub use state::{ChannelSnapshot, ConnectionState, Notification, NotificationKind, NotificationLevel};
pub use transport::{Connector, Transport};
