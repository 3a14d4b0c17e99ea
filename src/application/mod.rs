//! Application Layer
//!
//! The live update channel and the task that drives its connection.

mod connection;
pub mod live_channel;

pub use live_channel::{ChannelObserver, LiveChannel, LiveChannelConfig};
