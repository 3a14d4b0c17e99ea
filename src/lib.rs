//! # Newsfeed Live
//!
//! Client side of a news dashboard's live update channel:
//! - A single self-healing WebSocket connection with heartbeat
//! - Bounded exponential backoff between reconnect attempts
//! - Broadcast of connection state and the latest server message
//! - Typed REST client and persisted feed filters for the dashboard views
//!
//! ## Architecture
//!
//! - **Domain Layer**: wire messages, connection state, backoff policy, transport traits
//! - **Application Layer**: the live channel and its connection task
//! - **Infrastructure Layer**: WebSocket transport, REST client, storage, metrics
//! - **Presentation Layer**: console rendering for the binary
//!
//! ## Module Structure
//!
//! ```text
//! newsfeed_live/
//! +-- config/         Configuration management
//! +-- domain/         Messages, state, backoff, transport traits
//! +-- application/    LiveChannel and connection task
//! +-- infrastructure/ WebSocket, REST, storage, metrics
//! +-- presentation/   Console reporter
//! +-- shared/         Errors
//! ```

// Configuration module
pub mod config;

// Domain layer
pub mod domain;

// Application layer - the live channel
pub mod application;

// Infrastructure layer - External implementations
pub mod infrastructure;

// Presentation layer - console output
pub mod presentation;

// Shared utilities
pub mod shared;

// Application startup and wiring
pub mod startup;

// Telemetry and observability
pub mod telemetry;
