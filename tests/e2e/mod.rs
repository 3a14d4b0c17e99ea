//! End-to-end tests against a local axum server.

mod api_tests;
mod server;
