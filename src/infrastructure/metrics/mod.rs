//! Prometheus Metrics Module
//!
//! Process-wide metrics for the live channel.
//!
//! # Metrics Collected
//! - Connection attempts and successful opens
//! - Scheduled reconnects and exhausted retry budgets
//! - Inbound frames by kind, rejected frames by reason
//! - Heartbeat frames sent
//! - Connected gauge

use once_cell::sync::Lazy;
use prometheus::{Encoder, IntCounter, IntCounterVec, IntGauge, Opts, Registry, TextEncoder};

const NAMESPACE: &str = "newsfeed_live";

/// Global metrics registry
pub static REGISTRY: Lazy<Registry> = Lazy::new(|| {
    let registry = Registry::new();
    register_metrics(&registry);
    registry
});

/// Connection attempts by outcome ("opened", "failed")
pub static CONNECT_ATTEMPTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("connect_attempts_total", "Live channel connection attempts").namespace(NAMESPACE),
        &["outcome"],
    )
    .expect("Failed to create CONNECT_ATTEMPTS_TOTAL metric")
});

/// Reconnects scheduled after an abnormal close
pub static RECONNECTS_SCHEDULED_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::with_opts(
        Opts::new("reconnects_scheduled_total", "Reconnect timers armed").namespace(NAMESPACE),
    )
    .expect("Failed to create RECONNECTS_SCHEDULED_TOTAL metric")
});

/// Sessions that gave up after spending the retry budget
pub static RETRIES_EXHAUSTED_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::with_opts(
        Opts::new("retries_exhausted_total", "Retry budgets exhausted").namespace(NAMESPACE),
    )
    .expect("Failed to create RETRIES_EXHAUSTED_TOTAL metric")
});

/// Inbound frames by kind ("pong", message type, or rejection label)
pub static FRAMES_RECEIVED_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("frames_received_total", "Inbound text frames").namespace(NAMESPACE),
        &["kind"],
    )
    .expect("Failed to create FRAMES_RECEIVED_TOTAL metric")
});

/// Heartbeat frames written
pub static HEARTBEATS_SENT_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::with_opts(
        Opts::new("heartbeats_sent_total", "Heartbeat frames sent").namespace(NAMESPACE),
    )
    .expect("Failed to create HEARTBEATS_SENT_TOTAL metric")
});

/// 1 while the transport is open
pub static CONNECTED: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::with_opts(
        Opts::new("connected", "Whether the live channel is open").namespace(NAMESPACE),
    )
    .expect("Failed to create CONNECTED metric")
});

/// Register all metrics with the registry
fn register_metrics(registry: &Registry) {
    registry
        .register(Box::new(CONNECT_ATTEMPTS_TOTAL.clone()))
        .expect("Failed to register CONNECT_ATTEMPTS_TOTAL");
    registry
        .register(Box::new(RECONNECTS_SCHEDULED_TOTAL.clone()))
        .expect("Failed to register RECONNECTS_SCHEDULED_TOTAL");
    registry
        .register(Box::new(RETRIES_EXHAUSTED_TOTAL.clone()))
        .expect("Failed to register RETRIES_EXHAUSTED_TOTAL");
    registry
        .register(Box::new(FRAMES_RECEIVED_TOTAL.clone()))
        .expect("Failed to register FRAMES_RECEIVED_TOTAL");
    registry
        .register(Box::new(HEARTBEATS_SENT_TOTAL.clone()))
        .expect("Failed to register HEARTBEATS_SENT_TOTAL");
    registry
        .register(Box::new(CONNECTED.clone()))
        .expect("Failed to register CONNECTED");
}

/// Collect and encode all metrics as Prometheus text format
pub fn gather_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::warn!(error = %e, "Failed to encode metrics");
        return String::new();
    }
    String::from_utf8(buffer).unwrap_or_default()
}

pub fn record_connect_attempt(opened: bool) {
    let outcome = if opened { "opened" } else { "failed" };
    CONNECT_ATTEMPTS_TOTAL.with_label_values(&[outcome]).inc();
}

pub fn record_frame(kind: &str) {
    FRAMES_RECEIVED_TOTAL.with_label_values(&[kind]).inc();
}

pub fn set_connected(connected: bool) {
    CONNECTED.set(i64::from(connected));
}
