//! Application Startup
//!
//! Wires settings into the live channel, REST client and storage, and
//! runs the command-line client until interrupted.

use std::sync::Arc;

use anyhow::Result;

use crate::application::{LiveChannel, LiveChannelConfig};
use crate::config::Settings;
use crate::domain::backoff::ReconnectPolicy;
use crate::infrastructure::api::ApiClient;
use crate::infrastructure::metrics;
use crate::infrastructure::storage::{FeedFilterStore, LocalStore};
use crate::infrastructure::websocket::{resolve_endpoint, WebSocketConnector};
use crate::presentation::console::{summarize_stats, ConsoleReporter};

/// Application instance
pub struct Application {
    channel: Arc<LiveChannel>,
    api: ApiClient,
    filters: FeedFilterStore,
}

impl Application {
    /// Build the application from settings
    pub fn build(settings: Settings) -> Result<Self> {
        let url = resolve_endpoint(&settings.channel, settings.is_development())?;
        tracing::info!(url = %url, "Live channel endpoint resolved");

        let connector = Arc::new(WebSocketConnector::new(settings.channel.connect_timeout()));
        let config = LiveChannelConfig {
            url,
            policy: ReconnectPolicy::from(&settings.reconnect),
            heartbeat_interval: settings.heartbeat.interval(),
            close_timeout: settings.channel.close_timeout(),
        };
        let channel = Arc::new(LiveChannel::new(connector, config));

        let api = ApiClient::from_settings(&settings.api, &settings.channel)?;
        tracing::info!(base_url = %api.base_url(), "REST client created");

        let store = Arc::new(LocalStore::new(&settings.storage.path));
        let filters = FeedFilterStore::new(store);

        Ok(Self {
            channel,
            api,
            filters,
        })
    }

    pub fn channel(&self) -> &Arc<LiveChannel> {
        &self.channel
    }

    /// Connect and report live updates until Ctrl-C
    pub async fn run_until_stopped(self) -> Result<()> {
        let filters = self.filters.load();
        tracing::info!(filters = ?filters, "Feed filters loaded");

        // The initial snapshot comes over REST; live updates follow
        match self.api.dashboard_stats().await {
            Ok(stats) => tracing::info!("Initial dashboard: {}", summarize_stats(&stats)),
            Err(e) => tracing::warn!(error = %e, "Failed to fetch initial dashboard stats"),
        }

        let reporter = ConsoleReporter::spawn(self.channel.observer());
        self.channel.start();

        tokio::signal::ctrl_c().await?;
        tracing::info!("Shutdown requested");

        self.channel.stop().await;
        drop(reporter);

        tracing::debug!(metrics = %metrics::gather_metrics(), "Final metrics");
        Ok(())
    }
}
