//! # Newsfeed Live
//!
//! Command-line client for the news dashboard's live update channel.
//!
//! This is the application entry point that initializes:
//! - Tracing/logging subsystem
//! - Configuration loading
//! - Live channel, REST client and local storage

use anyhow::Result;
use tracing::info;

use newsfeed_live::config::Settings;
use newsfeed_live::startup::Application;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing subscriber for structured logging
    newsfeed_live::telemetry::init_tracing();

    info!("Starting Newsfeed Live...");

    // Load configuration from environment and config files
    let settings = Settings::load()?;
    info!(
        origin = %settings.channel.origin,
        environment = %settings.environment,
        "Configuration loaded"
    );

    let application = Application::build(settings)?;

    application.run_until_stopped().await?;

    Ok(())
}
