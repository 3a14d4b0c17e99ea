//! Application settings and configuration structures.

use std::time::Duration;

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

/// Root configuration structure containing all application settings.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Live channel endpoint configuration
    pub channel: ChannelSettings,

    /// Reconnection backoff policy
    pub reconnect: ReconnectSettings,

    /// Heartbeat (keepalive) configuration
    pub heartbeat: HeartbeatSettings,

    /// Local key/value storage
    pub storage: StorageSettings,

    /// REST API client configuration
    pub api: ApiSettings,

    /// Current environment (development, staging, production)
    pub environment: String,
}

/// Live channel endpoint configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ChannelSettings {
    /// Origin of the dashboard page (e.g., "https://news.example.com")
    pub origin: String,

    /// Explicit WebSocket URL, bypassing origin-based selection
    #[serde(default)]
    pub url: Option<String>,

    /// Backend port used in development builds
    pub dev_port: u16,

    /// Well-known path of the live endpoint
    pub path: String,

    /// Upper bound for a single connection attempt in milliseconds
    pub connect_timeout_ms: u64,

    /// Upper bound for the close handshake on stop in milliseconds
    pub close_timeout_ms: u64,
}

/// Reconnection backoff configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ReconnectSettings {
    /// Delay before the first retry in milliseconds (default: 2000)
    pub base_delay_ms: u64,

    /// Multiplier applied per consecutive failure (default: 1.5)
    pub growth_factor: f64,

    /// Cap on any single delay in milliseconds (default: 30000)
    pub max_delay_ms: u64,

    /// Retries before giving up permanently (default: 10)
    pub max_attempts: u32,
}

/// Heartbeat configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct HeartbeatSettings {
    /// Interval between `ping` frames in milliseconds (default: 30000)
    pub interval_ms: u64,
}

/// Local storage configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageSettings {
    /// Path of the JSON key/value file
    pub path: String,
}

/// REST API client configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiSettings {
    /// Base URL of the REST API; derived from the origin when absent
    #[serde(default)]
    pub base_url: Option<String>,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Settings {
    /// Load settings from environment variables and configuration files.
    ///
    /// The loading order is:
    /// 1. config/default.toml (base configuration)
    /// 2. config/{RUN_ENV}.toml (environment-specific overrides)
    /// 3. Environment variables (highest priority)
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if configuration cannot be loaded or parsed,
    /// or if the reconnect/heartbeat values are inconsistent.
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let environment = std::env::var("RUN_ENV").unwrap_or_else(|_| "development".into());

        Self::builder(&environment)?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // APP__RECONNECT__MAX_ATTEMPTS=5 -> reconnect.max_attempts = 5
            .add_source(
                Environment::default()
                    .prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_override_option("channel.origin", std::env::var("DASHBOARD_ORIGIN").ok())?
            .set_override_option("channel.url", std::env::var("LIVE_CHANNEL_URL").ok())?
            .set_override_option("api.base_url", std::env::var("API_BASE_URL").ok())?
            .build()?
            .try_deserialize()
            .and_then(Self::validate)
    }

    /// Settings built from defaults only, for the given environment.
    pub fn defaults(environment: &str) -> Result<Self, ConfigError> {
        Self::builder(environment)?
            .build()?
            .try_deserialize()
            .and_then(Self::validate)
    }

    fn builder(
        environment: &str,
    ) -> Result<config::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
        Config::builder()
            .set_default("environment", environment)?
            .set_default("channel.origin", "http://localhost:5173")?
            .set_default("channel.dev_port", 8000)?
            .set_default("channel.path", "/ws")?
            .set_default("channel.connect_timeout_ms", 10_000_i64)?
            .set_default("channel.close_timeout_ms", 1_000_i64)?
            .set_default("reconnect.base_delay_ms", 2_000_i64)?
            .set_default("reconnect.growth_factor", 1.5)?
            .set_default("reconnect.max_delay_ms", 30_000_i64)?
            .set_default("reconnect.max_attempts", 10)?
            .set_default("heartbeat.interval_ms", 30_000_i64)?
            .set_default("storage.path", ".newsfeed/local_storage.json")?
            .set_default("api.timeout_secs", 15)
    }

    fn validate(self) -> Result<Self, ConfigError> {
        let r = &self.reconnect;
        if r.base_delay_ms == 0 {
            return Err(ConfigError::Message(
                "reconnect.base_delay_ms must be greater than zero".into(),
            ));
        }
        if !(r.growth_factor >= 1.0) {
            return Err(ConfigError::Message(format!(
                "reconnect.growth_factor must be at least 1.0, got {}",
                r.growth_factor
            )));
        }
        if r.max_delay_ms < r.base_delay_ms {
            return Err(ConfigError::Message(format!(
                "reconnect.max_delay_ms ({}) must not be below base_delay_ms ({})",
                r.max_delay_ms, r.base_delay_ms
            )));
        }
        if self.heartbeat.interval_ms == 0 {
            return Err(ConfigError::Message(
                "heartbeat.interval_ms must be greater than zero".into(),
            ));
        }
        Ok(self)
    }

    /// Whether this is a local development configuration.
    pub fn is_development(&self) -> bool {
        self.environment.eq_ignore_ascii_case("development")
    }
}

impl ChannelSettings {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn close_timeout(&self) -> Duration {
        Duration::from_millis(self.close_timeout_ms)
    }
}

impl HeartbeatSettings {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

impl ApiSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
