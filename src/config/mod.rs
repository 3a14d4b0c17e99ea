//! # Configuration Module
//!
//! This module handles application configuration loading and management.
//! Configuration can be loaded from:
//! - Environment variables (prefixed with APP__)
//! - Configuration files (config/default.toml, config/{environment}.toml)
//! - .env files (via dotenvy)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use newsfeed_live::config::Settings;
//!
//! let settings = Settings::load()?;
//! println!("Retrying at most {} times", settings.reconnect.max_attempts);
//! ```

mod settings;

pub use settings::*;
