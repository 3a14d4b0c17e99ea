//! Live channel endpoint selection.

use reqwest::Url;

use crate::config::ChannelSettings;
use crate::shared::error::AppError;

/// Resolve the WebSocket URL for the live channel.
///
/// An explicit `channel.url` wins. Otherwise the scheme mirrors the page
/// origin (`https` → `wss`) and the host is the origin's host, or its
/// hostname on `dev_port` in development.
pub fn resolve_endpoint(channel: &ChannelSettings, development: bool) -> Result<String, AppError> {
    if let Some(url) = channel.url.as_deref().filter(|u| !u.trim().is_empty()) {
        let parsed = Url::parse(url).map_err(|e| AppError::Endpoint(format!("{}: {}", url, e)))?;
        return match parsed.scheme() {
            "ws" | "wss" => Ok(parsed.to_string()),
            other => Err(AppError::Endpoint(format!(
                "unsupported scheme '{}' in {}",
                other, url
            ))),
        };
    }

    let origin = Url::parse(&channel.origin)
        .map_err(|e| AppError::Endpoint(format!("{}: {}", channel.origin, e)))?;

    let scheme = match origin.scheme() {
        "https" => "wss",
        "http" => "ws",
        other => {
            return Err(AppError::Endpoint(format!(
                "origin scheme '{}' is not http(s)",
                other
            )))
        }
    };

    let hostname = origin
        .host_str()
        .ok_or_else(|| AppError::Endpoint(format!("origin {} has no host", channel.origin)))?;

    let host = if development {
        format!("{}:{}", hostname, channel.dev_port)
    } else {
        match origin.port() {
            Some(port) => format!("{}:{}", hostname, port),
            None => hostname.to_string(),
        }
    };

    let path = if channel.path.starts_with('/') {
        channel.path.clone()
    } else {
        format!("/{}", channel.path)
    };

    Ok(format!("{}://{}{}", scheme, host, path))
}
