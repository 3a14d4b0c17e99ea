//! REST API Client
//!
//! Typed access to the dashboard and news endpoints of the backend.

use std::time::Duration;

use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::config::{ApiSettings, ChannelSettings};
use crate::domain::dashboard::{DashboardStats, FeedItem, FeedPage, TrendPoint};
use crate::domain::filters::FeedFilters;
use crate::shared::error::AppError;

/// Client for the dashboard backend.
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: Url,
}

#[derive(Deserialize)]
struct TrendsResponse {
    trends: Vec<TrendPoint>,
}

#[derive(Deserialize)]
struct TagsResponse {
    #[serde(default)]
    tags: Vec<String>,
}

/// Search results carry no `has_more`; it is derived from the window.
#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<FeedItem>,
    #[serde(default)]
    total: u64,
}

impl SearchResponse {
    fn into_page(self, skip: u64, limit: u64) -> FeedPage {
        FeedPage {
            has_more: skip.saturating_add(limit) < self.total,
            items: self.items,
            total: self.total,
        }
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    detail: String,
}

impl ApiClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, AppError> {
        // A trailing slash keeps Url::join from dropping the last segment
        let normalized = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalized)
            .map_err(|e| AppError::Endpoint(format!("{}: {}", base_url, e)))?;
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self { http, base_url })
    }

    /// Build from settings; the base URL defaults to `<origin>/api/v1`.
    pub fn from_settings(api: &ApiSettings, channel: &ChannelSettings) -> Result<Self, AppError> {
        let base = match api.base_url.as_deref() {
            Some(url) => url.to_string(),
            None => format!("{}/api/v1", channel.origin.trim_end_matches('/')),
        };
        Self::new(&base, api.timeout())
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// `GET /dashboard/stats`
    pub async fn dashboard_stats(&self) -> Result<DashboardStats, AppError> {
        self.get("dashboard/stats", &[]).await
    }

    /// `GET /dashboard/trends?days=N`, oldest day first.
    pub async fn dashboard_trends(&self, days: u32) -> Result<Vec<TrendPoint>, AppError> {
        let response: TrendsResponse = self
            .get("dashboard/trends", &[("days", days.to_string())])
            .await?;
        Ok(response.trends)
    }

    /// `GET /news/feed` with the given filter selection.
    pub async fn news_feed(
        &self,
        offset: u64,
        limit: u64,
        filters: &FeedFilters,
    ) -> Result<FeedPage, AppError> {
        let mut query = vec![("offset", offset.to_string()), ("limit", limit.to_string())];
        query.extend(filters.query_pairs());
        self.get("news/feed", &query).await
    }

    /// `GET /news/search?query&skip&limit`
    pub async fn search_news(&self, query: &str, skip: u64, limit: u64) -> Result<FeedPage, AppError> {
        let params = [
            ("query", query.to_string()),
            ("skip", skip.to_string()),
            ("limit", limit.to_string()),
        ];
        let response: SearchResponse = self.get("news/search", &params).await?;
        Ok(response.into_page(skip, limit))
    }

    /// `GET /news/tags/list`
    pub async fn tags(&self) -> Result<Vec<String>, AppError> {
        let response: TagsResponse = self.get("news/tags/list", &[]).await?;
        Ok(response.tags)
    }

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, AppError> {
        let url = self
            .base_url
            .join(path)
            .map_err(|e| AppError::Endpoint(format!("{}: {}", path, e)))?;

        tracing::debug!(url = %url, "GET");
        let response = self.http.get(url).query(query).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorBody>(&body)
                .map(|b| b.detail)
                .unwrap_or(body);
            return Err(AppError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.json::<T>().await?)
    }
}
