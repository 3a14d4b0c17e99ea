//! Dashboard and news-feed payloads.
//!
//! Shapes shared by the pushed `dashboard_update` message and the REST
//! endpoints the dashboard reads.

use serde::{Deserialize, Serialize};

/// Headline counters shown on the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardStats {
    pub total_news: u64,
    pub today_news: u64,
    #[serde(default)]
    pub total_pushed: u64,
    #[serde(default)]
    pub today_pushed: u64,
    #[serde(default)]
    pub avg_score: f64,
    #[serde(default)]
    pub total_cost_usd: f64,
    #[serde(default)]
    pub monthly_cost_usd: f64,
    #[serde(default)]
    pub active_crawlers: u64,
    #[serde(default)]
    pub recent_news: Vec<NewsItem>,
}

/// A news item as listed on the dashboard and in search results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsItem {
    pub id: i64,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub final_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crawled_at: Option<String>,
}

/// Position bias assigned by the scoring backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PositionBias {
    Bullish,
    Bearish,
    #[default]
    Neutral,
}

/// One entry of the personalised feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedItem {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub brief_summary: String,
    #[serde(default)]
    pub position_bias: PositionBias,
    #[serde(default)]
    pub position_magnitude: f64,
    #[serde(default)]
    pub decayed_score: f64,
    #[serde(default)]
    pub final_score: f64,
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub published_at: Option<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub categories: Vec<String>,
}

/// A page of feed results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedPage {
    pub items: Vec<FeedItem>,
    pub total: u64,
    pub has_more: bool,
}

/// Daily count and mean score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendPoint {
    pub date: String,
    pub count: u64,
    pub avg_score: f64,
}
