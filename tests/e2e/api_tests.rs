//! REST client against the local backend.

use std::time::Duration;

use pretty_assertions::assert_eq;
use reqwest::Url;

use newsfeed_live::domain::dashboard::PositionBias;
use newsfeed_live::domain::filters::FeedFilters;
use newsfeed_live::infrastructure::api::ApiClient;
use newsfeed_live::shared::error::AppError;

use super::server::{ServerState, TestServer};

async fn client() -> (TestServer, ApiClient) {
    let server = TestServer::spawn(ServerState::default()).await;
    let client = ApiClient::new(&server.api_url(), Duration::from_secs(5)).unwrap();
    (server, client)
}

/// Decoded `(key, value)` pairs of a recorded query string, in order.
fn pairs(raw: &str) -> Vec<(String, String)> {
    Url::parse(&format!("http://backend/?{}", raw))
        .unwrap()
        .query_pairs()
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect()
}

fn pair(key: &str, value: &str) -> (String, String) {
    (key.to_string(), value.to_string())
}

#[tokio::test]
async fn test_dashboard_stats() {
    let (_server, client) = client().await;

    let stats = client.dashboard_stats().await.unwrap();
    assert_eq!(stats.total_news, 1520);
    assert_eq!(stats.today_pushed, 7);
    assert_eq!(stats.active_crawlers, 3);
    assert_eq!(stats.recent_news.len(), 1);
    assert_eq!(stats.recent_news[0].title, "Rates on hold");
}

#[tokio::test]
async fn test_dashboard_trends_are_oldest_day_first() {
    let (_server, client) = client().await;

    let trends = client.dashboard_trends(7).await.unwrap();
    assert_eq!(trends.len(), 7);
    assert_eq!(trends[0].date, "2024-05-14");
    assert_eq!(trends[6].date, "2024-05-20");
    assert_eq!(trends[0].count, 60);
    assert_eq!(trends[6].count, 0);
    assert!(trends.windows(2).all(|w| w[0].date < w[1].date));
}

#[tokio::test]
async fn test_news_feed_sends_filters() {
    let (server, client) = client().await;
    let filters = FeedFilters {
        keywords: Some(vec!["AI".to_string(), "chips".to_string()]),
        categories: None,
        sources: Some(Vec::new()),
        min_score: Some(40.0),
        max_score: Some(100.0),
    };

    let page = client.news_feed(20, 10, &filters).await.unwrap();
    assert_eq!(page.total, 1);
    assert!(!page.has_more);
    assert_eq!(page.items[0].position_bias, PositionBias::Bullish);
    assert_eq!(page.items[0].keywords, vec!["AI"]);

    let queries = server.state.feed_queries.lock().clone();
    assert_eq!(queries.len(), 1);
    assert_eq!(
        pairs(&queries[0]),
        vec![
            pair("offset", "20"),
            pair("limit", "10"),
            pair("keywords[]", "AI"),
            pair("keywords[]", "chips"),
            pair("minScore", "40"),
            pair("maxScore", "100"),
        ]
    );
}

#[tokio::test]
async fn test_tags_are_unwrapped_from_envelope() {
    let (_server, client) = client().await;
    assert_eq!(client.tags().await.unwrap(), vec!["AI", "energy", "rates"]);
}

#[tokio::test]
async fn test_search_derives_has_more_from_total() {
    let (server, client) = client().await;

    let first = client.search_news("rates", 0, 20).await.unwrap();
    assert_eq!(first.total, 45);
    assert_eq!(first.items.len(), 20);
    assert!(first.has_more);

    let last = client.search_news("rates", 40, 20).await.unwrap();
    assert_eq!(last.items.len(), 5);
    assert!(!last.has_more);

    let queries = server.state.search_queries.lock().clone();
    assert_eq!(
        pairs(&queries[0]),
        vec![pair("query", "rates"), pair("skip", "0"), pair("limit", "20")]
    );
}

#[tokio::test]
async fn test_error_detail_is_surfaced() {
    let (_server, client) = client().await;

    let err = client.search_news("  ", 0, 20).await.unwrap_err();
    match err {
        AppError::Api { status, message } => {
            assert_eq!(status, 404);
            assert_eq!(message, "No results for empty query");
        }
        other => panic!("expected API error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_unreachable_backend_is_transient() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = ApiClient::new(&format!("http://{}/api/v1", addr), Duration::from_secs(2)).unwrap();
    let err = client.dashboard_stats().await.unwrap_err();
    assert!(matches!(err, AppError::Http(_)));
    assert!(err.is_transient());
}
