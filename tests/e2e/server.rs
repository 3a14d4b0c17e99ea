//! Local dashboard backend for end-to-end tests.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, RawQuery, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use parking_lot::Mutex;
use serde::Deserialize;
use serde_json::json;
use tokio::net::TcpListener;

use crate::common::dashboard_frame;

#[derive(Default)]
pub struct ServerState {
    pub connections: AtomicUsize,
    pub pings: AtomicUsize,
    pub received: Mutex<Vec<String>>,
    /// Close the first connection right after its greeting
    pub drop_first: AtomicBool,
    /// Raw query strings seen by the feed and search routes
    pub feed_queries: Mutex<Vec<String>>,
    pub search_queries: Mutex<Vec<String>>,
}

#[derive(Deserialize)]
struct TrendsQuery {
    days: u32,
}

#[derive(Deserialize)]
struct SearchQuery {
    query: String,
    #[serde(default)]
    skip: u64,
    #[serde(default = "default_limit")]
    limit: u64,
}

fn default_limit() -> u64 {
    20
}

const SEARCH_TOTAL: u64 = 45;

pub struct TestServer {
    pub addr: SocketAddr,
    pub state: Arc<ServerState>,
}

impl TestServer {
    pub async fn spawn(state: ServerState) -> Self {
        let state = Arc::new(state);
        let app = Router::new()
            .route("/ws", get(ws_handler))
            .route("/api/v1/dashboard/stats", get(stats))
            .route("/api/v1/dashboard/trends", get(trends))
            .route("/api/v1/news/feed", get(feed))
            .route("/api/v1/news/search", get(search))
            .route("/api/v1/news/tags/list", get(tags))
            .with_state(Arc::clone(&state));

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { addr, state }
    }

    pub fn ws_url(&self) -> String {
        format!("ws://{}/ws", self.addr)
    }

    pub fn api_url(&self) -> String {
        format!("http://{}/api/v1", self.addr)
    }
}

async fn ws_handler(ws: WebSocketUpgrade, State(state): State<Arc<ServerState>>) -> Response {
    ws.on_upgrade(move |socket| serve_socket(socket, state))
}

async fn serve_socket(mut socket: WebSocket, state: Arc<ServerState>) {
    let n = state.connections.fetch_add(1, Ordering::SeqCst) + 1;

    // Greet with counters that identify the connection
    let greeting = dashboard_frame(n as u64, n as u64);
    if socket.send(Message::Text(greeting.into())).await.is_err() {
        return;
    }

    if n == 1 && state.drop_first.load(Ordering::SeqCst) {
        let _ = socket.send(Message::Close(None)).await;
        return;
    }

    while let Some(Ok(message)) = socket.recv().await {
        match message {
            Message::Text(text) if text.as_str() == "ping" => {
                state.pings.fetch_add(1, Ordering::SeqCst);
                if socket.send(Message::Text("pong".into())).await.is_err() {
                    return;
                }
            }
            Message::Text(text) => state.received.lock().push(text.as_str().to_owned()),
            Message::Close(_) => return,
            _ => {}
        }
    }
}

async fn stats() -> Json<serde_json::Value> {
    Json(json!({
        "total_news": 1520,
        "today_news": 42,
        "total_pushed": 300,
        "today_pushed": 7,
        "avg_score": 63.4,
        "total_cost_usd": 12.5,
        "monthly_cost_usd": 3.25,
        "active_crawlers": 3,
        "recent_news": [
            {"id": 1, "title": "Rates on hold", "source": "wire", "final_score": 72.5, "created_at": "2024-05-01T10:00:00"}
        ]
    }))
}

/// Built newest day first, then reversed, like the backend.
async fn trends(Query(query): Query<TrendsQuery>) -> Json<serde_json::Value> {
    let mut trends: Vec<_> = (0..query.days)
        .map(|back| {
            json!({
                "date": format!("2024-05-{:02}", 20 - back),
                "count": back * 10,
                "avg_score": 50.0
            })
        })
        .collect();
    trends.reverse();
    Json(json!({ "trends": trends }))
}

async fn feed(
    State(state): State<Arc<ServerState>>,
    RawQuery(query): RawQuery,
) -> Json<serde_json::Value> {
    state.feed_queries.lock().push(query.unwrap_or_default());
    Json(json!({
        "items": [
            {
                "id": 9,
                "title": "AI chip demand climbs",
                "brief_summary": "Orders up again",
                "position_bias": "bullish",
                "position_magnitude": 0.6,
                "decayed_score": 70.0,
                "final_score": 75.0,
                "source": "wire",
                "keywords": ["AI"],
                "categories": ["tech"]
            }
        ],
        "total": 1,
        "has_more": false
    }))
}

/// Search answers `{items, total}` only; paging is left to the caller.
async fn search(
    State(state): State<Arc<ServerState>>,
    RawQuery(raw): RawQuery,
    Query(query): Query<SearchQuery>,
) -> Response {
    state.search_queries.lock().push(raw.unwrap_or_default());
    if query.query.trim().is_empty() {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({"detail": "No results for empty query"})),
        )
            .into_response();
    }
    let end = (query.skip + query.limit).min(SEARCH_TOTAL);
    let items: Vec<_> = (query.skip..end)
        .map(|id| json!({"id": id, "title": format!("{} #{}", query.query, id), "final_score": 55.0}))
        .collect();
    Json(json!({"items": items, "total": SEARCH_TOTAL})).into_response()
}

async fn tags() -> Json<serde_json::Value> {
    Json(json!({"tags": ["AI", "energy", "rates"]}))
}
