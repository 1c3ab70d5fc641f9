#![allow(dead_code)]

use axum::body::Bytes;
use axum::extract::{Path, RawQuery};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::get;
use axum::{Json, Router};
use mcp_api_server::app::App;
use mcp_api_server::services::config::ApiDefinition;
use mcp_api_server::services::logger::{LogLevel, Logger};
use serde_json::{json, Value};
use std::sync::Arc;

pub fn quiet_logger() -> Logger {
    Logger::new("test").with_level(LogLevel::Error)
}

pub fn app_with(definitions: Vec<ApiDefinition>) -> Arc<App> {
    Arc::new(App::initialize(quiet_logger(), definitions).expect("app"))
}

async fn echo(headers: HeaderMap, RawQuery(query): RawQuery, body: Bytes) -> Json<Value> {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };
    Json(json!({
        "content_type": header("content-type"),
        "authorization": header("authorization"),
        "x_api_key": header("x-api-key"),
        "query": query,
        "body": String::from_utf8_lossy(&body),
    }))
}

async fn post_by_id(Path(id): Path<String>) -> Json<Value> {
    Json(json!({ "id": id }))
}

pub fn test_router() -> Router {
    Router::new()
        .route(
            "/posts",
            get(|| async { Json(json!([{"id": 1, "title": "hello"}])) }),
        )
        .route("/posts/{id}", get(post_by_id))
        .route("/plain", get(|| async { "just text" }))
        .route(
            "/missing",
            get(|| async { (StatusCode::NOT_FOUND, "nope") }),
        )
        .route(
            "/broken",
            get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
        )
        .route("/echo", get(echo).post(echo).put(echo))
}

/// Starts the test API on an ephemeral port and returns its base URL.
pub async fn spawn_api() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind");
    let addr = listener.local_addr().expect("addr");
    tokio::spawn(async move {
        axum::serve(listener, test_router()).await.ok();
    });
    format!("http://{}", addr)
}

/// A base URL nothing is listening on.
pub async fn closed_port_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);
    format!("http://{}", addr)
}

/// A base URL that accepts connections and never answers.
pub async fn stalled_api_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind");
    let addr = listener.local_addr().expect("addr");
    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });
    format!("http://{}", addr)
}

/// Parses the JSON payload out of a successful tool result text.
pub fn response_json(text: &str) -> Value {
    let (_, body) = text
        .split_once("Response:\n")
        .unwrap_or_else(|| panic!("no response block in: {}", text));
    serde_json::from_str(body).expect("response must be JSON")
}
