mod common;
use common::{app_with, closed_port_url, quiet_logger, response_json, spawn_api, stalled_api_url};

use indexmap::IndexMap;
use mcp_api_server::managers::api::{ApiManager, HttpExecutor};
use mcp_api_server::mcp::dispatch::call_tool;
use mcp_api_server::services::config::{ApiDefinition, EndpointSpec};
use mcp_api_server::services::registry::ApiRegistry;
use serde_json::{json, Value};
use std::time::{Duration, Instant};

fn headers(pairs: &[(&str, &str)]) -> IndexMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn svc(base_url: &str) -> ApiDefinition {
    ApiDefinition::new("svc", base_url)
        .with_endpoint("posts", EndpointSpec::new("/posts", "GET", "List posts"))
        .with_endpoint("post", EndpointSpec::new("/posts/{post_id}", "GET", "One post"))
        .with_endpoint("plain", EndpointSpec::new("/plain", "GET", "Plain text"))
        .with_endpoint("missing", EndpointSpec::new("/missing", "GET", "Gone"))
        .with_endpoint("broken", EndpointSpec::new("/broken", "GET", "Fails"))
        .with_endpoint("echo", EndpointSpec::new("/echo", "post", "Echo"))
}

#[tokio::test]
async fn json_endpoint_returns_pretty_printed_body() {
    let base = spawn_api().await;
    let app = app_with(vec![svc(&base)]);

    let text = app.call_tool("svc_posts", json!({})).await;

    assert!(text.starts_with("API call successful!"), "{}", text);
    assert!(text.contains("Status: 200"), "{}", text);
    let expected = json!([{"id": 1, "title": "hello"}]);
    let pretty = serde_json::to_string_pretty(&expected).expect("pretty");
    assert!(text.ends_with(&pretty), "{}", text);
}

#[tokio::test]
async fn text_endpoint_returns_raw_text() {
    let base = spawn_api().await;
    let app = app_with(vec![svc(&base)]);

    let text = app.call_tool("svc_plain", Value::Null).await;

    assert!(text.starts_with("API call successful!"), "{}", text);
    assert_eq!(response_json(&text), json!("just text"));
}

#[tokio::test]
async fn generic_tool_reaches_the_same_endpoint() {
    let base = spawn_api().await;
    let app = app_with(vec![svc(&base)]);

    let text = app
        .call_tool(
            "call_api",
            json!({"api_name": "svc", "endpoint_name": "post", "params": {"post_id": 42}}),
        )
        .await;

    assert!(text.starts_with("API call successful!"), "{}", text);
    assert_eq!(response_json(&text), json!({"id": "42"}));
}

#[tokio::test]
async fn http_error_status_is_reported_with_code() {
    let base = spawn_api().await;
    let app = app_with(vec![svc(&base)]);

    let text = app.call_tool("svc_missing", json!({})).await;
    assert!(text.starts_with("API call failed!"), "{}", text);
    assert!(text.contains("Status: 404"), "{}", text);
    assert!(text.contains("Error: HTTP error: "), "{}", text);

    let text = app.call_tool("svc_broken", json!({})).await;
    assert!(text.contains("Status: 500"), "{}", text);
}

#[tokio::test]
async fn connection_failure_is_reported_with_zero_status() {
    let base = closed_port_url().await;
    let app = app_with(vec![svc(&base)]);

    let text = app.call_tool("svc_posts", json!({})).await;

    assert!(text.starts_with("API call failed!"), "{}", text);
    assert!(text.contains("Status: 0"), "{}", text);
    assert!(text.contains("Error: Request failed: "), "{}", text);
}

#[tokio::test]
async fn slow_remote_times_out_as_transport_failure() {
    let base = stalled_api_url().await;
    let logger = quiet_logger();
    let registry = ApiRegistry::from_definitions(logger.clone(), vec![svc(&base)]);
    let executor =
        HttpExecutor::with_timeout(logger.clone(), Duration::from_millis(300)).expect("client");
    let manager = ApiManager::with_executor(logger.clone(), registry, executor);

    let started = Instant::now();
    let text = call_tool(&manager, &logger, "svc_posts", json!({})).await;

    assert!(started.elapsed() < Duration::from_secs(10));
    assert!(text.starts_with("API call failed!"), "{}", text);
    assert!(text.contains("Status: 0"), "{}", text);
    assert!(
        text.contains("Error: Request failed: request timed out"),
        "{}",
        text
    );
}

#[tokio::test]
async fn unknown_api_and_endpoint_are_text_not_faults() {
    let base = spawn_api().await;
    let app = app_with(vec![svc(&base)]);

    let text = app
        .call_tool("call_api", json!({"api_name": "ghost", "endpoint_name": "x"}))
        .await;
    assert_eq!(text, "Error calling API: API 'ghost' not found");

    let text = app.call_tool("svc_nothing", json!({})).await;
    assert_eq!(
        text,
        "Error calling API: Endpoint 'nothing' not found in API 'svc'"
    );

    let text = app.call_tool("nounderscore", json!({})).await;
    assert_eq!(text, "Error calling API: Invalid tool name format: nounderscore");
}

#[tokio::test]
async fn json_body_takes_precedence_over_data() {
    let base = spawn_api().await;
    let app = app_with(vec![svc(&base)]);

    let text = app
        .call_tool(
            "svc_echo",
            json!({"data": {"field": "form"}, "json": {"title": "x"}}),
        )
        .await;

    let echoed = response_json(&text);
    assert_eq!(echoed["content_type"], "application/json");
    let sent: Value = serde_json::from_str(echoed["body"].as_str().expect("body")).expect("json");
    assert_eq!(sent, json!({"title": "x"}));
}

#[tokio::test]
async fn data_is_form_encoded() {
    let base = spawn_api().await;
    let app = app_with(vec![svc(&base)]);

    let text = app
        .call_tool("svc_echo", json!({"data": {"a": 1, "b": "x y"}}))
        .await;

    let echoed = response_json(&text);
    assert_eq!(echoed["content_type"], "application/x-www-form-urlencoded");
    assert_eq!(echoed["body"], "a=1&b=x+y");
}

#[tokio::test]
async fn headers_auth_and_query_reach_the_remote() {
    let base = spawn_api().await;
    let api = ApiDefinition::new("secure", &base)
        .with_headers(headers(&[("X-API-Key", "k1")]))
        .with_auth_token("tok")
        .with_endpoint(
            "echo",
            EndpointSpec::new("/echo", "GET", "Echo").with_headers(headers(&[("X-API-Key", "k2")])),
        );
    let app = app_with(vec![api]);

    let text = app
        .call_tool("secure_echo", json!({"params": {"_limit": 5, "q": "a b"}}))
        .await;

    let echoed = response_json(&text);
    assert_eq!(echoed["authorization"], "Bearer tok");
    assert_eq!(echoed["x_api_key"], "k2");
    assert_eq!(echoed["query"], "_limit=5&q=a+b");
    assert_eq!(echoed["content_type"], Value::Null);
}

#[tokio::test]
async fn concurrent_calls_share_the_client() {
    let base = spawn_api().await;
    let app = app_with(vec![svc(&base)]);

    let calls: Vec<_> = (0..8)
        .map(|i| {
            let app = app.clone();
            tokio::spawn(async move {
                app.call_tool("svc_post", json!({"params": {"post_id": i}}))
                    .await
            })
        })
        .collect();
    for (i, handle) in calls.into_iter().enumerate() {
        let text = handle.await.expect("join");
        assert_eq!(response_json(&text), json!({"id": i.to_string()}));
    }
}
