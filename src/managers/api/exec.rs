use crate::constants::network;
use crate::errors::BridgeError;
use crate::managers::api::resolve::{RequestBody, ResolvedRequest};
use crate::services::logger::Logger;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use std::error::Error as _;
use std::time::{Duration, Instant};

/// Normalized outcome of one outbound call. `status_code` is 0 when no
/// response was obtained.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CallResult {
    pub success: bool,
    pub status_code: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CallResult {
    pub fn ok(status_code: u16, data: Value) -> Self {
        Self {
            success: true,
            status_code,
            data: Some(data),
            error: None,
        }
    }

    pub fn transport_failure(message: impl std::fmt::Display) -> Self {
        Self {
            success: false,
            status_code: 0,
            data: None,
            error: Some(format!("Request failed: {}", message)),
        }
    }

    pub fn http_failure(status_code: u16, message: impl std::fmt::Display) -> Self {
        Self {
            success: false,
            status_code,
            data: None,
            error: Some(format!("HTTP error: {}", message)),
        }
    }
}

/// Shared outbound client. Cloning is cheap and clones share one connection pool.
#[derive(Debug, Clone)]
pub struct HttpExecutor {
    logger: Logger,
    client: Client,
    timeout: Duration,
}

impl HttpExecutor {
    pub fn new(logger: Logger) -> Result<Self, BridgeError> {
        Self::with_timeout(
            logger,
            Duration::from_millis(network::TIMEOUT_API_REQUEST_MS),
        )
    }

    pub fn with_timeout(logger: Logger, timeout: Duration) -> Result<Self, BridgeError> {
        let client = Client::builder()
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::limited(network::MAX_REDIRECTS))
            .user_agent(network::USER_AGENT)
            .build()
            .map_err(|err| {
                BridgeError::Config(format!("Failed to build HTTP client: {}", err))
            })?;
        Ok(Self {
            logger: logger.child("http"),
            client,
            timeout,
        })
    }

    /// Issues the request. Transport and status failures come back as data;
    /// only an unbuildable request is an `Err`.
    pub async fn execute(&self, request: &ResolvedRequest) -> Result<CallResult, BridgeError> {
        let mut builder = self
            .client
            .request(request.method.clone(), request.url_with_query())
            .headers(headers_to_headermap(request)?);
        builder = match &request.body {
            Some(RequestBody::Json(value)) => builder.json(value),
            Some(RequestBody::Form(fields)) => {
                let encoded = serde_urlencoded::to_string(fields).map_err(|err| {
                    BridgeError::InvalidArguments(format!("data could not be form-encoded: {}", err))
                })?;
                builder.body(encoded)
            }
            Some(RequestBody::Text(text)) => builder.body(text.clone()),
            None => builder,
        };

        let started = Instant::now();
        let meta = |status: u16| {
            serde_json::json!({
                "api": request.api_name,
                "endpoint": request.endpoint_name,
                "method": request.method.as_str(),
                "status": status,
                "duration_ms": started.elapsed().as_millis() as u64,
            })
        };

        let response = match builder.send().await {
            Ok(response) => response,
            Err(err) => {
                self.logger.warn("HTTP request failed", Some(&meta(0)));
                return Ok(CallResult::transport_failure(describe_transport_error(
                    &err,
                    self.timeout,
                )));
            }
        };

        let status = response.status().as_u16();
        if let Err(err) = response.error_for_status_ref() {
            self.logger.warn("HTTP error status", Some(&meta(status)));
            return Ok(CallResult::http_failure(status, err));
        }

        let text = match response.text().await {
            Ok(text) => text,
            Err(err) => {
                self.logger.warn("HTTP body read failed", Some(&meta(status)));
                return Ok(CallResult::transport_failure(describe_transport_error(
                    &err,
                    self.timeout,
                )));
            }
        };
        self.logger.debug("HTTP request completed", Some(&meta(status)));
        Ok(CallResult::ok(status, parse_body(text)))
    }
}

/// JSON when the body parses as JSON, otherwise the raw text.
pub fn parse_body(text: String) -> Value {
    match serde_json::from_str::<Value>(&text) {
        Ok(value) => value,
        Err(_) => Value::String(text),
    }
}

fn describe_transport_error(err: &reqwest::Error, timeout: Duration) -> String {
    if err.is_timeout() {
        return format!("request timed out after {}s", timeout.as_secs_f64());
    }
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = cause.source();
    }
    message
}

fn headers_to_headermap(request: &ResolvedRequest) -> Result<HeaderMap, BridgeError> {
    let mut map = HeaderMap::new();
    for (key, value) in &request.headers {
        let name = HeaderName::from_bytes(key.as_bytes())
            .map_err(|_| BridgeError::InvalidRequest(format!("Invalid header name: {}", key)))?;
        let val = HeaderValue::from_str(value).map_err(|_| {
            BridgeError::InvalidRequest(format!("Invalid value for header {}", key))
        })?;
        map.insert(name, val);
    }
    Ok(map)
}
