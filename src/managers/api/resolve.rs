use crate::errors::BridgeError;
use crate::services::config::{scheme_allowed, ApiDefinition, EndpointSpec};
use crate::services::registry::ApiRegistry;
use crate::utils::template::{fill_path_template, scalar_to_string};
use indexmap::IndexMap;
use reqwest::Method;
use serde_json::{Map, Value};
use url::Url;

/// Call-time arguments shared by every tool.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CallArgs {
    pub params: Map<String, Value>,
    pub data: Option<Value>,
    pub json: Option<Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Json(Value),
    Form(Vec<(String, String)>),
    Text(String),
}

impl RequestBody {
    fn content_type(&self) -> Option<&'static str> {
        match self {
            RequestBody::Json(_) => Some("application/json"),
            RequestBody::Form(_) => Some("application/x-www-form-urlencoded"),
            RequestBody::Text(_) => None,
        }
    }
}

/// Concrete request computed from a tool invocation. Building one never does I/O.
#[derive(Debug, Clone)]
pub struct ResolvedRequest {
    pub api_name: String,
    pub endpoint_name: String,
    pub method: Method,
    pub url: Url,
    pub headers: IndexMap<String, String>,
    pub query: Vec<(String, String)>,
    pub body: Option<RequestBody>,
}

impl ResolvedRequest {
    pub fn url_with_query(&self) -> Url {
        let mut url = self.url.clone();
        if !self.query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in &self.query {
                pairs.append_pair(key, value);
            }
        }
        url
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

pub fn resolve_request(
    registry: &ApiRegistry,
    api_name: &str,
    endpoint_name: &str,
    args: CallArgs,
) -> Result<ResolvedRequest, BridgeError> {
    let api = registry.lookup(api_name)?;
    let endpoint = api
        .endpoints
        .get(endpoint_name)
        .ok_or_else(|| BridgeError::endpoint_not_found(api_name, endpoint_name))?;

    let (path, used_keys) = fill_path_template(
        endpoint.path.as_deref().unwrap_or_default(),
        &args.params,
    );
    let url = join_url(&api.base_url, &path)?;

    let mut params = args.params;
    params.retain(|key, _| !used_keys.contains(key));
    let query = build_query(&params);

    let body = prepare_body(args.data, args.json)?;
    let mut headers = merge_headers(api, endpoint);
    if let Some(content_type) = body.as_ref().and_then(RequestBody::content_type) {
        if !headers.keys().any(|k| k.eq_ignore_ascii_case("content-type")) {
            headers.insert("Content-Type".to_string(), content_type.to_string());
        }
    }

    Ok(ResolvedRequest {
        api_name: api_name.to_string(),
        endpoint_name: endpoint_name.to_string(),
        method: resolve_method(endpoint)?,
        url,
        headers,
        query,
        body,
    })
}

/// RFC 3986 reference resolution: `/users` against `https://h/v1` gives
/// `https://h/users`, while `users` against `https://h/v1/` gives `https://h/v1/users`.
pub fn join_url(base_url: &str, path: &str) -> Result<Url, BridgeError> {
    let base = Url::parse(base_url)
        .map_err(|_| BridgeError::InvalidRequest(format!("Invalid base_url: {}", base_url)))?;
    let joined = base
        .join(path)
        .map_err(|_| BridgeError::InvalidRequest(format!("Invalid endpoint path: {}", path)))?;
    if !scheme_allowed(joined.scheme()) {
        return Err(BridgeError::InvalidRequest(
            "Only http/https URLs are supported".to_string(),
        ));
    }
    Ok(joined)
}

/// API defaults, then bearer token, then endpoint headers; later keys win.
pub fn merge_headers(api: &ApiDefinition, endpoint: &EndpointSpec) -> IndexMap<String, String> {
    let mut merged = IndexMap::new();
    if let Some(defaults) = &api.headers {
        merged.extend(defaults.iter().map(|(k, v)| (k.clone(), v.clone())));
    }
    if let Some(token) = &api.auth_token {
        merged.insert("Authorization".to_string(), format!("Bearer {}", token));
    }
    if let Some(overrides) = &endpoint.headers {
        merged.extend(overrides.iter().map(|(k, v)| (k.clone(), v.clone())));
    }
    merged
}

fn resolve_method(endpoint: &EndpointSpec) -> Result<Method, BridgeError> {
    let raw = endpoint
        .method
        .as_deref()
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .unwrap_or("GET")
        .to_uppercase();
    Method::from_bytes(raw.as_bytes())
        .map_err(|_| BridgeError::InvalidRequest(format!("Invalid HTTP method: {}", raw)))
}

fn build_query(params: &Map<String, Value>) -> Vec<(String, String)> {
    let mut pairs = Vec::new();
    for (key, value) in params {
        match value {
            Value::Null => {}
            Value::Array(items) => {
                for item in items {
                    if let Some(text) = render_value(item) {
                        pairs.push((key.clone(), text));
                    }
                }
            }
            other => {
                if let Some(text) = render_value(other) {
                    pairs.push((key.clone(), text));
                }
            }
        }
    }
    pairs
}

fn render_value(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::Array(_) | Value::Object(_) => Some(value.to_string()),
        scalar => scalar_to_string(scalar),
    }
}

/// `json` takes precedence over `data` when both are supplied.
fn prepare_body(
    data: Option<Value>,
    json: Option<Value>,
) -> Result<Option<RequestBody>, BridgeError> {
    if let Some(json) = json.filter(|v| !v.is_null()) {
        return Ok(Some(RequestBody::Json(json)));
    }
    match data {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Object(map)) => {
            let fields = map
                .iter()
                .filter_map(|(k, v)| render_value(v).map(|text| (k.clone(), text)))
                .collect();
            Ok(Some(RequestBody::Form(fields)))
        }
        Some(Value::String(text)) => Ok(Some(RequestBody::Text(text))),
        Some(_) => Err(BridgeError::InvalidArguments(
            "data must be an object or a string".to_string(),
        )),
    }
}
