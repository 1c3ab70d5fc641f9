use crate::constants::protocols::ALLOWED_HTTP;
use crate::errors::BridgeError;
use indexmap::IndexMap;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::Path;
use url::Url;

/// One callable operation of a registered API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EndpointSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<IndexMap<String, String>>,
    /// Keys the bridge does not interpret; echoed back by resource reads.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl EndpointSpec {
    pub fn new(path: &str, method: &str, description: &str) -> Self {
        Self {
            path: Some(path.to_string()),
            method: Some(method.to_string()),
            description: Some(description.to_string()),
            headers: None,
            extra: Map::new(),
        }
    }

    pub fn with_headers(mut self, headers: IndexMap<String, String>) -> Self {
        self.headers = Some(headers);
        self
    }
}

/// Static description of one API: base address, endpoints, default headers and auth.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiDefinition {
    pub name: String,
    pub base_url: String,
    #[serde(default)]
    pub endpoints: IndexMap<String, EndpointSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<IndexMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_token: Option<String>,
}

impl ApiDefinition {
    pub fn new(name: &str, base_url: &str) -> Self {
        Self {
            name: name.to_string(),
            base_url: base_url.to_string(),
            endpoints: IndexMap::new(),
            headers: None,
            auth_token: None,
        }
    }

    pub fn with_endpoint(mut self, name: &str, spec: EndpointSpec) -> Self {
        self.endpoints.insert(name.to_string(), spec);
        self
    }

    pub fn with_headers(mut self, headers: IndexMap<String, String>) -> Self {
        self.headers = Some(headers);
        self
    }

    pub fn with_auth_token(mut self, token: &str) -> Self {
        self.auth_token = Some(token.to_string());
        self
    }

    pub fn validate(&self) -> Result<(), BridgeError> {
        if self.name.trim().is_empty() {
            return Err(BridgeError::Config("API name must not be empty".to_string()));
        }
        let parsed = Url::parse(&self.base_url).map_err(|err| {
            BridgeError::Config(format!(
                "API '{}' has an invalid base_url '{}': {}",
                self.name, self.base_url, err
            ))
        })?;
        if !scheme_allowed(parsed.scheme()) {
            return Err(BridgeError::Config(format!(
                "API '{}' base_url must use http or https",
                self.name
            )));
        }
        if parsed.cannot_be_a_base() {
            return Err(BridgeError::Config(format!(
                "API '{}' base_url is not an absolute URL",
                self.name
            )));
        }
        Ok(())
    }
}

pub(crate) fn scheme_allowed(scheme: &str) -> bool {
    let normalized = format!("{}:", scheme.trim_end_matches(':').to_lowercase());
    ALLOWED_HTTP.contains(&normalized.as_str())
}

static SAMPLE_APIS: Lazy<Vec<ApiDefinition>> = Lazy::new(|| {
    let raw = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/sample_apis.json"));
    serde_json::from_str(raw).expect("sample_apis.json must be valid")
});

pub fn sample_definitions() -> Vec<ApiDefinition> {
    SAMPLE_APIS.clone()
}

pub fn parse_definitions(raw: &str) -> Result<Vec<ApiDefinition>, BridgeError> {
    let definitions: Vec<ApiDefinition> = serde_json::from_str(raw)
        .map_err(|err| BridgeError::Config(format!("invalid API configuration: {}", err)))?;
    for definition in &definitions {
        definition.validate()?;
    }
    Ok(definitions)
}

/// Reads definitions from a JSON file, or falls back to the bundled samples.
pub fn load_definitions(path: Option<&Path>) -> Result<Vec<ApiDefinition>, BridgeError> {
    let Some(path) = path else {
        return Ok(sample_definitions());
    };
    let raw = std::fs::read_to_string(path).map_err(|err| {
        BridgeError::Config(format!("failed to read {}: {}", path.display(), err))
    })?;
    parse_definitions(&raw)
}
