use crate::constants::resources::{INFO_SEGMENT, MIME_TYPE, SCHEME};
use crate::errors::BridgeError;
use crate::services::registry::ApiRegistry;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResourceDef {
    pub uri: String,
    pub name: String,
    pub description: String,
    #[serde(rename = "mimeType")]
    pub mime_type: String,
}

pub fn info_uri(api_name: &str) -> String {
    format!("{}{}/{}", SCHEME, api_name, INFO_SEGMENT)
}

pub fn list_resources(registry: &ApiRegistry) -> Vec<ResourceDef> {
    registry
        .list()
        .map(|(name, _)| ResourceDef {
            uri: info_uri(name),
            name: format!("{} API Info", name),
            description: format!("Information about the {} API endpoints", name),
            mime_type: MIME_TYPE.to_string(),
        })
        .collect()
}

/// Pretty-printed `{name, base_url, endpoints}` for `api://<api>/info`.
pub fn read_resource(registry: &ApiRegistry, uri: &str) -> Result<String, BridgeError> {
    let api_name = uri
        .strip_prefix(SCHEME)
        .and_then(|rest| {
            let mut parts = rest.split('/');
            let name = parts.next()?;
            (parts.next()? == INFO_SEGMENT).then_some(name)
        })
        .ok_or_else(|| BridgeError::unknown_resource(uri))?;
    let api = registry
        .lookup(api_name)
        .map_err(|_| BridgeError::unknown_resource(uri))?;
    let body = serde_json::json!({
        "name": api.name,
        "base_url": api.base_url,
        "endpoints": api.endpoints,
    });
    serde_json::to_string_pretty(&body)
        .map_err(|err| BridgeError::InvalidRequest(format!("failed to render {}: {}", uri, err)))
}
