use crate::constants::tools::{GENERIC_TOOL, SEPARATOR};
use crate::services::registry::ApiRegistry;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDef {
    pub name: String,
    pub description: String,
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
}

static ENDPOINT_TOOL_SCHEMA: Lazy<Value> = Lazy::new(|| {
    json!({
        "type": "object",
        "properties": {
            "params": {
                "type": "object",
                "description": "Query parameters for the API call"
            },
            "data": {
                "type": "object",
                "description": "Request body data (for POST/PUT requests)"
            },
            "json": {
                "type": "object",
                "description": "JSON data for the request"
            }
        }
    })
});

static CALL_API_TOOL: Lazy<ToolDef> = Lazy::new(|| ToolDef {
    name: GENERIC_TOOL.to_string(),
    description: "Make a direct API call to any registered endpoint".to_string(),
    input_schema: json!({
        "type": "object",
        "properties": {
            "api_name": {
                "type": "string",
                "description": "Name of the API to call"
            },
            "endpoint_name": {
                "type": "string",
                "description": "Name of the endpoint to call"
            },
            "params": {
                "type": "object",
                "description": "Query parameters"
            },
            "data": {
                "type": "object",
                "description": "Request body data"
            },
            "json": {
                "type": "object",
                "description": "JSON data for the request"
            }
        },
        "required": ["api_name", "endpoint_name"]
    }),
});

/// `api_name` + separator + `endpoint_name`. Not reversible when `api_name`
/// itself contains the separator.
pub fn tool_identifier(api_name: &str, endpoint_name: &str) -> String {
    format!("{}{}{}", api_name, SEPARATOR, endpoint_name)
}

pub fn call_api_tool() -> &'static ToolDef {
    &CALL_API_TOOL
}

/// One tool per API endpoint in registration order, then `call_api`.
pub fn build_tool_catalog(registry: &ApiRegistry) -> Vec<ToolDef> {
    let mut tools = Vec::new();
    for (api_name, api) in registry.list() {
        for (endpoint_name, endpoint) in &api.endpoints {
            let summary = endpoint
                .description
                .as_deref()
                .unwrap_or(endpoint_name.as_str());
            tools.push(ToolDef {
                name: tool_identifier(api_name, endpoint_name),
                description: format!("{}: {}", api_name, summary),
                input_schema: ENDPOINT_TOOL_SCHEMA.clone(),
            });
        }
    }
    tools.push(call_api_tool().clone());
    tools
}
