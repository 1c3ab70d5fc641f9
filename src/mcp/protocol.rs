use crate::errors::McpError;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

#[derive(Debug, Deserialize)]
pub struct JsonRpcRequest {
    #[serde(default)]
    pub jsonrpc: Option<String>,
    /// `None` only when the member is absent; an explicit `null` id still gets a reply.
    #[serde(default, deserialize_with = "present_id")]
    pub id: Option<Value>,
    pub method: String,
    #[serde(default)]
    pub params: Value,
}

fn present_id<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

impl JsonRpcRequest {
    pub fn is_notification(&self) -> bool {
        self.id.is_none()
    }

    pub fn param_str(&self, key: &str) -> Option<&str> {
        self.params.get(key).and_then(Value::as_str)
    }
}

#[derive(Debug, Serialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    pub id: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

#[derive(Debug, Serialize)]
pub struct JsonRpcError {
    pub code: i32,
    pub message: String,
}

impl JsonRpcResponse {
    pub fn success(id: Value, result: Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    pub fn failure(id: Value, error: McpError) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: None,
            error: Some(JsonRpcError {
                code: error.code.as_i32(),
                message: error.message,
            }),
        }
    }

    pub fn from_result(id: Value, result: Result<Value, McpError>) -> Self {
        match result {
            Ok(value) => Self::success(id, value),
            Err(err) => Self::failure(id, err),
        }
    }
}

/// A `tools/call` result carrying a single text block.
pub fn text_content(text: impl Into<String>) -> Value {
    serde_json::json!({
        "content": [ { "type": "text", "text": text.into() } ],
        "isError": false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorCode;

    #[test]
    fn json_rpc_request_allows_missing_id_for_notifications() {
        let raw = r#"{"jsonrpc":"2.0","method":"notifications/initialized","params":{}}"#;
        let parsed: JsonRpcRequest = serde_json::from_str(raw).expect("must parse");
        assert!(parsed.is_notification());
        assert_eq!(parsed.method, "notifications/initialized");
    }

    #[test]
    fn explicit_null_id_is_a_request() {
        let raw = r#"{"jsonrpc":"2.0","id":null,"method":"ping"}"#;
        let parsed: JsonRpcRequest = serde_json::from_str(raw).expect("must parse");
        assert!(!parsed.is_notification());
        assert_eq!(parsed.id, Some(Value::Null));
    }

    #[test]
    fn json_rpc_request_parses_id_and_params() {
        let raw = r#"{"jsonrpc":"2.0","id":1,"method":"resources/read","params":{"uri":"api://x/info"}}"#;
        let parsed: JsonRpcRequest = serde_json::from_str(raw).expect("must parse");
        assert_eq!(parsed.id, Some(serde_json::json!(1)));
        assert_eq!(parsed.param_str("uri"), Some("api://x/info"));
        assert_eq!(parsed.param_str("missing"), None);
    }

    #[test]
    fn failure_serializes_without_result() {
        let response = JsonRpcResponse::failure(
            serde_json::json!(7),
            McpError::new(ErrorCode::MethodNotFound, "Method not found"),
        );
        let value = serde_json::to_value(&response).expect("serialize");
        assert_eq!(value["error"]["code"], -32601);
        assert!(value.get("result").is_none());
        assert_eq!(value["id"], 7);
    }

    #[test]
    fn text_content_wraps_a_single_block() {
        let value = text_content("hi");
        assert_eq!(value["content"][0]["type"], "text");
        assert_eq!(value["content"][0]["text"], "hi");
        assert_eq!(value["content"].as_array().map(Vec::len), Some(1));
    }
}
