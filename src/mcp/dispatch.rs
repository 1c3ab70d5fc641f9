use crate::constants::tools::{GENERIC_TOOL, SEPARATOR};
use crate::errors::BridgeError;
use crate::managers::api::{ApiManager, CallArgs, CallResult};
use crate::services::logger::Logger;
use serde_json::{Map, Value};

/// Which endpoint a tool call targets, decided once from the tool name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invocation {
    /// `call_api` with explicit names in the arguments.
    Generic {
        api_name: String,
        endpoint_name: String,
    },
    /// A derived `<api>_<endpoint>` tool.
    Named {
        tool: String,
        api_name: String,
        endpoint_name: String,
    },
}

impl Invocation {
    pub fn api_name(&self) -> &str {
        match self {
            Invocation::Generic { api_name, .. } | Invocation::Named { api_name, .. } => api_name,
        }
    }

    /// The tool name this invocation was parsed from.
    pub fn tool_name(&self) -> &str {
        match self {
            Invocation::Generic { .. } => GENERIC_TOOL,
            Invocation::Named { tool, .. } => tool,
        }
    }

    pub fn endpoint_name(&self) -> &str {
        match self {
            Invocation::Generic { endpoint_name, .. }
            | Invocation::Named { endpoint_name, .. } => endpoint_name,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ToolCall {
    pub invocation: Invocation,
    pub args: CallArgs,
}

/// Splits on the first separator, so endpoint names may contain it but API names may not.
pub fn split_tool_identifier(name: &str) -> Result<(&str, &str), BridgeError> {
    name.split_once(SEPARATOR)
        .ok_or_else(|| BridgeError::invalid_tool_name(name))
}

fn name_argument(arguments: &Map<String, Value>, key: &str) -> String {
    match arguments.get(key) {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(text)) => text.clone(),
        Some(other) => other.to_string(),
    }
}

pub fn extract_call_args(arguments: &Map<String, Value>) -> Result<CallArgs, BridgeError> {
    let params = match arguments.get("params") {
        None | Some(Value::Null) => Map::new(),
        Some(Value::Object(map)) => map.clone(),
        Some(_) => {
            return Err(BridgeError::InvalidArguments(
                "params must be an object".to_string(),
            ))
        }
    };
    Ok(CallArgs {
        params,
        data: arguments.get("data").filter(|v| !v.is_null()).cloned(),
        json: arguments.get("json").filter(|v| !v.is_null()).cloned(),
    })
}

pub fn parse_tool_call(name: &str, arguments: &Value) -> Result<ToolCall, BridgeError> {
    let empty = Map::new();
    let arguments = match arguments {
        Value::Null => &empty,
        Value::Object(map) => map,
        _ => {
            return Err(BridgeError::InvalidArguments(
                "arguments must be an object".to_string(),
            ))
        }
    };

    let invocation = if name == GENERIC_TOOL {
        Invocation::Generic {
            api_name: name_argument(arguments, "api_name"),
            endpoint_name: name_argument(arguments, "endpoint_name"),
        }
    } else {
        let (api_name, endpoint_name) = split_tool_identifier(name)?;
        Invocation::Named {
            tool: name.to_string(),
            api_name: api_name.to_string(),
            endpoint_name: endpoint_name.to_string(),
        }
    };

    Ok(ToolCall {
        invocation,
        args: extract_call_args(arguments)?,
    })
}

pub fn format_call_result(result: &CallResult) -> String {
    if result.success {
        let data = result.data.as_ref().unwrap_or(&Value::Null);
        let rendered = serde_json::to_string_pretty(data).unwrap_or_else(|_| data.to_string());
        format!(
            "API call successful!\n\nStatus: {}\nResponse:\n{}",
            result.status_code, rendered
        )
    } else {
        format!(
            "API call failed!\n\nStatus: {}\nError: {}",
            result.status_code,
            result.error.as_deref().unwrap_or("Unknown error")
        )
    }
}

pub fn format_dispatch_error(message: &str) -> String {
    format!("Error calling API: {}", message)
}

async fn run_tool_call(
    manager: &ApiManager,
    logger: &Logger,
    call_id: &str,
    name: &str,
    arguments: &Value,
) -> Result<CallResult, BridgeError> {
    let call = parse_tool_call(name, arguments)?;
    logger.debug(
        "Tool call",
        Some(&serde_json::json!({
            "call_id": call_id,
            "tool": call.invocation.tool_name(),
            "api": call.invocation.api_name(),
            "endpoint": call.invocation.endpoint_name(),
        })),
    );
    manager
        .call_api(
            call.invocation.api_name(),
            call.invocation.endpoint_name(),
            call.args,
        )
        .await
}

/// Runs one tool call and renders the outcome as text. Never returns an error.
pub async fn call_tool(
    manager: &ApiManager,
    logger: &Logger,
    name: &str,
    arguments: Value,
) -> String {
    let call_id = uuid::Uuid::new_v4().to_string();
    match run_tool_call(manager, logger, &call_id, name, &arguments).await {
        Ok(result) => {
            logger.debug(
                "Tool call finished",
                Some(&serde_json::json!({
                    "call_id": call_id,
                    "success": result.success,
                    "status_code": result.status_code,
                })),
            );
            format_call_result(&result)
        }
        Err(err) => {
            let text = format_dispatch_error(&err.to_string());
            logger.error(
                &text,
                Some(&serde_json::json!({"call_id": call_id, "tool": name, "kind": err.kind()})),
            );
            text
        }
    }
}
