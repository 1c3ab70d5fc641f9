use crate::app::App;
use crate::constants::server;
use crate::errors::{BridgeError, ErrorCode, McpError};
use crate::mcp::dispatch::format_dispatch_error;
use crate::mcp::protocol::{text_content, JsonRpcRequest, JsonRpcResponse};
use serde_json::Value;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader, BufWriter};

pub struct McpServer {
    app: Arc<App>,
}

impl McpServer {
    pub fn new(app: Arc<App>) -> Self {
        Self { app }
    }

    fn handle_initialize(&self) -> Value {
        serde_json::json!({
            "protocolVersion": server::PROTOCOL_VERSION,
            "capabilities": {
                "tools": {"listChanged": false},
                "resources": {"subscribe": false, "listChanged": false},
            },
            "serverInfo": {"name": server::NAME, "version": server::VERSION},
        })
    }

    fn handle_tools_list(&self) -> Value {
        serde_json::json!({ "tools": self.app.list_tools() })
    }

    async fn handle_tools_call(&self, params: &Value) -> Result<Value, McpError> {
        let name = params
            .get("name")
            .and_then(Value::as_str)
            .filter(|name| !name.is_empty())
            .ok_or_else(|| McpError::new(ErrorCode::InvalidParams, "Missing tool name"))?
            .to_string();
        let arguments = params.get("arguments").cloned().unwrap_or(Value::Null);

        // A panicking call must not take the session down with it.
        let app = self.app.clone();
        let tool = name.clone();
        let text = match tokio::spawn(async move { app.call_tool(&tool, arguments).await }).await {
            Ok(text) => text,
            Err(err) => {
                let text = format_dispatch_error(&format!("internal failure: {}", err));
                self.app.logger.error(
                    &text,
                    Some(&serde_json::json!({ "tool": name, "panic": err.is_panic() })),
                );
                text
            }
        };
        Ok(text_content(text))
    }

    fn handle_resources_list(&self) -> Value {
        serde_json::json!({ "resources": self.app.list_resources() })
    }

    fn handle_resources_read(&self, uri: Option<&str>) -> Result<Value, McpError> {
        let uri = uri.ok_or_else(|| McpError::new(ErrorCode::InvalidParams, "Missing uri"))?;
        let text = self.app.read_resource(uri).map_err(McpError::from)?;
        Ok(serde_json::json!({
            "contents": [{
                "uri": uri,
                "mimeType": crate::constants::resources::MIME_TYPE,
                "text": text,
            }]
        }))
    }

    pub async fn handle_request(&self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        if request.is_notification() {
            if !request.method.starts_with("notifications/") {
                self.app.logger.debug(
                    "Ignoring notification",
                    Some(&serde_json::json!({ "method": request.method })),
                );
            }
            return None;
        }
        let id = request.id.clone().unwrap_or(Value::Null);
        let result = match request.method.as_str() {
            "initialize" => Ok(self.handle_initialize()),
            "ping" => Ok(serde_json::json!({})),
            "tools/list" => Ok(self.handle_tools_list()),
            "tools/call" => self.handle_tools_call(&request.params).await,
            "resources/list" => Ok(self.handle_resources_list()),
            "resources/read" => self.handle_resources_read(request.param_str("uri")),
            method if method.starts_with("notifications/") => Ok(serde_json::json!({})),
            _ => Err(McpError::new(ErrorCode::MethodNotFound, "Method not found")),
        };
        Some(JsonRpcResponse::from_result(id, result))
    }

    /// Handles one newline-delimited message; `None` when no reply is due.
    pub async fn handle_line(&self, line: &str) -> Option<String> {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return None;
        }
        let response = match serde_json::from_str::<Value>(trimmed) {
            Err(_) => Some(JsonRpcResponse::failure(
                Value::Null,
                McpError::new(ErrorCode::ParseError, "Parse error"),
            )),
            Ok(parsed) => match serde_json::from_value::<JsonRpcRequest>(parsed) {
                Ok(request) => self.handle_request(request).await,
                Err(_) => Some(JsonRpcResponse::failure(
                    Value::Null,
                    McpError::new(ErrorCode::InvalidRequest, "Invalid request"),
                )),
            },
        };
        response.map(|response| serde_json::to_string(&response).unwrap_or_default())
    }

    pub async fn serve<R, W>(&self, reader: R, writer: W) -> Result<(), BridgeError>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut lines = reader.lines();
        let mut writer = BufWriter::new(writer);
        while let Some(line) = lines.next_line().await? {
            if let Some(payload) = self.handle_line(&line).await {
                writer.write_all(payload.as_bytes()).await?;
                writer.write_all(b"\n").await?;
                writer.flush().await?;
            }
        }
        Ok(())
    }
}

/// Serves stdio until EOF. The HTTP client is released on every exit path.
pub async fn run_stdio(config: Option<PathBuf>) -> Result<(), BridgeError> {
    let app = Arc::new(App::from_config(config.as_deref())?);
    let server = McpServer::new(app.clone());
    let outcome = server
        .serve(BufReader::new(tokio::io::stdin()), tokio::io::stdout())
        .await;
    if let Err(err) = &outcome {
        app.logger.error(
            "Server loop failed",
            Some(&serde_json::json!({ "error": err.to_string() })),
        );
    }
    drop(server);
    app.shutdown();
    outcome
}
