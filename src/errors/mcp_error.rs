use crate::errors::BridgeError;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[repr(i32)]
pub enum ErrorCode {
    ResourceNotFound = -32002,
    ParseError = -32700,
    InvalidRequest = -32600,
    MethodNotFound = -32601,
    InvalidParams = -32602,
    InternalError = -32603,
}

impl ErrorCode {
    pub fn as_i32(self) -> i32 {
        self as i32
    }
}

/// JSON-RPC level failure returned to the host.
#[derive(Debug, Clone, Serialize)]
pub struct McpError {
    pub code: ErrorCode,
    pub message: String,
}

impl McpError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl From<BridgeError> for McpError {
    fn from(err: BridgeError) -> Self {
        let code = match err {
            BridgeError::NotFound(_) => ErrorCode::ResourceNotFound,
            BridgeError::InvalidArguments(_) | BridgeError::InvalidFormat(_) => {
                ErrorCode::InvalidParams
            }
            _ => ErrorCode::InternalError,
        };
        McpError::new(code, err.to_string())
    }
}

impl fmt::Display for McpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for McpError {}
