mod bridge_error;
mod mcp_error;

pub use bridge_error::BridgeError;
pub use mcp_error::{ErrorCode, McpError};
