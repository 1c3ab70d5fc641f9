use thiserror::Error;

#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    InvalidFormat(String),
    #[error("{0}")]
    InvalidArguments(String),
    #[error("{0}")]
    InvalidRequest(String),
    #[error("configuration error: {0}")]
    Config(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl BridgeError {
    pub fn api_not_found(api_name: &str) -> Self {
        Self::NotFound(format!("API '{}' not found", api_name))
    }

    pub fn endpoint_not_found(api_name: &str, endpoint_name: &str) -> Self {
        Self::NotFound(format!(
            "Endpoint '{}' not found in API '{}'",
            endpoint_name, api_name
        ))
    }

    pub fn unknown_resource(uri: &str) -> Self {
        Self::NotFound(format!("Unknown resource: {}", uri))
    }

    pub fn invalid_tool_name(name: &str) -> Self {
        Self::InvalidFormat(format!("Invalid tool name format: {}", name))
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "not_found",
            Self::InvalidFormat(_) => "invalid_format",
            Self::InvalidArguments(_) => "invalid_arguments",
            Self::InvalidRequest(_) => "invalid_request",
            Self::Config(_) => "config",
            Self::Io(_) => "io",
        }
    }
}
