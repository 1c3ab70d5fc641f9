pub mod server {
    pub const NAME: &str = "api-integration-server";
    pub const VERSION: &str = "1.0.0";
    pub const PROTOCOL_VERSION: &str = "2025-06-18";
}

pub mod network {
    pub const TIMEOUT_API_REQUEST_MS: u64 = 30_000;
    pub const MAX_REDIRECTS: usize = 10;
    pub const USER_AGENT: &str = "mcp-api-server/1.0.0";
}

pub mod tools {
    /// Joins API name and endpoint name into a tool identifier.
    pub const SEPARATOR: char = '_';
    pub const GENERIC_TOOL: &str = "call_api";
}

pub mod resources {
    pub const SCHEME: &str = "api://";
    pub const INFO_SEGMENT: &str = "info";
    pub const MIME_TYPE: &str = "application/json";
}

pub mod protocols {
    pub const ALLOWED_HTTP: &[&str] = &["http:", "https:"];
}
