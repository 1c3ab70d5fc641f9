use crate::errors::BridgeError;
use crate::managers::api::ApiManager;
use crate::mcp::catalog::{build_tool_catalog, ToolDef};
use crate::mcp::dispatch;
use crate::mcp::resources::{self, ResourceDef};
use crate::services::config::{load_definitions, ApiDefinition};
use crate::services::logger::Logger;
use crate::services::registry::ApiRegistry;
use std::path::Path;
use std::sync::Arc;

/// Everything a request handler needs, built once at startup.
#[derive(Debug)]
pub struct App {
    pub logger: Logger,
    pub api_manager: Arc<ApiManager>,
}

impl App {
    pub fn initialize(logger: Logger, definitions: Vec<ApiDefinition>) -> Result<Self, BridgeError> {
        for definition in &definitions {
            definition.validate()?;
        }
        let registry = ApiRegistry::from_definitions(logger.clone(), definitions);
        let api_manager = Arc::new(ApiManager::new(logger.clone(), registry)?);
        logger.info(
            "Initialized",
            Some(&serde_json::json!({ "apis": api_manager.registry().len() })),
        );
        Ok(Self {
            logger,
            api_manager,
        })
    }

    pub fn from_config(path: Option<&Path>) -> Result<Self, BridgeError> {
        let logger = Logger::new("mcp-api-server");
        let definitions = load_definitions(path)?;
        Self::initialize(logger, definitions)
    }

    pub fn list_tools(&self) -> Vec<ToolDef> {
        build_tool_catalog(self.api_manager.registry())
    }

    pub async fn call_tool(&self, name: &str, arguments: serde_json::Value) -> String {
        dispatch::call_tool(&self.api_manager, &self.logger, name, arguments).await
    }

    pub fn list_resources(&self) -> Vec<ResourceDef> {
        resources::list_resources(self.api_manager.registry())
    }

    pub fn read_resource(&self, uri: &str) -> Result<String, BridgeError> {
        resources::read_resource(self.api_manager.registry(), uri)
    }

    /// Logs shutdown on every exit path of the server. The shared HTTP client
    /// is released once the last handle to the app drops.
    pub fn shutdown(self: Arc<Self>) {
        let shared = Arc::strong_count(&self) - 1;
        self.logger.info(
            "Shutting down",
            Some(&serde_json::json!({ "outstanding_handles": shared })),
        );
    }
}
