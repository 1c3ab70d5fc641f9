use crate::errors::BridgeError;
use crate::services::config::ApiDefinition;
use crate::services::logger::Logger;
use std::collections::HashMap;

/// Name -> definition map that remembers registration order.
#[derive(Debug)]
pub struct ApiRegistry {
    logger: Logger,
    order: Vec<String>,
    apis: HashMap<String, ApiDefinition>,
}

impl ApiRegistry {
    pub fn new(logger: Logger) -> Self {
        Self {
            logger: logger.child("registry"),
            order: Vec::new(),
            apis: HashMap::new(),
        }
    }

    pub fn from_definitions(logger: Logger, definitions: Vec<ApiDefinition>) -> Self {
        let mut registry = Self::new(logger);
        for definition in definitions {
            registry.register(definition);
        }
        registry
    }

    /// Last registration wins; an overwritten API keeps its original position.
    pub fn register(&mut self, definition: ApiDefinition) {
        let name = definition.name.clone();
        let meta = serde_json::json!({
            "api": name,
            "endpoints": definition.endpoints.len(),
        });
        if self.apis.insert(name.clone(), definition).is_some() {
            self.logger.warn("Replaced API definition", Some(&meta));
        } else {
            self.order.push(name);
            self.logger.info("Registered API", Some(&meta));
        }
    }

    pub fn lookup(&self, name: &str) -> Result<&ApiDefinition, BridgeError> {
        self.apis
            .get(name)
            .ok_or_else(|| BridgeError::api_not_found(name))
    }

    pub fn list(&self) -> impl Iterator<Item = (&str, &ApiDefinition)> + '_ {
        self.order
            .iter()
            .filter_map(|name| self.apis.get(name).map(|def| (name.as_str(), def)))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
