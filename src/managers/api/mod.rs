mod exec;
mod resolve;

pub use exec::{parse_body, CallResult, HttpExecutor};
pub use resolve::{
    join_url, merge_headers, resolve_request, CallArgs, RequestBody, ResolvedRequest,
};

use crate::errors::BridgeError;
use crate::services::logger::Logger;
use crate::services::registry::ApiRegistry;

/// Resolves tool calls against the registry and runs them on the shared client.
#[derive(Debug)]
pub struct ApiManager {
    logger: Logger,
    registry: ApiRegistry,
    executor: HttpExecutor,
}

impl ApiManager {
    pub fn new(logger: Logger, registry: ApiRegistry) -> Result<Self, BridgeError> {
        let executor = HttpExecutor::new(logger.clone())?;
        Ok(Self::with_executor(logger, registry, executor))
    }

    pub fn with_executor(logger: Logger, registry: ApiRegistry, executor: HttpExecutor) -> Self {
        Self {
            logger: logger.child("api"),
            registry,
            executor,
        }
    }

    pub fn registry(&self) -> &ApiRegistry {
        &self.registry
    }

    pub fn resolve(
        &self,
        api_name: &str,
        endpoint_name: &str,
        args: CallArgs,
    ) -> Result<ResolvedRequest, BridgeError> {
        resolve_request(&self.registry, api_name, endpoint_name, args)
    }

    pub async fn call_api(
        &self,
        api_name: &str,
        endpoint_name: &str,
        args: CallArgs,
    ) -> Result<CallResult, BridgeError> {
        let request = self.resolve(api_name, endpoint_name, args)?;
        self.logger.debug(
            "Calling endpoint",
            Some(&serde_json::json!({
                "api": api_name,
                "endpoint": endpoint_name,
                "method": request.method.as_str(),
                "url": request.url.as_str(),
            })),
        );
        self.executor.execute(&request).await
    }
}
