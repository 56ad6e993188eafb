//! Mock implementations and server helpers for testing.
//!
//! In-memory stand-ins for the parameter store, park registry and query
//! engine, plus a mockito server speaking the engine's JSON protocol.

pub mod engine;

use crate::error::{ConfigError, RegistryError};
use crate::model::{Park, ParkRegistry};
use crate::parameter_store::ParameterStore;
use async_trait::async_trait;
use mockito::{Mock, Server, ServerGuard};
use std::collections::HashMap;

pub use engine::*;

/// Parameter store backed by a fixed map.
pub struct StaticParameterStore {
    parameters: HashMap<String, String>,
}

impl StaticParameterStore {
    pub fn new() -> Self {
        Self {
            parameters: HashMap::new(),
        }
    }

    pub fn with_parameter(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.parameters.insert(name.into(), value.into());
        self
    }
}

impl ParameterStore for StaticParameterStore {
    fn get_parameter(&self, name: &str) -> Result<String, ConfigError> {
        self.parameters
            .get(name)
            .cloned()
            .ok_or_else(|| ConfigError::parameter(name, "parameter not found"))
    }
}

/// Park registry backed by a fixed map, optionally failing every lookup.
pub struct MockParkRegistry {
    parks: HashMap<String, Park>,
    should_fail: bool,
}

impl MockParkRegistry {
    pub fn new() -> Self {
        Self {
            parks: HashMap::new(),
            should_fail: false,
        }
    }

    pub fn with_park(mut self, park_id: &str, energy_type: &str) -> Self {
        self.parks.insert(
            park_id.to_string(),
            Park {
                park_id: park_id.to_string(),
                park_name: None,
                energy_type: energy_type.to_string(),
            },
        );
        self
    }

    pub fn failing(mut self) -> Self {
        self.should_fail = true;
        self
    }
}

#[async_trait]
impl ParkRegistry for MockParkRegistry {
    async fn get_park(&self, park_id: &str) -> Result<Option<Park>, RegistryError> {
        if self.should_fail {
            return Err(RegistryError::Io {
                path: "mock".to_string(),
                source: std::io::Error::new(std::io::ErrorKind::Other, "registry unavailable"),
            });
        }
        Ok(self.parks.get(park_id).cloned())
    }
}

/// Builder for mockito server mocks of the engine's JSON operations.
///
/// Every operation is a POST to `/` told apart by its `X-Amz-Target` header.
pub struct MockAthenaServerBuilder {
    server: ServerGuard,
    mocks: Vec<Mock>,
}

impl MockAthenaServerBuilder {
    pub async fn new() -> Self {
        Self {
            server: Server::new_async().await,
            mocks: Vec::new(),
        }
    }

    pub fn url(&self) -> String {
        self.server.url()
    }

    async fn mock_operation(mut self, operation: &str, status: usize, body: String) -> Self {
        let mock = self
            .server
            .mock("POST", "/")
            .match_header("x-amz-target", format!("AmazonAthena.{}", operation).as_str())
            .with_status(status)
            .with_header("content-type", "application/x-amz-json-1.1")
            .with_body(body)
            .create_async()
            .await;

        self.mocks.push(mock);
        self
    }

    pub async fn mock_start_query_execution(self, query_execution_id: &str) -> Self {
        let body = serde_json::json!({ "QueryExecutionId": query_execution_id }).to_string();
        self.mock_operation("StartQueryExecution", 200, body).await
    }

    pub async fn mock_query_status(self, state: &str, reason: &str) -> Self {
        let body = serde_json::json!({
            "QueryExecution": {
                "Status": {"State": state, "StateChangeReason": reason}
            }
        })
        .to_string();
        self.mock_operation("GetQueryExecution", 200, body).await
    }

    /// Serves `body` (see `builders::QueryResultsJsonBuilder`) for every results call.
    pub async fn mock_query_results(self, body: serde_json::Value) -> Self {
        self.mock_operation("GetQueryResults", 200, body.to_string())
            .await
    }

    pub async fn mock_error(self, operation: &str, status: usize, message: &str) -> Self {
        let body = serde_json::json!({
            "__type": "InvalidRequestException",
            "Message": message
        })
        .to_string();
        self.mock_operation(operation, status, body).await
    }

    /// Finishes the builder; mocks stay registered while the result lives.
    pub fn build(self) -> MockAthenaServer {
        MockAthenaServer {
            server: self.server,
            _mocks: self.mocks,
        }
    }
}

/// A running mock engine server together with its registered mocks.
pub struct MockAthenaServer {
    server: ServerGuard,
    _mocks: Vec<Mock>,
}

impl MockAthenaServer {
    pub fn url(&self) -> String {
        self.server.url()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_parameter_store() {
        let store = StaticParameterStore::new().with_parameter("athena_config", "{}");

        assert_eq!(store.get_parameter("athena_config").unwrap(), "{}");
        assert!(store.get_parameter("other").is_err());
    }

    #[tokio::test]
    async fn test_mock_park_registry() {
        let registry = MockParkRegistry::new().with_park("park1", "Wind");

        let park = registry.get_park("park1").await.unwrap().unwrap();
        assert_eq!(park.energy_type, "Wind");
        assert!(registry.get_park("park2").await.unwrap().is_none());
        assert!(MockParkRegistry::new().failing().get_park("park1").await.is_err());
    }

    #[tokio::test]
    async fn test_mock_athena_server_builder() {
        let builder = MockAthenaServerBuilder::new()
            .await
            .mock_start_query_execution("q-1")
            .await;

        let url = builder.url();
        let server = builder.build();
        assert!(url.starts_with("http://"));
        assert_eq!(server.url(), url);
    }
}
