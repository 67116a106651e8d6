//! Mock gateway for isolating forms and services in tests.

use async_trait::async_trait;
use mockall::mock;
use serde_json::Value;

use crate::backend::{BackendResult, Credentials, ListRequest, ResourceGateway};

mock! {
    pub Gateway {}

    #[async_trait]
    impl ResourceGateway for Gateway {
        async fn list(&self, token: &str, endpoint: &str, request: &ListRequest)
        -> BackendResult<Value>;
        async fn get(&self, token: &str, endpoint: &str, id: &str) -> BackendResult<Value>;
        async fn create(&self, token: &str, endpoint: &str, payload: &Value) -> BackendResult<Value>;
        async fn update(
            &self,
            token: &str,
            endpoint: &str,
            id: &str,
            payload: &Value,
        ) -> BackendResult<Value>;
        async fn delete(&self, token: &str, endpoint: &str, id: &str) -> BackendResult<()>;
        async fn login(&self, credentials: &Credentials) -> BackendResult<String>;
    }
}
