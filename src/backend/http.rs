//! `reqwest` implementation of [`ResourceGateway`].

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde_json::Value;

use crate::backend::{
    BackendError, BackendResult, Credentials, ListRequest, ResourceGateway, decode_token,
};

const API_PREFIX: &str = "api/v1";

#[derive(Clone, Debug)]
pub struct HttpBackend {
    client: Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(base_url: &str, timeout: Duration) -> BackendResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| BackendError::Transport(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// `<base>/api/v1/<endpoint>`
    pub fn resource_url(&self, endpoint: &str) -> String {
        format!("{}/{API_PREFIX}/{}", self.base_url, endpoint.trim_matches('/'))
    }

    fn record_url(&self, endpoint: &str, id: &str) -> String {
        format!("{}/{}", self.resource_url(endpoint), id)
    }

    fn authorized(&self, request: RequestBuilder, token: &str) -> BackendResult<RequestBuilder> {
        if token.trim().is_empty() {
            return Err(BackendError::MissingToken);
        }
        Ok(request.bearer_auth(token))
    }

    /// Sends the request and maps the status. This is the only place that
    /// interprets 401/403.
    async fn send(&self, request: RequestBuilder) -> BackendResult<Option<Value>> {
        let response = request.send().await.map_err(|err| {
            log::error!("Backend request failed: {err}");
            BackendError::from(err)
        })?;

        let status = response.status();
        if status == StatusCode::NO_CONTENT {
            return Ok(None);
        }

        let body = response.text().await.map_err(BackendError::from)?;

        if !status.is_success() {
            let err = BackendError::from_status(status.as_u16(), &body);
            if err.is_auth() {
                log::warn!("Backend rejected the session token: {status}");
            } else {
                log::error!("Backend returned {status}: {err}");
            }
            return Err(err);
        }

        if body.trim().is_empty() {
            return Ok(None);
        }

        serde_json::from_str(&body).map(Some).map_err(|err| {
            log::error!("Failed to decode backend response: {err}");
            BackendError::from(err)
        })
    }

    async fn send_expecting_body(&self, request: RequestBuilder) -> BackendResult<Value> {
        self.send(request)
            .await?
            .ok_or_else(|| BackendError::Decode("empty response body".to_string()))
    }
}

#[async_trait]
impl ResourceGateway for HttpBackend {
    async fn list(
        &self,
        token: &str,
        endpoint: &str,
        request: &ListRequest,
    ) -> BackendResult<Value> {
        let builder = self
            .client
            .get(self.resource_url(endpoint))
            .query(&request.query_pairs());
        self.send_expecting_body(self.authorized(builder, token)?)
            .await
    }

    async fn get(&self, token: &str, endpoint: &str, id: &str) -> BackendResult<Value> {
        let builder = self.client.get(self.record_url(endpoint, id));
        self.send_expecting_body(self.authorized(builder, token)?)
            .await
    }

    async fn create(&self, token: &str, endpoint: &str, payload: &Value) -> BackendResult<Value> {
        let builder = self.client.post(self.resource_url(endpoint)).json(payload);
        self.send_expecting_body(self.authorized(builder, token)?)
            .await
    }

    async fn update(
        &self,
        token: &str,
        endpoint: &str,
        id: &str,
        payload: &Value,
    ) -> BackendResult<Value> {
        let builder = self.client.put(self.record_url(endpoint, id)).json(payload);
        self.send_expecting_body(self.authorized(builder, token)?)
            .await
    }

    async fn delete(&self, token: &str, endpoint: &str, id: &str) -> BackendResult<()> {
        let builder = self.client.delete(self.record_url(endpoint, id));
        self.send(self.authorized(builder, token)?).await.map(|_| ())
    }

    async fn login(&self, credentials: &Credentials) -> BackendResult<String> {
        let builder = self
            .client
            .post(self.resource_url("auth/login"))
            .json(credentials);
        decode_token(self.send_expecting_body(builder).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn urls_are_assembled_under_api_v1() {
        let backend = HttpBackend::new("http://backend.local:8080/", Duration::from_secs(5)).unwrap();
        assert_eq!(
            backend.resource_url("term-of-payments"),
            "http://backend.local:8080/api/v1/term-of-payments"
        );
        assert_eq!(
            backend.record_url("companies", "7"),
            "http://backend.local:8080/api/v1/companies/7"
        );
    }
}
