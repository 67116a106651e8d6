//! REST backend access.
//!
//! [`ResourceGateway`] is the single funnel every data-fetching call goes
//! through; the typed helpers below layer [`Resource`] decoding on top of it.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::resource::Resource;
use crate::domain::types::SearchTerm;
use crate::pagination::{DEFAULT_ITEMS_PER_PAGE, ListPage};
use crate::table::SortSpec;

pub mod errors;
pub mod http;
#[cfg(any(test, feature = "test-mocks"))]
pub mod mock;

pub use errors::{BackendError, BackendResult};
pub use http::HttpBackend;

/// Query sent to a list endpoint.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ListRequest {
    pub search: Option<SearchTerm>,
    pub page: u32,
    pub limit: u32,
    pub filters: BTreeMap<String, String>,
    pub sort: Option<SortSpec>,
}

impl Default for ListRequest {
    fn default() -> Self {
        Self::new(1, DEFAULT_ITEMS_PER_PAGE)
    }
}

impl ListRequest {
    pub fn new(page: u32, limit: u32) -> Self {
        Self {
            search: None,
            page: page.max(1),
            limit,
            filters: BTreeMap::new(),
            sort: None,
        }
    }

    pub fn search(mut self, term: SearchTerm) -> Self {
        self.search = Some(term);
        self
    }

    pub fn filter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.filters.insert(key.into(), value.into());
        self
    }

    pub fn filters(mut self, filters: BTreeMap<String, String>) -> Self {
        self.filters = filters;
        self
    }

    pub fn sort(mut self, sort: Option<SortSpec>) -> Self {
        self.sort = sort;
        self
    }

    /// Query-string pairs in the order the backend documents them.
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = vec![
            ("page".to_string(), self.page.to_string()),
            ("limit".to_string(), self.limit.to_string()),
        ];
        if let Some(term) = &self.search {
            pairs.push(("search".to_string(), term.as_str().to_string()));
        }
        pairs.extend(
            self.filters
                .iter()
                .map(|(key, value)| (key.clone(), value.clone())),
        );
        if let Some(sort) = &self.sort {
            pairs.push(("sortBy".to_string(), sort.column.clone()));
            pairs.push(("sortOrder".to_string(), sort.direction.as_str().to_string()));
        }
        pairs
    }
}

/// Username/password pair posted to the backend login endpoint.
#[derive(Clone, Debug, Serialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

#[derive(Deserialize)]
struct LoginResponse {
    #[serde(alias = "accessToken", alias = "access_token")]
    token: String,
}

#[async_trait]
pub trait ResourceGateway: Send + Sync {
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

    /// Exchanges credentials for a bearer token.
    async fn login(&self, credentials: &Credentials) -> BackendResult<String>;
}

/// Single-record responses come either bare or wrapped in `{"data": ...}`.
fn decode_record<T: DeserializeOwned>(value: Value) -> BackendResult<T> {
    let value = match value {
        Value::Object(mut map) if map.get("data").is_some_and(Value::is_object) => {
            map.remove("data").unwrap_or(Value::Null)
        }
        other => other,
    };
    serde_json::from_value(value).map_err(BackendError::from)
}

pub(crate) fn decode_token(value: Value) -> BackendResult<String> {
    decode_record::<LoginResponse>(value).map(|response| response.token)
}

pub async fn list_resources<E, G>(
    gateway: &G,
    token: &str,
    request: &ListRequest,
) -> BackendResult<ListPage<E>>
where
    E: Resource,
    G: ResourceGateway + ?Sized,
{
    let value = gateway.list(token, E::ENDPOINT, request).await?;
    E::from_list_response(value).map_err(BackendError::from)
}

pub async fn get_resource<E, G>(gateway: &G, token: &str, id: E::Id) -> BackendResult<E>
where
    E: Resource,
    G: ResourceGateway + ?Sized,
{
    let id = id.to_string();
    decode_record(gateway.get(token, E::ENDPOINT, &id).await?)
}

pub async fn create_resource<E, G>(gateway: &G, token: &str, draft: &E::Draft) -> BackendResult<E>
where
    E: Resource,
    G: ResourceGateway + ?Sized,
{
    let payload = serde_json::to_value(draft)?;
    decode_record(gateway.create(token, E::ENDPOINT, &payload).await?)
}

pub async fn update_resource<E, G>(
    gateway: &G,
    token: &str,
    id: E::Id,
    draft: &E::Draft,
) -> BackendResult<E>
where
    E: Resource,
    G: ResourceGateway + ?Sized,
{
    let id = id.to_string();
    let payload = serde_json::to_value(draft)?;
    decode_record(gateway.update(token, E::ENDPOINT, &id, &payload).await?)
}

pub async fn delete_resource<E, G>(gateway: &G, token: &str, id: E::Id) -> BackendResult<()>
where
    E: Resource,
    G: ResourceGateway + ?Sized,
{
    let id = id.to_string();
    gateway.delete(token, E::ENDPOINT, &id).await
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::table::SortDirection;

    #[test]
    fn query_pairs_include_search_filters_and_sort() {
        let request = ListRequest::new(2, 25)
            .search(SearchTerm::parse("acme").unwrap())
            .filter("isActive", "true")
            .sort(Some(SortSpec {
                column: "name".into(),
                direction: SortDirection::Desc,
            }));

        let pairs = request.query_pairs();
        let lookup = |key: &str| {
            pairs
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.as_str())
        };
        assert_eq!(lookup("page"), Some("2"));
        assert_eq!(lookup("limit"), Some("25"));
        assert_eq!(lookup("search"), Some("acme"));
        assert_eq!(lookup("isActive"), Some("true"));
        assert_eq!(lookup("sortBy"), Some("name"));
        assert_eq!(lookup("sortOrder"), Some("desc"));
    }

    #[test]
    fn records_are_unwrapped_from_data_envelope() {
        #[derive(Deserialize)]
        struct Item {
            id: i32,
        }
        let wrapped: Item = decode_record(json!({"data": {"id": 4}})).unwrap();
        let bare: Item = decode_record(json!({"id": 5})).unwrap();
        assert_eq!((wrapped.id, bare.id), (4, 5));
    }

    #[test]
    fn token_accepts_common_spellings() {
        assert_eq!(decode_token(json!({"token": "a"})).unwrap(), "a");
        assert_eq!(decode_token(json!({"accessToken": "b"})).unwrap(), "b");
        assert_eq!(decode_token(json!({"data": {"access_token": "c"}})).unwrap(), "c");
        assert!(decode_token(json!({})).is_err());
    }
}
