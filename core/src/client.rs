//! Stateless request builder for the pet-store API.
//!
//! # Design
//! `PetStoreClient` holds the base URL and the static API key, nothing else.
//! Every request is `{base}/{resource}[/{key}]` plus optional query pairs and
//! an optional JSON body. The caller hands the resulting `HttpRequest` to a
//! `Transport`; building never performs I/O.

use std::fmt;

use serde_json::Value;
use url::Url;

use crate::error::ClientError;
use crate::http::{HttpMethod, HttpRequest};

/// Top-level API group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Pet,
    Store,
    User,
}

impl Resource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Resource::Pet => "pet",
            Resource::Store => "store",
            Resource::User => "user",
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Builds `HttpRequest` values for the pet-store API.
#[derive(Debug, Clone)]
pub struct PetStoreClient {
    base_url: Url,
    api_key: String,
}

impl PetStoreClient {
    pub fn new(base_url: &str, api_key: &str) -> Result<Self, ClientError> {
        let base_url = Url::parse(base_url.trim_end_matches('/'))?;
        if base_url.cannot_be_a_base() {
            return Err(ClientError::CannotBeABase(base_url.to_string()));
        }
        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(ClientError::UnsupportedScheme(base_url.scheme().to_string()));
        }
        Ok(Self {
            base_url,
            api_key: api_key.to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    /// Resolve `{base}/{resource}[/{key}]` with `query` appended.
    ///
    /// Each `/`-separated part of `key` becomes its own percent-encoded path
    /// segment, so `store` + `order/5` addresses `/store/order/5` while a
    /// username like `Hello Mr test` stays a single segment.
    pub fn endpoint(&self, resource: Resource, key: Option<&str>, query: &[(&str, &str)]) -> Url {
        let mut url = self.base_url.clone();
        // `new` rejects cannot-be-a-base URLs, so this always succeeds.
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(resource.as_str());
            if let Some(key) = key {
                segments.extend(key.split('/'));
            }
        }
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        url
    }

    /// Build a request for any verb. Every request carries the static
    /// `authorization` header; requests with a body are sent as JSON.
    pub fn build(
        &self,
        method: HttpMethod,
        resource: Resource,
        key: Option<&str>,
        query: &[(&str, &str)],
        body: Option<&Value>,
    ) -> Result<HttpRequest, ClientError> {
        let mut headers = vec![("authorization".to_string(), self.api_key.clone())];
        let body = match body {
            Some(value) => {
                headers.push(("content-type".to_string(), "application/json".to_string()));
                Some(serde_json::to_string(value)?)
            }
            None => None,
        };
        Ok(HttpRequest {
            method,
            url: self.endpoint(resource, key, query).into(),
            headers,
            body,
        })
    }

    pub fn build_get(
        &self,
        resource: Resource,
        key: Option<&str>,
        query: &[(&str, &str)],
    ) -> Result<HttpRequest, ClientError> {
        self.build(HttpMethod::Get, resource, key, query, None)
    }

    pub fn build_post(
        &self,
        resource: Resource,
        key: Option<&str>,
        body: &Value,
    ) -> Result<HttpRequest, ClientError> {
        self.build(HttpMethod::Post, resource, key, &[], Some(body))
    }

    pub fn build_put(
        &self,
        resource: Resource,
        key: Option<&str>,
        body: &Value,
    ) -> Result<HttpRequest, ClientError> {
        self.build(HttpMethod::Put, resource, key, &[], Some(body))
    }

    pub fn build_delete(&self, resource: Resource, key: Option<&str>) -> Result<HttpRequest, ClientError> {
        self.build(HttpMethod::Delete, resource, key, &[], None)
    }
}
