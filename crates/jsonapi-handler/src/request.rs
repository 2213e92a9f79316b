//! # Inbound Request
//!
//! A framework-agnostic view of an HTTP request. Routing layers fill this in
//! from whatever server they run on; the handler only ever reads it.

use http::{HeaderMap, HeaderValue, Method};
use serde_json::Value;
use std::collections::BTreeMap;

/// The JSON:API media type.
pub const JSONAPI_MEDIA_TYPE: &str = "application/vnd.api+json";

/// Path parameters that address a resource, a relationship or a related resource.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathParams {
    pub id: Option<String>,
    pub relation: Option<String>,
    pub related: Option<String>,
}

impl PathParams {
    pub fn collection() -> Self {
        Self::default()
    }

    pub fn single(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            ..Self::default()
        }
    }

    pub fn relation(id: impl Into<String>, relation: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            relation: Some(relation.into()),
            related: None,
        }
    }

    pub fn related(id: impl Into<String>, related: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            relation: None,
            related: Some(related.into()),
        }
    }
}

/// An inbound request.
///
/// `query` holds the raw, already percent-decoded query string parameters,
/// keyed by their literal name (`include`, `filter[title]`, `sort`, ...).
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub headers: HeaderMap,
    pub params: PathParams,
    pub query: BTreeMap<String, String>,
    pub body: Option<Value>,
}

impl ApiRequest {
    pub fn new(method: Method, params: PathParams) -> Self {
        Self {
            method,
            headers: HeaderMap::new(),
            params,
            query: BTreeMap::new(),
            body: None,
        }
    }

    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(key.into(), value.into());
        self
    }

    /// Sets a header. Values that are not valid header text are ignored.
    pub fn with_header(mut self, name: http::header::HeaderName, value: &str) -> Self {
        if let Ok(value) = HeaderValue::from_str(value) {
            self.headers.insert(name, value);
        }
        self
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// The `data` member of the body, if there is one.
    pub fn data(&self) -> Option<&Value> {
        self.body.as_ref().and_then(|body| body.get("data"))
    }
}
