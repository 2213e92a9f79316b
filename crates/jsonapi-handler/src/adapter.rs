//! # Adapter Trait
//!
//! The `Adapter` trait is the contract between the request handler and a
//! persistence layer. The handler decides *what* to do with a request; the
//! adapter does the storage work. Nothing in this crate implements it except
//! the [`mock`](crate::mock) used in tests.
//!
//! Models are opaque to the handler. It only passes them back to the adapter
//! (for `update`, `destroy` and `related`) or returns them to the caller.

use crate::error::AdapterError;
use crate::mode::Mode;
use crate::query::Query;
use async_trait::async_trait;
use http::Method;
use serde::Serialize;
use serde_json::Value;
use std::fmt::Debug;

/// What a read resolves to.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PrimaryData<M> {
    Resource(M),
    Collection(Vec<M>),
    Null,
}

impl<M> PrimaryData<M> {
    pub fn into_vec(self) -> Vec<M> {
        match self {
            PrimaryData::Resource(m) => vec![m],
            PrimaryData::Collection(items) => items,
            PrimaryData::Null => Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            PrimaryData::Resource(_) => 1,
            PrimaryData::Collection(items) => items.len(),
            PrimaryData::Null => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Persistence operations the handler drives.
///
/// `method` is the label of the handler's configuration, passed through so an
/// adapter can apply method-specific rules.
#[async_trait]
pub trait Adapter: Send + Sync {
    type Model: Clone + Debug + Send + Sync + 'static;

    /// The resource type this adapter serves.
    fn type_name(&self) -> &str;

    /// Looks up one resource, preparing `relation` for a follow-up `related` call.
    async fn by_id(&self, id: &str, relation: Option<&str>)
        -> Result<Option<Self::Model>, AdapterError>;

    async fn create(&self, method: &Method, data: Value) -> Result<Self::Model, AdapterError>;

    async fn update(
        &self,
        model: Self::Model,
        method: &Method,
        data: Value,
    ) -> Result<Self::Model, AdapterError>;

    async fn destroy(&self, model: Self::Model, method: &Method) -> Result<(), AdapterError>;

    async fn read(&self, query: &Query, mode: Mode)
        -> Result<PrimaryData<Self::Model>, AdapterError>;

    /// Resolves `relation` of `model`, scoped by `query`.
    async fn related(
        &self,
        query: &Query,
        relation: &str,
        model: &Self::Model,
    ) -> Result<PrimaryData<Self::Model>, AdapterError>;
}
