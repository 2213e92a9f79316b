//! # Store Client
//!
//! Cheap-to-clone handle for sending requests to the [`StoreActor`](super::StoreActor).

use super::message::{Response, StoreRequest};
use crate::model::Record;
use jsonapi_handler::{AdapterError, PrimaryData, Query};
use serde_json::Value;
use tokio::sync::{mpsc, oneshot};

/// Forwards requests over an mpsc channel and awaits the reply on a oneshot.
///
/// Store failures come back as [`AdapterError::Store`] carrying the store's
/// message; a stopped store shows up as [`AdapterError::Closed`] or
/// [`AdapterError::Dropped`].
#[derive(Clone)]
pub struct StoreClient {
    sender: mpsc::Sender<StoreRequest>,
}

impl StoreClient {
    pub fn new(sender: mpsc::Sender<StoreRequest>) -> Self {
        Self { sender }
    }

    async fn request<T>(
        &self,
        build: impl FnOnce(Response<T>) -> StoreRequest,
    ) -> Result<T, AdapterError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(build(respond_to))
            .await
            .map_err(|_| AdapterError::Closed)?;
        response
            .await
            .map_err(|_| AdapterError::Dropped)?
            .map_err(|e| AdapterError::Store(e.to_string()))
    }

    pub async fn get(&self, type_name: &str, id: &str) -> Result<Option<Record>, AdapterError> {
        let (type_name, id) = (type_name.to_string(), id.to_string());
        self.request(|respond_to| StoreRequest::Get {
            type_name,
            id,
            respond_to,
        })
        .await
    }

    pub async fn insert(&self, type_name: &str, data: Value) -> Result<Record, AdapterError> {
        let type_name = type_name.to_string();
        self.request(|respond_to| StoreRequest::Insert {
            type_name,
            data,
            respond_to,
        })
        .await
    }

    pub async fn update(
        &self,
        type_name: &str,
        id: &str,
        data: Value,
    ) -> Result<Record, AdapterError> {
        let (type_name, id) = (type_name.to_string(), id.to_string());
        self.request(|respond_to| StoreRequest::Update {
            type_name,
            id,
            data,
            respond_to,
        })
        .await
    }

    pub async fn remove(&self, type_name: &str, id: &str) -> Result<(), AdapterError> {
        let (type_name, id) = (type_name.to_string(), id.to_string());
        self.request(|respond_to| StoreRequest::Remove {
            type_name,
            id,
            respond_to,
        })
        .await
    }

    pub async fn find(&self, type_name: &str, query: Query) -> Result<Vec<Record>, AdapterError> {
        let type_name = type_name.to_string();
        self.request(|respond_to| StoreRequest::Find {
            type_name,
            query,
            respond_to,
        })
        .await
    }

    pub async fn related(
        &self,
        type_name: &str,
        id: &str,
        relation: &str,
        query: Query,
    ) -> Result<PrimaryData<Record>, AdapterError> {
        let (type_name, id, relation) = (
            type_name.to_string(),
            id.to_string(),
            relation.to_string(),
        );
        self.request(|respond_to| StoreRequest::Related {
            type_name,
            id,
            relation,
            query,
            respond_to,
        })
        .await
    }
}
