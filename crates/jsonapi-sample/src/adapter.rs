//! [`Adapter`] over the in-memory store. One instance serves one resource type.

use crate::model::{Record, Schema};
use crate::store::StoreClient;
use async_trait::async_trait;
use http::Method;
use jsonapi_handler::{Adapter, AdapterError, Mode, PrimaryData, Query};
use serde_json::Value;
use tracing::debug;

#[derive(Clone)]
pub struct MemoryAdapter {
    schema: Schema,
    client: StoreClient,
}

impl MemoryAdapter {
    pub fn new(schema: Schema, client: StoreClient) -> Self {
        Self { schema, client }
    }
}

#[async_trait]
impl Adapter for MemoryAdapter {
    type Model = Record;

    fn type_name(&self) -> &str {
        self.schema.type_name
    }

    /// An unknown `relation` reads as a missing resource.
    async fn by_id(
        &self,
        id: &str,
        relation: Option<&str>,
    ) -> Result<Option<Record>, AdapterError> {
        if let Some(relation) = relation {
            if self.schema.relation(relation).is_none() {
                debug!(type_name = self.schema.type_name, relation, "Unknown relation");
                return Ok(None);
            }
        }
        self.client.get(self.schema.type_name, id).await
    }

    async fn create(&self, method: &Method, data: Value) -> Result<Record, AdapterError> {
        debug!(type_name = self.schema.type_name, %method, "Create");
        self.client.insert(self.schema.type_name, data).await
    }

    async fn update(
        &self,
        model: Record,
        method: &Method,
        data: Value,
    ) -> Result<Record, AdapterError> {
        debug!(type_name = self.schema.type_name, id = %model.id, %method, "Update");
        self.client.update(self.schema.type_name, &model.id, data).await
    }

    async fn destroy(&self, model: Record, method: &Method) -> Result<(), AdapterError> {
        debug!(type_name = self.schema.type_name, id = %model.id, %method, "Destroy");
        self.client.remove(self.schema.type_name, &model.id).await
    }

    async fn read(&self, query: &Query, mode: Mode) -> Result<PrimaryData<Record>, AdapterError> {
        let rows = self.client.find(self.schema.type_name, query.clone()).await?;
        Ok(match mode {
            Mode::Single => rows
                .into_iter()
                .next()
                .map_or(PrimaryData::Null, PrimaryData::Resource),
            _ => PrimaryData::Collection(rows),
        })
    }

    async fn related(
        &self,
        query: &Query,
        relation: &str,
        model: &Record,
    ) -> Result<PrimaryData<Record>, AdapterError> {
        self.client
            .related(self.schema.type_name, &model.id, relation, query.clone())
            .await
    }
}
