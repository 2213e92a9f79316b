//! Messages sent from a [`StoreClient`](super::StoreClient) to the
//! [`StoreActor`](super::StoreActor).

use super::error::StoreError;
use crate::model::Record;
use jsonapi_handler::{PrimaryData, Query};
use serde_json::Value;
use tokio::sync::oneshot;

/// One-shot reply channel used by the store.
pub type Response<T> = oneshot::Sender<Result<T, StoreError>>;

#[derive(Debug)]
pub enum StoreRequest {
    Get {
        type_name: String,
        id: String,
        respond_to: Response<Option<Record>>,
    },
    Insert {
        type_name: String,
        data: Value,
        respond_to: Response<Record>,
    },
    Update {
        type_name: String,
        id: String,
        data: Value,
        respond_to: Response<Record>,
    },
    Remove {
        type_name: String,
        id: String,
        respond_to: Response<()>,
    },
    Find {
        type_name: String,
        query: Query,
        respond_to: Response<Vec<Record>>,
    },
    Related {
        type_name: String,
        id: String,
        relation: String,
        query: Query,
        respond_to: Response<PrimaryData<Record>>,
    },
}
