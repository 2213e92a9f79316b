//! # Request Handler
//!
//! `RequestHandler` owns one resource's configuration and its adapter and
//! turns validated requests into adapter calls.
//!
//! ## Operations
//!
//! * **read**: builds the [`Query`], resolves the [`Mode`], then
//!     * `Related`: loads the base resource (404 when absent) and asks the
//!       adapter for the related resource(s).
//!     * `Relation`: not supported, fails with [`HandlerError::Unimplemented`].
//!     * `Collection` / `Single`: pins `filter.id` to the path id when there is
//!       one and delegates to [`Adapter::read`]. The path id replaces any
//!       `filter[id]` from the query string.
//! * **create**: refuses a client-supplied id that already exists (409), then
//!   delegates to [`Adapter::create`].
//! * **update**: loads the target (404 when absent). On a relationship route
//!   the payload becomes `{ type, links: { <relation>: data } }`. Store errors
//!   that look like NOT NULL violations become 409.
//! * **destroy**: deletes the target when it exists. Deleting something that
//!   is not there succeeds with nothing.
//!
//! Adapter calls inside one operation run in sequence. Nothing is retried.

use crate::adapter::{Adapter, PrimaryData};
use crate::config::ResourceConfig;
use crate::error::{is_not_null_violation, AdapterError, HandlerError, StatusError};
use crate::mode::Mode;
use crate::query::Query;
use crate::request::ApiRequest;
use crate::validators::{self, id_text};
use http::{Method, StatusCode};
use serde_json::{Map, Value};
use tracing::{debug, info, instrument, warn};

/// A successful outcome from [`RequestHandler::handle`].
#[derive(Debug, Clone, PartialEq)]
pub struct Response<M> {
    pub status: StatusCode,
    pub data: Option<PrimaryData<M>>,
}

pub struct RequestHandler<A: Adapter> {
    config: ResourceConfig,
    adapter: A,
}

impl<A: Adapter> RequestHandler<A> {
    pub fn new(config: ResourceConfig, adapter: A) -> Self {
        Self { config, adapter }
    }

    pub fn config(&self) -> &ResourceConfig {
        &self.config
    }

    /// Runs the validation pipeline. Callers must not proceed on `Err`.
    #[instrument(skip_all, fields(type_name = %self.config.type_name, method = %request.method))]
    pub fn validate(&self, request: &ApiRequest) -> Result<(), StatusError> {
        validators::run(request, &self.config).inspect_err(|e| {
            warn!(status = %e.status, message = %e.message, "Validation failed");
        })
    }

    /// Validates `request` and runs the one operation this handler serves.
    ///
    /// The operation follows the configured method label. A request whose
    /// method differs from that label is answered with 405.
    #[instrument(skip_all, fields(type_name = %self.config.type_name, method = %request.method))]
    pub async fn handle(&self, request: &ApiRequest) -> Result<Response<A::Model>, HandlerError> {
        self.validate(request)?;

        let method = &self.config.method;
        if request.method != *method {
            warn!(served = %method, "Method not served by this handler");
            return Err(self.method_not_allowed(&request.method).into());
        }

        let response = if method == Method::GET {
            Response {
                status: StatusCode::OK,
                data: Some(self.read(request).await?),
            }
        } else if method == Method::POST {
            Response {
                status: StatusCode::CREATED,
                data: Some(PrimaryData::Resource(self.create(request).await?)),
            }
        } else if method == Method::PATCH {
            Response {
                status: StatusCode::OK,
                data: Some(PrimaryData::Resource(self.update(request).await?)),
            }
        } else if method == Method::DELETE {
            self.destroy(request).await?;
            Response {
                status: StatusCode::NO_CONTENT,
                data: None,
            }
        } else {
            return Err(self.method_not_allowed(method).into());
        };
        Ok(response)
    }

    #[instrument(skip_all, fields(type_name = %self.config.type_name, params = ?request.params))]
    pub async fn read(&self, request: &ApiRequest) -> Result<PrimaryData<A::Model>, HandlerError> {
        let mut query = Query::build(request, &self.config);
        let mode = Mode::resolve(&request.params)?;
        debug!(%mode, ?query, "Read");

        match mode {
            Mode::Related => {
                let id = required(request.params.id.as_deref(), "id")?;
                let relation = required(request.params.related.as_deref(), "related")?;
                let base = self
                    .adapter
                    .by_id(id, Some(relation))
                    .await?
                    .ok_or_else(|| self.not_found(id))?;
                let data = self.adapter.related(&query, relation, &base).await?;
                info!(%id, relation, count = data.len(), "Read related");
                Ok(data)
            }
            Mode::Relation => {
                warn!("Relationship linkage reads are not supported");
                Err(HandlerError::Unimplemented("Reading relationship linkage"))
            }
            Mode::Collection | Mode::Single => {
                if let Some(id) = &request.params.id {
                    query.filter.insert("id".to_string(), vec![id.clone()]);
                }
                let data = self.adapter.read(&query, mode).await?;
                info!(%mode, count = data.len(), "Read");
                Ok(data)
            }
        }
    }

    #[instrument(skip_all, fields(type_name = %self.config.type_name))]
    pub async fn create(&self, request: &ApiRequest) -> Result<A::Model, HandlerError> {
        let data = request
            .data()
            .cloned()
            .ok_or_else(|| StatusError::bad_request("Request body must contain `data`"))?;
        debug!(?data, "Create");

        if let Some(id) = data.get("id").and_then(id_text) {
            if self.adapter.by_id(&id, None).await?.is_some() {
                warn!(%id, "Client-generated id already exists");
                return Err(StatusError::conflict(format!(
                    "{} {} already exists",
                    self.config.type_name, id
                ))
                .into());
            }
        }

        let created = self.adapter.create(&self.config.method, data).await?;
        info!("Created");
        Ok(created)
    }

    #[instrument(skip_all, fields(type_name = %self.config.type_name, params = ?request.params))]
    pub async fn update(&self, request: &ApiRequest) -> Result<A::Model, HandlerError> {
        let id = required(request.params.id.as_deref(), "id")?;
        let model = self
            .adapter
            .by_id(id, None)
            .await?
            .ok_or_else(|| self.not_found(id))?;

        let data = match request.params.relation.as_deref() {
            Some(relation) => {
                let linkage = request
                    .data()
                    .cloned()
                    .ok_or_else(|| StatusError::bad_request("Request body must contain `data`"))?;
                self.relationship_envelope(relation, linkage)
            }
            None => request
                .data()
                .cloned()
                .ok_or_else(|| StatusError::bad_request("Request body must contain `data`"))?,
        };
        debug!(%id, ?data, "Update");

        let updated = self
            .adapter
            .update(model, &self.config.method, data)
            .await
            .map_err(translate_update_error)?;
        info!(%id, "Updated");
        Ok(updated)
    }

    #[instrument(skip_all, fields(type_name = %self.config.type_name, params = ?request.params))]
    pub async fn destroy(&self, request: &ApiRequest) -> Result<Option<A::Model>, HandlerError> {
        let id = required(request.params.id.as_deref(), "id")?;
        match self.adapter.by_id(id, None).await? {
            Some(model) => {
                self.adapter
                    .destroy(model.clone(), &self.config.method)
                    .await?;
                info!(%id, "Destroyed");
                Ok(Some(model))
            }
            None => {
                debug!(%id, "Nothing to destroy");
                Ok(None)
            }
        }
    }

    /// Expresses a relationship update as a resource update touching only `links`.
    fn relationship_envelope(&self, relation: &str, linkage: Value) -> Value {
        let mut links = Map::new();
        links.insert(relation.to_string(), linkage);

        let mut envelope = Map::new();
        envelope.insert(
            "type".to_string(),
            Value::String(self.adapter.type_name().to_string()),
        );
        envelope.insert("links".to_string(), Value::Object(links));
        Value::Object(envelope)
    }

    fn method_not_allowed(&self, method: &Method) -> StatusError {
        StatusError::method_not_allowed(format!(
            "{} is not supported on {}",
            method, self.config.type_name
        ))
    }

    fn not_found(&self, id: &str) -> StatusError {
        warn!(%id, "Not found");
        StatusError::not_found(format!("{} {} not found", self.config.type_name, id))
    }
}

fn required<'a>(value: Option<&'a str>, name: &str) -> Result<&'a str, StatusError> {
    value.ok_or_else(|| StatusError::bad_request(format!("Missing `{}` path parameter", name)))
}

fn translate_update_error(err: AdapterError) -> HandlerError {
    if is_not_null_violation(&err) {
        warn!(error = %err, "Update violates a NOT NULL constraint");
        StatusError::conflict(err.to_string()).into()
    } else {
        err.into()
    }
}
