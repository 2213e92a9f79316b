use crate::adapter::MemoryAdapter;
use crate::model::{book, chapter, Record, BOOKS, CHAPTERS};
use crate::store::StoreActor;
use jsonapi_handler::validators::{id_matches_path, known_attributes, type_matches};
use jsonapi_handler::{
    ApiRequest, ConfigError, HandlerError, RequestHandler, ResourceConfig, Response, StatusError,
};
use http::Method;
use std::collections::HashMap;
use tracing::{error, info};

const BOOKS_CONFIG: &str = include_str!("../../config/books.json");
const CHAPTERS_CONFIG: &str = include_str!("../../config/chapters.json");

/// Request channel capacity of the store.
const STORE_BUFFER: usize = 64;

/// Methods each resource is served for, one handler apiece.
const ROUTED_METHODS: [Method; 4] = [Method::GET, Method::POST, Method::PATCH, Method::DELETE];

/// The running sample server: a store actor plus, for each resource, one
/// handler per routed method.
///
/// # Example
///
/// ```ignore
/// let system = ApiSystem::new()?;
///
/// let request = ApiRequest::new(Method::GET, PathParams::collection());
/// let response = system.handle(BOOKS, &request).await?;
///
/// system.shutdown().await?;
/// ```
pub struct ApiSystem {
    handlers: HashMap<&'static str, Vec<RequestHandler<MemoryAdapter>>>,
    store_task: tokio::task::JoinHandle<()>,
}

impl ApiSystem {
    /// Loads the resource configurations and spawns the store.
    ///
    /// Must be called from inside a Tokio runtime.
    pub fn new() -> Result<Self, ConfigError> {
        let books_config = load(BOOKS_CONFIG)?;
        let chapters_config = load(CHAPTERS_CONFIG)?;

        let (actor, client) = StoreActor::new(STORE_BUFFER);
        let store_task = tokio::spawn(actor.run());

        let books = MemoryAdapter::new(book::schema(), client.clone());
        let chapters = MemoryAdapter::new(chapter::schema(), client);

        let mut handlers = HashMap::new();
        handlers.insert(BOOKS, per_method(&books_config, &books));
        handlers.insert(CHAPTERS, per_method(&chapters_config, &chapters));

        info!(resources = handlers.len(), "API system started");
        Ok(Self {
            handlers,
            store_task,
        })
    }

    /// The handler serving `method` on `type_name`, if there is one.
    pub fn handler(
        &self,
        type_name: &str,
        method: &Method,
    ) -> Option<&RequestHandler<MemoryAdapter>> {
        self.handlers
            .get(type_name)?
            .iter()
            .find(|handler| handler.config().method == *method)
    }

    /// Routes `request` by resource type and method.
    ///
    /// An unknown type is a 404 and an unrouted method a 405.
    pub async fn handle(
        &self,
        type_name: &str,
        request: &ApiRequest,
    ) -> Result<Response<Record>, HandlerError> {
        if !self.handlers.contains_key(type_name) {
            return Err(StatusError::not_found(format!("No resource named {}", type_name)).into());
        }
        let handler = self.handler(type_name, &request.method).ok_or_else(|| {
            StatusError::method_not_allowed(format!(
                "{} is not supported on {}",
                request.method, type_name
            ))
        })?;
        handler.handle(request).await
    }

    /// Drops every store client and waits for the store to stop.
    pub async fn shutdown(self) -> Result<(), String> {
        info!("Shutting down API system...");
        drop(self.handlers);

        if let Err(e) = self.store_task.await {
            error!(error = %e, "Store task failed");
            return Err(format!("Store task failed: {}", e));
        }
        info!("API system shut down");
        Ok(())
    }
}

fn per_method(
    config: &ResourceConfig,
    adapter: &MemoryAdapter,
) -> Vec<RequestHandler<MemoryAdapter>> {
    ROUTED_METHODS
        .iter()
        .map(|method| {
            let config = config.clone().with_method(method.clone());
            RequestHandler::new(config, adapter.clone())
        })
        .collect()
}

fn load(source: &str) -> Result<ResourceConfig, ConfigError> {
    Ok(ResourceConfig::from_json(source)?
        .with_validator(type_matches)
        .with_validator(id_matches_path)
        .with_validator(known_attributes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::schemas;

    #[test]
    fn test_embedded_configs_load() {
        let books = load(BOOKS_CONFIG).unwrap();
        let chapters = load(CHAPTERS_CONFIG).unwrap();

        assert_eq!(books.type_name, BOOKS);
        assert_eq!(chapters.type_name, CHAPTERS);
        assert_eq!(chapters.defaults.sort, Some(vec!["ordering".to_string()]));
        assert_eq!(books.validators.len(), 3);
    }

    #[test]
    fn test_config_attributes_match_schemas() {
        for schema in schemas() {
            let source = match schema.type_name {
                BOOKS => BOOKS_CONFIG,
                _ => CHAPTERS_CONFIG,
            };
            let config = load(source).unwrap();
            for attribute in schema.attributes {
                assert!(
                    config.has_attribute(attribute),
                    "{} lacks {}",
                    config.type_name,
                    attribute
                );
            }
        }
    }

    #[tokio::test]
    async fn test_each_method_has_its_own_handler() {
        let system = ApiSystem::new().unwrap();

        for type_name in [BOOKS, CHAPTERS] {
            for method in ROUTED_METHODS {
                let handler = system.handler(type_name, &method).unwrap();
                assert_eq!(handler.config().method, method);
                assert_eq!(handler.config().type_name, type_name);
            }
        }
        assert!(system.handler(BOOKS, &Method::PUT).is_none());

        system.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_unknown_resource_is_not_found() {
        let system = ApiSystem::new().unwrap();
        let request = ApiRequest::new(http::Method::GET, jsonapi_handler::PathParams::collection());

        let err = system.handle("authors", &request).await.unwrap_err();
        assert_eq!(err.status(), http::StatusCode::NOT_FOUND);

        system.shutdown().await.unwrap();
    }
}
