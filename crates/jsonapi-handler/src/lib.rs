//! # JSON:API Request Handler
//!
//! This crate is the request-to-data-access layer of a JSON:API resource
//! server. Given an inbound request and an [`Adapter`] over some persistence
//! layer, it decides which CRUD operation applies, checks the request against
//! protocol rules, turns query-string conventions into a [`Query`], and drives
//! the adapter. Failures come back as protocol-tagged errors.
//!
//! ## Architecture Overview
//!
//! 1. **Validators** ([`validators`]): small checks run in order, first failure wins.
//! 2. **Query translation** ([`Query::build`]): `include`, `filter`, `fields`, `sort`.
//! 3. **Mode resolution** ([`Mode::resolve`]): collection, single, relation or related.
//! 4. **Request handler** ([`RequestHandler`]): `validate`, `read`, `create`,
//!    `update`, `destroy`, plus `handle` which runs the operation for the
//!    handler's configured method.
//!
//! Storage, routing and response rendering live outside this crate.
//!
//! ## Example
//!
//! ```rust
//! use jsonapi_handler::mock::MockAdapter;
//! use jsonapi_handler::{
//!     ApiRequest, Mode, PathParams, PrimaryData, RequestHandler, ResourceConfig,
//! };
//! use http::Method;
//!
//! #[tokio::main]
//! async fn main() {
//!     let adapter = MockAdapter::<String>::new("chapters");
//!     adapter.expect_read().return_ok(PrimaryData::Resource("chapter 5".to_string()));
//!
//!     let handler = RequestHandler::new(ResourceConfig::new("chapters"), adapter.clone());
//!     let request = ApiRequest::new(Method::GET, PathParams::single("5"));
//!
//!     handler.validate(&request).unwrap();
//!     let data = handler.read(&request).await.unwrap();
//!     assert_eq!(data, PrimaryData::Resource("chapter 5".to_string()));
//!
//!     // The path id was pinned into the query's filter.
//!     match &adapter.calls()[0] {
//!         jsonapi_handler::mock::Call::Read { query, mode } => {
//!             assert_eq!(*mode, Mode::Single);
//!             assert_eq!(query.filter["id"], vec!["5"]);
//!         }
//!         other => panic!("unexpected call {:?}", other),
//!     }
//! }
//! ```
//!
//! ## Errors
//!
//! Every protocol failure is a [`StatusError`] carrying its HTTP status. Adapter
//! failures pass through as [`AdapterError`], wrapped in [`HandlerError`].
//!
//! ## Concurrency Model
//!
//! A [`RequestHandler`] holds no per-request state. Share it behind an `Arc`
//! and call it from as many tasks as you like; each call builds its own
//! [`Query`] from the read-only [`ResourceConfig`].

pub mod adapter;
pub mod config;
pub mod error;
pub mod handler;
pub mod mock;
pub mod mode;
pub mod query;
pub mod request;
pub mod tracing;
pub mod validators;

pub use adapter::{Adapter, PrimaryData};
pub use config::{QueryDefaults, ResourceConfig};
pub use error::{is_not_null_violation, AdapterError, ConfigError, HandlerError, StatusError};
pub use handler::{RequestHandler, Response};
pub use mode::Mode;
pub use query::{Direction, Query};
pub use request::{ApiRequest, PathParams, JSONAPI_MEDIA_TYPE};
pub use validators::Validator;
