//! # Mock Adapter & Testing Guide
//!
//! `MockAdapter<M>` implements [`Adapter`] entirely in memory. You queue the
//! responses each adapter call should get, run the handler, then inspect the
//! calls it made. No store and no runtime setup beyond `#[tokio::test]`.
//!
//! ## When to use the mock vs a real store
//!
//! | Feature | MockAdapter | Real store |
//! |---------|-------------|------------|
//! | **Speed** | Instant | Fast (but involves tokio spawn) |
//! | **Determinism** | 100% deterministic | Subject to scheduler |
//! | **State** | None (expectations) | Real records |
//! | **Use case** | Handler decisions, payload shapes | End-to-end flows |
//! | **Error injection** | Easy (`return_err`) | Needs the store to misbehave |
//!
//! ## Example
//!
//! ```rust
//! use jsonapi_handler::mock::MockAdapter;
//! use jsonapi_handler::{ApiRequest, PathParams, RequestHandler, ResourceConfig};
//! use http::{Method, StatusCode};
//!
//! #[tokio::main]
//! async fn main() {
//!     let mock = MockAdapter::<String>::new("chapters");
//!     mock.expect_by_id("7").return_ok(None);
//!
//!     let handler = RequestHandler::new(ResourceConfig::new("chapters"), mock.clone());
//!     let request = ApiRequest::new(Method::PATCH, PathParams::single("7"));
//!
//!     let err = handler.update(&request).await.unwrap_err();
//!     assert_eq!(err.status(), StatusCode::NOT_FOUND);
//!     mock.verify();
//! }
//! ```
//!
//! Expectations are consumed in the order they were queued. A call that does
//! not match the next expectation panics, which fails the test at the point
//! the handler went wrong.

use crate::adapter::{Adapter, PrimaryData};
use crate::error::AdapterError;
use crate::mode::Mode;
use crate::query::Query;
use async_trait::async_trait;
use http::Method;
use serde_json::Value;
use std::collections::VecDeque;
use std::fmt::Debug;
use std::sync::{Arc, Mutex, MutexGuard};

/// A call the handler made, as recorded by [`MockAdapter`].
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    ById { id: String, relation: Option<String> },
    Create { method: Method, data: Value },
    Update { method: Method, data: Value },
    Destroy { method: Method },
    Read { query: Query, mode: Mode },
    Related { query: Query, relation: String },
}

enum Expectation<M> {
    ById {
        id: String,
        response: Result<Option<M>, AdapterError>,
    },
    Create(Result<M, AdapterError>),
    Update(Result<M, AdapterError>),
    Destroy(Result<(), AdapterError>),
    Read(Result<PrimaryData<M>, AdapterError>),
    Related(Result<PrimaryData<M>, AdapterError>),
}

impl<M> Expectation<M> {
    fn name(&self) -> &'static str {
        match self {
            Expectation::ById { .. } => "by_id",
            Expectation::Create(_) => "create",
            Expectation::Update(_) => "update",
            Expectation::Destroy(_) => "destroy",
            Expectation::Read(_) => "read",
            Expectation::Related(_) => "related",
        }
    }
}

struct MockState<M> {
    expectations: VecDeque<Expectation<M>>,
    calls: Vec<Call>,
}

/// An [`Adapter`] that answers from a queue of expectations.
///
/// Clones share state, so a test can keep one clone while the handler owns another.
pub struct MockAdapter<M> {
    type_name: String,
    state: Arc<Mutex<MockState<M>>>,
}

impl<M> Clone for MockAdapter<M> {
    fn clone(&self) -> Self {
        Self {
            type_name: self.type_name.clone(),
            state: Arc::clone(&self.state),
        }
    }
}

impl<M: Clone + Debug + Send + Sync + 'static> MockAdapter<M> {
    /// Creates a mock with no expectations.
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            state: Arc::new(Mutex::new(MockState {
                expectations: VecDeque::new(),
                calls: Vec::new(),
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, MockState<M>> {
        self.state.lock().expect("mock state poisoned")
    }

    fn builder<T>(
        &self,
        wrap: impl FnOnce(Result<T, AdapterError>) -> Expectation<M> + Send + 'static,
    ) -> ExpectationBuilder<M, T> {
        ExpectationBuilder {
            state: Arc::clone(&self.state),
            wrap: Box::new(wrap),
        }
    }

    /// Expects a `by_id` lookup of `id`.
    pub fn expect_by_id(&self, id: impl Into<String>) -> ExpectationBuilder<M, Option<M>> {
        let id = id.into();
        self.builder(move |response| Expectation::ById { id, response })
    }

    pub fn expect_create(&self) -> ExpectationBuilder<M, M> {
        self.builder(Expectation::Create)
    }

    pub fn expect_update(&self) -> ExpectationBuilder<M, M> {
        self.builder(Expectation::Update)
    }

    pub fn expect_destroy(&self) -> ExpectationBuilder<M, ()> {
        self.builder(Expectation::Destroy)
    }

    pub fn expect_read(&self) -> ExpectationBuilder<M, PrimaryData<M>> {
        self.builder(Expectation::Read)
    }

    pub fn expect_related(&self) -> ExpectationBuilder<M, PrimaryData<M>> {
        self.builder(Expectation::Related)
    }

    /// Every call received so far, oldest first.
    pub fn calls(&self) -> Vec<Call> {
        self.lock().calls.clone()
    }

    /// Panics unless every queued expectation was consumed.
    pub fn verify(&self) {
        let state = self.lock();
        if !state.expectations.is_empty() {
            panic!(
                "Not all expectations were met. {} remaining",
                state.expectations.len()
            );
        }
    }

    fn next(&self, call: Call) -> Expectation<M> {
        let mut state = self.lock();
        let expectation = state.expectations.pop_front();
        match expectation {
            Some(expectation) => {
                state.calls.push(call);
                expectation
            }
            None => panic!("Unexpected adapter call: {:?}", call),
        }
    }
}

/// Queues the response for one expected call.
pub struct ExpectationBuilder<M, T> {
    state: Arc<Mutex<MockState<M>>>,
    wrap: Box<dyn FnOnce(Result<T, AdapterError>) -> Expectation<M> + Send>,
}

impl<M, T> ExpectationBuilder<M, T> {
    pub fn return_ok(self, value: T) {
        self.push(Ok(value));
    }

    pub fn return_err(self, error: AdapterError) {
        self.push(Err(error));
    }

    fn push(self, response: Result<T, AdapterError>) {
        let expectation = (self.wrap)(response);
        self.state
            .lock()
            .expect("mock state poisoned")
            .expectations
            .push_back(expectation);
    }
}

fn mismatch<M>(want: &'static str, got: Expectation<M>) -> ! {
    panic!("Expected a {} call, but the next expectation is {}", want, got.name())
}

#[async_trait]
impl<M: Clone + Debug + Send + Sync + 'static> Adapter for MockAdapter<M> {
    type Model = M;

    fn type_name(&self) -> &str {
        &self.type_name
    }

    async fn by_id(&self, id: &str, relation: Option<&str>) -> Result<Option<M>, AdapterError> {
        let call = Call::ById {
            id: id.to_string(),
            relation: relation.map(str::to_string),
        };
        match self.next(call) {
            Expectation::ById { id: want, response } => {
                assert_eq!(want, id, "by_id called with an unexpected id");
                response
            }
            other => mismatch("by_id", other),
        }
    }

    async fn create(&self, method: &Method, data: Value) -> Result<M, AdapterError> {
        let call = Call::Create {
            method: method.clone(),
            data,
        };
        match self.next(call) {
            Expectation::Create(response) => response,
            other => mismatch("create", other),
        }
    }

    async fn update(&self, _model: M, method: &Method, data: Value) -> Result<M, AdapterError> {
        let call = Call::Update {
            method: method.clone(),
            data,
        };
        match self.next(call) {
            Expectation::Update(response) => response,
            other => mismatch("update", other),
        }
    }

    async fn destroy(&self, _model: M, method: &Method) -> Result<(), AdapterError> {
        let call = Call::Destroy {
            method: method.clone(),
        };
        match self.next(call) {
            Expectation::Destroy(response) => response,
            other => mismatch("destroy", other),
        }
    }

    async fn read(&self, query: &Query, mode: Mode) -> Result<PrimaryData<M>, AdapterError> {
        let call = Call::Read {
            query: query.clone(),
            mode,
        };
        match self.next(call) {
            Expectation::Read(response) => response,
            other => mismatch("read", other),
        }
    }

    async fn related(
        &self,
        query: &Query,
        relation: &str,
        _model: &M,
    ) -> Result<PrimaryData<M>, AdapterError> {
        let call = Call::Related {
            query: query.clone(),
            relation: relation.to_string(),
        };
        match self.next(call) {
            Expectation::Related(response) => response,
            other => mismatch("related", other),
        }
    }
}
