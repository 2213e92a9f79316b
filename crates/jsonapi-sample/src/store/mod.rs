//! # In-Memory Store
//!
//! A single actor owns every record. [`StoreClient`] handles talk to it over a
//! channel, so the store needs no locks: requests are applied one at a time in
//! the order they arrive.
//!
//! 1. **Create**: `StoreActor::new()` returns the actor and a client.
//! 2. **Run**: spawn `actor.run()` on the runtime.
//! 3. **Use**: clone the client freely. The actor stops once every client is dropped.

pub mod actor;
pub mod client;
pub mod error;
pub mod message;

pub use actor::StoreActor;
pub use client::StoreClient;
pub use error::StoreError;
pub use message::{Response, StoreRequest};
