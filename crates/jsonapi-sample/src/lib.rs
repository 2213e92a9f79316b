//! # JSON:API Sample Server
//!
//! A small library-and-table store wired to the `jsonapi-handler` crate.
//!
//! - **[model]**: `books` and `chapters` schemas and the [`Record`](model::Record) they store.
//! - **[store]**: the store actor and its client. All state lives in one task.
//! - **[adapter]**: [`MemoryAdapter`](adapter::MemoryAdapter), the `Adapter` over the store.
//! - **[lifecycle]**: [`ApiSystem`](lifecycle::ApiSystem) starts, routes and stops everything.
//!
//! The binary in `main.rs` walks through a create, read, update and delete
//! session, including a rejected update.

pub mod adapter;
pub mod lifecycle;
pub mod model;
pub mod store;
