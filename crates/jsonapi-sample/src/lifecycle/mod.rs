//! # System Lifecycle
//!
//! Starts the store, wires one [`RequestHandler`](jsonapi_handler::RequestHandler)
//! per resource type onto it, and shuts everything down again.
//!
//! Shutdown follows the channel-closure rule: dropping every
//! [`StoreClient`](crate::store::StoreClient) (each handler's adapter holds
//! one) ends the actor's receive loop, and [`ApiSystem::shutdown`] then awaits
//! the actor task.
//!
//! Resource configurations are embedded JSON files under `config/`. Their
//! validators are attached in code after loading.

pub mod api_system;

pub use api_system::*;
