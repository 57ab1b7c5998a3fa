//! Core of the todo service: the in-memory store and an API client.
//!
//! # Overview
//! `TodoStore` is the only stateful component of the service. It is a plain
//! synchronous data structure with no knowledge of HTTP, JSON or auth; the
//! server crate wraps it in handlers.
//!
//! `TodoClient` speaks the service's HTTP API without touching the network
//! (host-does-IO pattern): it builds `HttpRequest` values and parses
//! `HttpResponse` values, and the caller executes the round-trip.

pub mod client;
pub mod error;
pub mod http;
pub mod store;
pub mod types;

pub use client::TodoClient;
pub use error::{ClientError, StoreError};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use store::TodoStore;
pub use types::{CompleteTodo, NewTodo, Todo, TodoCreated};
