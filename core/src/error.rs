//! Error types for the todo store and the todo API client.
//!
//! # Design
//! The store has exactly one failure mode: the caller named an id that is
//! not in the collection. The client keeps `NotFound` and `Unauthorized` as
//! dedicated variants because callers branch on them; every other non-2xx
//! response lands in `Http` with the raw status and body for debugging.

use thiserror::Error;

/// Errors returned by `TodoStore` mutations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// No record carries the given id.
    #[error("todo not found: {0}")]
    NotFound(String),
}

/// Errors returned by `TodoClient` build and parse methods.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The server returned 404.
    #[error("resource not found")]
    NotFound,

    /// The server returned 401; the bearer token is missing or was rejected.
    #[error("unauthorized")]
    Unauthorized,

    /// The server returned a status other than the expected one, 401 or 404.
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    Deserialize(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialize(String),
}
