//! Domain DTOs for the todo service.
//!
//! # Design
//! The server and the client share these types, so the JSON schema has a
//! single definition. `Todo` is what the store holds and what `GET /todo`
//! returns; the other three are request/response bodies for the mutating
//! endpoints.

use serde::{Deserialize, Serialize};

/// A single todo record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Todo {
    pub id: String,
    pub message: String,
    pub complete: bool,
}

/// Request payload for `POST /todo`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTodo {
    pub message: String,
}

/// Response payload for `POST /todo`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TodoCreated {
    pub id: String,
}

/// Request payload for `PUT /todo`. Extra fields are ignored, so a client
/// may send back a whole `Todo`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompleteTodo {
    pub id: String,
}
