//! Stateless HTTP request builder and response parser for the todo API.
//!
//! # Design
//! `TodoClient` holds a base URL and an optional bearer token and nothing
//! else. Each operation is split into a `build_*` method that produces an
//! `HttpRequest` and a `parse_*` method that consumes an `HttpResponse`; the
//! caller performs the round-trip in between.

use crate::error::ClientError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{CompleteTodo, NewTodo, Todo, TodoCreated};

/// Synchronous, stateless client for the todo API.
#[derive(Debug, Clone)]
pub struct TodoClient {
    base_url: String,
    token: Option<String>,
}

impl TodoClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token: None,
        }
    }

    /// Attaches `Authorization: Bearer <token>` to every built request.
    pub fn with_bearer_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn build_list_todos(&self) -> HttpRequest {
        self.request(HttpMethod::Get, format!("{}/todo", self.base_url))
    }

    pub fn build_add_todo(&self, input: &NewTodo) -> Result<HttpRequest, ClientError> {
        let body = to_json(input)?;
        Ok(self
            .request(HttpMethod::Post, format!("{}/todo", self.base_url))
            .with_json(body))
    }

    pub fn build_delete_todo(&self, id: &str) -> HttpRequest {
        self.request(HttpMethod::Delete, format!("{}/todo/{id}", self.base_url))
    }

    pub fn build_complete_todo(&self, id: &str) -> Result<HttpRequest, ClientError> {
        let body = to_json(&CompleteTodo { id: id.to_string() })?;
        Ok(self
            .request(HttpMethod::Put, format!("{}/todo", self.base_url))
            .with_json(body))
    }

    pub fn parse_list_todos(&self, response: HttpResponse) -> Result<Vec<Todo>, ClientError> {
        check_status(&response, 200)?;
        from_json(&response.body)
    }

    /// Returns the id assigned by the server.
    pub fn parse_add_todo(&self, response: HttpResponse) -> Result<String, ClientError> {
        check_status(&response, 201)?;
        let created: TodoCreated = from_json(&response.body)?;
        Ok(created.id)
    }

    pub fn parse_delete_todo(&self, response: HttpResponse) -> Result<(), ClientError> {
        check_status(&response, 204)
    }

    pub fn parse_complete_todo(&self, response: HttpResponse) -> Result<(), ClientError> {
        check_status(&response, 204)
    }

    fn request(&self, method: HttpMethod, url: String) -> HttpRequest {
        HttpRequest::new(method, url).with_bearer(self.token.as_deref())
    }
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, ClientError> {
    serde_json::to_string(value).map_err(|e| ClientError::Serialize(e.to_string()))
}

fn from_json<T: serde::de::DeserializeOwned>(body: &str) -> Result<T, ClientError> {
    serde_json::from_str(body).map_err(|e| ClientError::Deserialize(e.to_string()))
}

/// Map non-success status codes to the appropriate `ClientError` variant.
fn check_status(response: &HttpResponse, expected: u16) -> Result<(), ClientError> {
    match response.status {
        status if status == expected => Ok(()),
        404 => Err(ClientError::NotFound),
        401 => Err(ClientError::Unauthorized),
        status => Err(ClientError::Http {
            status,
            body: response.body.clone(),
        }),
    }
}
