//! Helpers shared by the integration tests.
#![allow(dead_code)]

use std::sync::Arc;

use axum::http::{self, Request};
use http_body_util::BodyExt;
use jsonwebtoken::{encode, get_current_timestamp, jwk::JwkSet, Algorithm, EncodingKey, Header};
use serde_json::json;
use todo_core::TodoStore;
use todo_server::Authenticator;

pub const ISSUER: &str = "https://issuer.test/";
pub const AUDIENCE: &str = "https://todo.test";
pub const KID: &str = "test-key";

/// HMAC secret behind `jwks()`; `k` below is its unpadded base64url form.
pub const SECRET: &[u8] = b"todo-server-test-secret-32-bytes";
const SECRET_B64: &str = "dG9kby1zZXJ2ZXItdGVzdC1zZWNyZXQtMzItYnl0ZXM";

pub fn jwks() -> JwkSet {
    jwks_with_kid(KID)
}

pub fn jwks_with_kid(kid: &str) -> JwkSet {
    serde_json::from_value(json!({
        "keys": [{"kty": "oct", "kid": kid, "alg": "HS256", "k": SECRET_B64}]
    }))
    .unwrap()
}

pub fn authenticator() -> Authenticator {
    Authenticator::with_keys(ISSUER, AUDIENCE, jwks())
}

/// Mints an HS256 token signed with `SECRET`.
pub fn token_with(kid: &str, claims: serde_json::Value) -> String {
    let mut header = Header::new(Algorithm::HS256);
    header.kid = Some(kid.to_string());
    encode(&header, &claims, &EncodingKey::from_secret(SECRET)).unwrap()
}

pub fn claims(sub: &str) -> serde_json::Value {
    json!({
        "sub": sub,
        "iss": ISSUER,
        "aud": AUDIENCE,
        "exp": get_current_timestamp() + 3600,
    })
}

pub fn valid_token() -> String {
    token_with(KID, claims("user-1"))
}

pub fn store() -> Arc<TodoStore> {
    Arc::new(TodoStore::new())
}

pub async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

pub async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

pub fn get(uri: &str) -> Request<String> {
    Request::builder().uri(uri).body(String::new()).unwrap()
}

pub fn delete(uri: &str) -> Request<String> {
    Request::builder()
        .method("DELETE")
        .uri(uri)
        .body(String::new())
        .unwrap()
}

pub fn json_request(method: &str, uri: &str, body: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(body.to_string())
        .unwrap()
}

pub fn with_bearer(mut request: Request<String>, token: &str) -> Request<String> {
    request.headers_mut().insert(
        http::header::AUTHORIZATION,
        format!("Bearer {token}").parse().unwrap(),
    );
    request
}
