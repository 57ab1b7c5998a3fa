//! HTTP front for the todo store.
//!
//! # Overview
//! `/todo` routes map one-to-one onto `TodoStore` operations. When an
//! [`Authenticator`] is supplied those routes sit behind bearer-token
//! validation; everything else falls through to the static front-end, which
//! is never gated.

pub mod auth;
pub mod config;
pub mod error;
pub mod logging;
pub mod routes;

use std::future::Future;
use std::path::Path;
use std::sync::Arc;

use axum::{middleware, Router};
use tokio::net::TcpListener;
use todo_core::TodoStore;
use tower_http::{
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};

pub use auth::{AuthSettings, Authenticator, Claims};
pub use config::Config;
pub use error::ApiError;

/// Builds the application router around `store`.
///
/// With `static_dir` set, unmatched paths are served from it and paths that
/// name no file get its `index.html`.
pub fn app(store: Arc<TodoStore>, auth: Option<Authenticator>, static_dir: Option<&Path>) -> Router {
    let mut api = routes::todo_routes(store);
    if let Some(auth) = auth {
        api = api.route_layer(middleware::from_fn_with_state(auth, auth::require_bearer));
    }

    let router = match static_dir {
        Some(dir) => {
            let index = ServeFile::new(dir.join("index.html"));
            api.fallback_service(ServeDir::new(dir).fallback(index))
        }
        None => api,
    };

    router.layer(TraceLayer::new_for_http())
}

/// Serves `app` on `listener` until `shutdown` resolves.
pub async fn run(
    listener: TcpListener,
    app: Router,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<(), std::io::Error> {
    axum::serve(listener, app).with_graceful_shutdown(shutdown).await
}
