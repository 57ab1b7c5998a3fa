use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use todo_core::TodoStore;
use todo_server::{logging::init_logging, Authenticator, Config};
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();
    init_logging(&config.log_level, config.log_format);

    let auth = match config.auth_settings()? {
        Some(settings) => {
            tracing::info!(issuer = %settings.issuer, jwks_url = %settings.jwks_url, "bearer-token auth enabled");
            Some(Authenticator::remote(settings)?)
        }
        None => {
            tracing::warn!("AUTH_ISSUER not set, /todo is open to everyone");
            None
        }
    };

    let static_dir = if config.static_dir.is_dir() {
        Some(config.static_dir.as_path())
    } else {
        tracing::warn!(dir = %config.static_dir.display(), "static directory not found, front-end disabled");
        None
    };

    let app = todo_server::app(Arc::new(TodoStore::new()), auth, static_dir);

    let addr = config.listen_addr().await?;
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!(addr = %addr, version = env!("CARGO_PKG_VERSION"), "listening");

    todo_server::run(listener, app, shutdown_signal()).await?;
    tracing::info!("shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
}
