//! Server configuration.
//!
//! Every option is a command-line flag that can also be set through the
//! environment.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use thiserror::Error;

use crate::auth::{AuthSettings, DEFAULT_FETCH_TIMEOUT};

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Human-readable, for development.
    Pretty,
    /// One JSON object per line, for log aggregation.
    Json,
}

/// In-memory todo list over HTTP.
#[derive(Parser, Debug, Clone)]
#[command(name = "todo-server", version)]
pub struct Config {
    /// Interface to bind; a hostname or an IP literal.
    #[arg(long, env = "HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Port to bind.
    #[arg(long, env = "PORT", default_value_t = 3000)]
    pub port: u16,

    /// Directory holding the front-end; unmatched paths are served from it.
    #[arg(long, env = "STATIC_DIR", default_value = "web")]
    pub static_dir: PathBuf,

    /// Token issuer. Setting it turns on bearer-token auth for `/todo`.
    #[arg(long, env = "AUTH_ISSUER")]
    pub auth_issuer: Option<String>,

    /// Audience tokens must be issued for.
    #[arg(long, env = "AUTH_AUDIENCE")]
    pub auth_audience: Option<String>,

    /// Key set location. Defaults to `<issuer>/.well-known/jwks.json`.
    #[arg(long, env = "AUTH_JWKS_URL")]
    pub auth_jwks_url: Option<String>,

    /// Seconds to wait for the key set before rejecting the request.
    #[arg(long, env = "AUTH_FETCH_TIMEOUT", default_value_t = DEFAULT_FETCH_TIMEOUT.as_secs())]
    pub auth_fetch_timeout: u64,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Pretty)]
    pub log_format: LogFormat,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("AUTH_ISSUER is set but AUTH_AUDIENCE is not")]
    MissingAudience,

    #[error("AUTH_AUDIENCE or AUTH_JWKS_URL is set but AUTH_ISSUER is not")]
    MissingIssuer,

    #[error("cannot resolve listen address {addr}: {reason}")]
    UnresolvedAddr { addr: String, reason: String },
}

impl Config {
    /// Resolves `host:port`, taking the first address the resolver returns.
    pub async fn listen_addr(&self) -> Result<SocketAddr, ConfigError> {
        let unresolved = |reason: String| ConfigError::UnresolvedAddr {
            addr: format!("{}:{}", self.host, self.port),
            reason,
        };
        tokio::net::lookup_host((self.host.as_str(), self.port))
            .await
            .map_err(|e| unresolved(e.to_string()))?
            .next()
            .ok_or_else(|| unresolved("no addresses".to_string()))
    }

    /// Auth settings, or `None` when auth is off.
    pub fn auth_settings(&self) -> Result<Option<AuthSettings>, ConfigError> {
        match (&self.auth_issuer, &self.auth_audience) {
            (None, None) if self.auth_jwks_url.is_none() => Ok(None),
            (None, _) => Err(ConfigError::MissingIssuer),
            (Some(_), None) => Err(ConfigError::MissingAudience),
            (Some(issuer), Some(audience)) => {
                let jwks_url = self.auth_jwks_url.clone().unwrap_or_else(|| {
                    format!("{}/.well-known/jwks.json", issuer.trim_end_matches('/'))
                });
                Ok(Some(AuthSettings {
                    issuer: issuer.clone(),
                    audience: audience.clone(),
                    jwks_url,
                    fetch_timeout: Duration::from_secs(self.auth_fetch_timeout),
                }))
            }
        }
    }
}
