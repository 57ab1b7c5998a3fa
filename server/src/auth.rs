//! Bearer-token authentication against a JSON Web Key Set.
//!
//! `require_bearer` pulls the token out of the `Authorization` header and
//! hands it to an [`Authenticator`], which picks the signing key by `kid`,
//! checks the signature, expiry, issuer and audience, and yields the token's
//! [`Claims`]. Keys come either from a fixed set or from the identity
//! provider's JWKS endpoint; remote sets are fetched on first use and
//! refetched when a token names a key the cache does not know.

use std::convert::Infallible;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{
    decode, decode_header,
    jwk::{AlgorithmParameters, EllipticCurve, Jwk, JwkSet, KeyAlgorithm},
    Algorithm, DecodingKey, Validation,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::{Mutex, RwLock};

use crate::error::ApiError;

/// Minimum time between two fetches of a remote key set.
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(30);

/// Upper bound on a single key-set fetch.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Claims extracted from a verified token and stored in request extensions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    #[serde(default)]
    pub scope: Option<String>,
}

/// Extractor for the subject of the verified token. Empty when the route
/// is not behind [`require_bearer`].
#[derive(Debug, Clone, Default)]
pub struct Subject(pub Option<String>);

impl Subject {
    pub fn as_str(&self) -> &str {
        self.0.as_deref().unwrap_or("-")
    }
}

impl<S: Send + Sync> FromRequestParts<S> for Subject {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Subject(parts.extensions.get::<Claims>().map(|c| c.sub.clone())))
    }
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("missing bearer token")]
    MissingToken,

    #[error("authorization header must use the Bearer scheme")]
    InvalidScheme,

    #[error("no signing key matches kid {0}")]
    UnknownKey(String),

    #[error("token algorithm {0:?} is not accepted for this key")]
    UnsupportedAlgorithm(Algorithm),

    #[error("failed to fetch signing keys: {0}")]
    KeyFetch(#[from] reqwest::Error),

    #[error("invalid token: {0}")]
    InvalidToken(#[from] jsonwebtoken::errors::Error),
}

/// Where the issuer's tokens are validated against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthSettings {
    pub issuer: String,
    pub audience: String,
    pub jwks_url: String,
    pub fetch_timeout: Duration,
}

enum KeySource {
    Fixed,
    Remote { url: String, http: reqwest::Client },
}

struct Inner {
    issuer: String,
    audience: String,
    source: KeySource,
    keys: RwLock<Option<JwkSet>>,
    last_refresh: Mutex<Option<Instant>>,
    refresh_interval: Duration,
}

/// Verifies bearer tokens. Cheap to clone; clones share the key cache.
#[derive(Clone)]
pub struct Authenticator {
    inner: Arc<Inner>,
}

impl Authenticator {
    /// Validates against keys fetched from `settings.jwks_url`.
    pub fn remote(settings: AuthSettings) -> Result<Self, AuthError> {
        let http = reqwest::Client::builder()
            .timeout(settings.fetch_timeout)
            .build()?;
        let source = KeySource::Remote {
            url: settings.jwks_url,
            http,
        };
        Ok(Self::build(settings.issuer, settings.audience, source, None))
    }

    /// Validates against a fixed key set that is never refreshed.
    pub fn with_keys(issuer: impl Into<String>, audience: impl Into<String>, keys: JwkSet) -> Self {
        Self::build(issuer.into(), audience.into(), KeySource::Fixed, Some(keys))
    }

    /// Overrides [`DEFAULT_REFRESH_INTERVAL`]. Only meaningful before the
    /// authenticator is cloned.
    pub fn with_refresh_interval(mut self, interval: Duration) -> Self {
        if let Some(inner) = Arc::get_mut(&mut self.inner) {
            inner.refresh_interval = interval;
        }
        self
    }

    fn build(issuer: String, audience: String, source: KeySource, keys: Option<JwkSet>) -> Self {
        Self {
            inner: Arc::new(Inner {
                issuer,
                audience,
                source,
                keys: RwLock::new(keys),
                last_refresh: Mutex::new(None),
                refresh_interval: DEFAULT_REFRESH_INTERVAL,
            }),
        }
    }

    /// Verifies `token` and returns its claims.
    pub async fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        let header = decode_header(token)?;
        let jwk = self.key_for(header.kid.as_deref()).await?;

        let algorithm = match expected_algorithm(&jwk) {
            Some(algorithm) if algorithm == header.alg => algorithm,
            _ => return Err(AuthError::UnsupportedAlgorithm(header.alg)),
        };
        let key = DecodingKey::from_jwk(&jwk)?;

        let mut validation = Validation::new(algorithm);
        validation.set_issuer(&[&self.inner.issuer]);
        validation.set_audience(&[&self.inner.audience]);
        validation.set_required_spec_claims(&["exp", "iss", "aud"]);

        let data = decode::<Claims>(token, &key, &validation)?;
        Ok(data.claims)
    }

    async fn key_for(&self, kid: Option<&str>) -> Result<Jwk, AuthError> {
        if let Some(jwk) = self.cached_key(kid).await {
            return Ok(jwk);
        }
        self.refresh().await?;
        self.cached_key(kid)
            .await
            .ok_or_else(|| AuthError::UnknownKey(kid.unwrap_or("<none>").to_string()))
    }

    async fn cached_key(&self, kid: Option<&str>) -> Option<Jwk> {
        let keys = self.inner.keys.read().await;
        select_key(keys.as_ref()?, kid).cloned()
    }

    /// Refetches a remote key set. Concurrent callers queue on the mutex, and
    /// whoever arrives within the refresh interval of the last fetch reuses
    /// its result.
    async fn refresh(&self) -> Result<(), AuthError> {
        let KeySource::Remote { url, http } = &self.inner.source else {
            return Ok(());
        };

        let mut last_refresh = self.inner.last_refresh.lock().await;
        if let Some(at) = *last_refresh {
            if at.elapsed() < self.inner.refresh_interval {
                return Ok(());
            }
        }
        *last_refresh = Some(Instant::now());

        tracing::debug!(url = %url, "fetching signing keys");
        let keys: JwkSet = http.get(url).send().await?.error_for_status()?.json().await?;
        tracing::info!(keys = keys.keys.len(), "signing keys refreshed");
        *self.inner.keys.write().await = Some(keys);
        Ok(())
    }
}

fn select_key<'a>(keys: &'a JwkSet, kid: Option<&str>) -> Option<&'a Jwk> {
    match kid {
        Some(kid) => keys.find(kid),
        None if keys.keys.len() == 1 => keys.keys.first(),
        None => None,
    }
}

/// Signing algorithm a key may be used with. Keys without an `alg` member
/// get the usual algorithm for their key type; symmetric keys must declare
/// one.
fn expected_algorithm(jwk: &Jwk) -> Option<Algorithm> {
    match &jwk.common.key_algorithm {
        None => default_algorithm(&jwk.algorithm),
        Some(KeyAlgorithm::HS256) => Some(Algorithm::HS256),
        Some(KeyAlgorithm::HS384) => Some(Algorithm::HS384),
        Some(KeyAlgorithm::HS512) => Some(Algorithm::HS512),
        Some(KeyAlgorithm::ES256) => Some(Algorithm::ES256),
        Some(KeyAlgorithm::ES384) => Some(Algorithm::ES384),
        Some(KeyAlgorithm::RS256) => Some(Algorithm::RS256),
        Some(KeyAlgorithm::RS384) => Some(Algorithm::RS384),
        Some(KeyAlgorithm::RS512) => Some(Algorithm::RS512),
        Some(KeyAlgorithm::PS256) => Some(Algorithm::PS256),
        Some(KeyAlgorithm::PS384) => Some(Algorithm::PS384),
        Some(KeyAlgorithm::PS512) => Some(Algorithm::PS512),
        Some(KeyAlgorithm::EdDSA) => Some(Algorithm::EdDSA),
        Some(_) => None,
    }
}

fn default_algorithm(params: &AlgorithmParameters) -> Option<Algorithm> {
    match params {
        AlgorithmParameters::RSA(_) => Some(Algorithm::RS256),
        AlgorithmParameters::EllipticCurve(ec) => match ec.curve {
            EllipticCurve::P256 => Some(Algorithm::ES256),
            EllipticCurve::P384 => Some(Algorithm::ES384),
            _ => None,
        },
        AlgorithmParameters::OctetKeyPair(_) => Some(Algorithm::EdDSA),
        AlgorithmParameters::OctetKey(_) => None,
    }
}

/// Extracts the token from `Authorization: Bearer <token>`.
fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let value = headers.get(AUTHORIZATION).ok_or(AuthError::MissingToken)?;
    let value = value.to_str().map_err(|_| AuthError::InvalidScheme)?;
    let (scheme, token) = value.split_once(' ').ok_or(AuthError::InvalidScheme)?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(AuthError::InvalidScheme);
    }
    match token.trim() {
        "" => Err(AuthError::MissingToken),
        token => Ok(token),
    }
}

/// Rejects requests without a valid bearer token. On success the verified
/// [`Claims`] are inserted into the request extensions.
pub async fn require_bearer(
    State(auth): State<Authenticator>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = bearer_token(request.headers()).map(str::to_owned);
    let verified = match token {
        Ok(token) => auth.verify(&token).await,
        Err(e) => Err(e),
    };
    let claims = verified.map_err(|e| {
        tracing::warn!(error = %e, method = %request.method(), uri = %request.uri(), "rejected request");
        e
    })?;

    tracing::debug!(sub = %claims.sub, "authenticated request");
    request.extensions_mut().insert(claims);
    Ok(next.run(request).await)
}
