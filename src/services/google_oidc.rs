// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Google ID token verification for "Sign in with Google".
//!
//! The frontend obtains an ID token from Google and posts it to
//! `/login-google`. We check the RS256 signature against Google's published
//! keys, then the issuer, audience and timing claims, and only then trust the
//! email it carries.

use crate::config::Config;
use anyhow::Context;
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use reqwest::header::{HeaderMap, CACHE_CONTROL};
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};
use tokio::sync::{Mutex, RwLock};

const GOOGLE_CERTS_URL: &str = "https://www.googleapis.com/oauth2/v3/certs";
const GOOGLE_ISSUERS: [&str; 2] = ["https://accounts.google.com", "accounts.google.com"];
const FETCH_TIMEOUT: Duration = Duration::from_secs(5);
/// Used when Google's response has no usable `max-age`.
const FALLBACK_KEY_TTL: Duration = Duration::from_secs(300);
const ALLOWED_SKEW_SECS: u64 = 60;

/// Identity asserted by a verified Google ID token.
#[derive(Debug, Clone)]
pub struct GoogleIdentity {
    pub email: String,
    pub name: String,
    pub subject: String,
}

/// Google ID token verification errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum IdentityError {
    /// The token is malformed, unsigned by Google, or its claims do not match.
    #[error("invalid Google ID token: {0}")]
    InvalidToken(String),
    /// Google's signing keys could not be fetched.
    #[error("Google key retrieval failed: {0}")]
    Transient(String),
}

/// Verifier for Google ID tokens addressed to this application.
pub struct GoogleIdTokenVerifier {
    client_id: String,
    keys: KeySource,
}

enum KeySource {
    /// One fixed key, for tests and local runs without network access.
    Fixed { kid: String, key: Arc<DecodingKey> },
    Published(PublishedKeys),
}

impl GoogleIdTokenVerifier {
    /// Verifier that fetches and caches Google's signing keys.
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let verifier = Self {
            client_id: client_id(config)?,
            keys: KeySource::Published(PublishedKeys::new(GOOGLE_CERTS_URL)?),
        };

        tracing::info!(client_id = %verifier.client_id, "Google sign-in enabled");
        Ok(verifier)
    }

    /// Verifier that trusts exactly one RSA public key under `kid`.
    pub fn new_with_static_key(
        config: &Config,
        kid: impl Into<String>,
        key: DecodingKey,
    ) -> anyhow::Result<Self> {
        let kid = kid.into();
        anyhow::ensure!(!kid.trim().is_empty(), "static key id must not be empty");

        Ok(Self {
            client_id: client_id(config)?,
            keys: KeySource::Fixed {
                kid,
                key: Arc::new(key),
            },
        })
    }

    /// Verify a raw Google ID token and return the identity it asserts.
    pub async fn verify_id_token(&self, token: &str) -> Result<GoogleIdentity, IdentityError> {
        let token = token.trim();
        if token.is_empty() {
            return Err(invalid("token is empty"));
        }

        let header =
            decode_header(token).map_err(|e| invalid(format!("unreadable JWT header: {e}")))?;
        if header.alg != Algorithm::RS256 {
            return Err(invalid(format!("unexpected JWT alg: {:?}", header.alg)));
        }
        let kid = header.kid.ok_or_else(|| invalid("JWT has no kid"))?;

        let key = self.signing_key(&kid).await?;
        let claims = decode::<GoogleClaims>(token, &key, &self.validation())
            .map_err(|e| invalid(format!("JWT rejected: {e}")))?
            .claims;

        tracing::debug!(
            subject = %claims.sub,
            issuer = %claims.iss,
            email_verified = ?claims.email_verified,
            "Google ID token signature and audience accepted"
        );

        claims.into_identity()
    }

    async fn signing_key(&self, kid: &str) -> Result<Arc<DecodingKey>, IdentityError> {
        match &self.keys {
            KeySource::Fixed { kid: fixed, key } if fixed == kid => Ok(key.clone()),
            KeySource::Fixed { .. } => Err(invalid(format!("unknown kid {kid}"))),
            KeySource::Published(published) => published.key(kid).await,
        }
    }

    fn validation(&self) -> Validation {
        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_required_spec_claims(&["exp", "iss", "aud", "sub"]);
        validation.set_issuer(&GOOGLE_ISSUERS);
        validation.set_audience(&[self.client_id.as_str()]);
        validation.validate_nbf = true;
        validation.leeway = ALLOWED_SKEW_SECS;
        validation
    }
}

fn client_id(config: &Config) -> anyhow::Result<String> {
    let id = config.google_client_id.trim();
    anyhow::ensure!(!id.is_empty(), "Google client id must not be empty");
    Ok(id.to_string())
}

fn invalid(reason: impl Into<String>) -> IdentityError {
    IdentityError::InvalidToken(reason.into())
}

// ─── Published keys ──────────────────────────────────────────

/// Google's signing keys, refetched once their `max-age` runs out or when a
/// token names a kid we have not seen.
struct PublishedKeys {
    http: reqwest::Client,
    url: String,
    current: RwLock<KeySet>,
    fetching: Mutex<()>,
}

#[derive(Default)]
struct KeySet {
    by_kid: HashMap<String, Arc<DecodingKey>>,
    fresh_until: Option<Instant>,
}

impl KeySet {
    fn get(&self, kid: &str) -> Option<Arc<DecodingKey>> {
        let fresh = self.fresh_until.is_some_and(|t| t > Instant::now());
        if fresh {
            self.by_kid.get(kid).cloned()
        } else {
            None
        }
    }
}

impl PublishedKeys {
    fn new(url: &str) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(FETCH_TIMEOUT)
            .build()
            .context("building HTTP client for Google keys")?;

        Ok(Self {
            http,
            url: url.to_string(),
            current: RwLock::new(KeySet::default()),
            fetching: Mutex::new(()),
        })
    }

    async fn key(&self, kid: &str) -> Result<Arc<DecodingKey>, IdentityError> {
        if let Some(key) = self.current.read().await.get(kid) {
            return Ok(key);
        }

        let _fetching = self.fetching.lock().await;
        // A concurrent caller may have refreshed while we waited.
        if let Some(key) = self.current.read().await.get(kid) {
            return Ok(key);
        }

        let fetched = self.fetch().await?;
        let key = fetched.by_kid.get(kid).cloned();
        *self.current.write().await = fetched;

        key.ok_or_else(|| invalid(format!("no Google signing key with kid {kid}")))
    }

    async fn fetch(&self) -> Result<KeySet, IdentityError> {
        tracing::debug!(url = %self.url, "Fetching Google signing keys");

        let response = self
            .http
            .get(&self.url)
            .send()
            .await
            .map_err(|e| IdentityError::Transient(format!("key request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(IdentityError::Transient(format!(
                "key request returned status {}",
                response.status()
            )));
        }

        let ttl = key_ttl(response.headers());
        let jwks: Jwks = response
            .json()
            .await
            .map_err(|e| IdentityError::Transient(format!("unreadable key set: {e}")))?;

        let by_kid = signing_keys(jwks);
        if by_kid.is_empty() {
            return Err(IdentityError::Transient(
                "key set has no RS256 signing keys".to_string(),
            ));
        }

        tracing::debug!(
            keys = by_kid.len(),
            ttl_secs = ttl.as_secs(),
            "Google signing keys refreshed"
        );

        Ok(KeySet {
            by_kid,
            fresh_until: Some(Instant::now() + ttl),
        })
    }
}

#[derive(Debug, Deserialize)]
struct Jwks {
    keys: Vec<Jwk>,
}

#[derive(Debug, Deserialize)]
struct Jwk {
    kid: String,
    kty: String,
    alg: Option<String>,
    #[serde(rename = "use")]
    key_use: Option<String>,
    n: String,
    e: String,
}

/// RS256 signing keys of a JWKS document, keyed by `kid`.
fn signing_keys(jwks: Jwks) -> HashMap<String, Arc<DecodingKey>> {
    jwks.keys
        .into_iter()
        .filter(|jwk| jwk.kty == "RSA" && !jwk.kid.trim().is_empty())
        .filter(|jwk| jwk.alg.as_deref().map_or(true, |alg| alg == "RS256"))
        .filter(|jwk| jwk.key_use.as_deref().map_or(true, |u| u == "sig"))
        .filter_map(|jwk| match DecodingKey::from_rsa_components(&jwk.n, &jwk.e) {
            Ok(key) => Some((jwk.kid, Arc::new(key))),
            Err(e) => {
                tracing::warn!(error = %e, kid = %jwk.kid, "Ignoring malformed Google key");
                None
            }
        })
        .collect()
}

fn key_ttl(headers: &HeaderMap) -> Duration {
    headers
        .get(CACHE_CONTROL)
        .and_then(|v| v.to_str().ok())
        .and_then(max_age_secs)
        .map(Duration::from_secs)
        .unwrap_or(FALLBACK_KEY_TTL)
}

/// `max-age` of a Cache-Control header value, if present.
fn max_age_secs(cache_control: &str) -> Option<u64> {
    cache_control
        .split(',')
        .filter_map(|directive| directive.trim().strip_prefix("max-age="))
        .find_map(|raw| raw.trim_matches('"').parse().ok())
}

// ─── Claims ──────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct GoogleClaims {
    iss: String,
    sub: String,
    iat: Option<u64>,
    email: Option<String>,
    email_verified: Option<bool>,
    name: Option<String>,
}

impl GoogleClaims {
    /// Checks `jsonwebtoken` does not cover, then the identity.
    fn into_identity(self) -> Result<GoogleIdentity, IdentityError> {
        let iat = self.iat.ok_or_else(|| invalid("missing iat claim"))?;
        if iat > unix_now() + ALLOWED_SKEW_SECS {
            return Err(invalid("iat claim is in the future"));
        }

        let email = self
            .email
            .filter(|e| !e.trim().is_empty())
            .ok_or_else(|| invalid("missing email claim"))?;

        if self.email_verified == Some(false) {
            return Err(invalid("email is not verified by Google"));
        }

        let name = self
            .name
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| name_from_email(&email));

        Ok(GoogleIdentity {
            email,
            name,
            subject: self.sub,
        })
    }
}

fn name_from_email(email: &str) -> String {
    email.split('@').next().unwrap_or(email).to_string()
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
