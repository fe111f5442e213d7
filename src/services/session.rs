// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Stateless session tokens (HS256 JWT).

use crate::config::Config;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// User reference embedded in a session token.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct SessionUser {
    pub id: String,
}

/// Session token claims: `{ user: { id }, iat, exp }`.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SessionClaims {
    pub user: SessionUser,
    /// Issued at (Unix timestamp)
    pub iat: usize,
    /// Expiration time (Unix timestamp)
    pub exp: usize,
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("session token rejected: {0}")]
    InvalidToken(jsonwebtoken::errors::Error),

    #[error("session token encoding failed: {0}")]
    Encoding(jsonwebtoken::errors::Error),

    #[error("session lifetime puts expiry out of range")]
    TtlOverflow,

    #[error("system clock error: {0}")]
    Clock(#[from] std::time::SystemTimeError),
}

/// Issues and verifies session tokens with the server secret.
#[derive(Clone)]
pub struct SessionTokens {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl: Duration,
}

impl SessionTokens {
    pub fn new(secret: &[u8], ttl: Duration) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            ttl,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.jwt_secret, config.session_ttl)
    }

    /// Mint a token for `user_id`.
    pub fn issue(&self, user_id: &str) -> Result<String, SessionError> {
        let now = SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs();
        let exp = now
            .checked_add(self.ttl.as_secs())
            .and_then(|exp| usize::try_from(exp).ok())
            .ok_or(SessionError::TtlOverflow)?;

        let claims = SessionClaims {
            user: SessionUser {
                id: user_id.to_string(),
            },
            iat: now as usize,
            exp,
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(SessionError::Encoding)
    }

    /// Check signature and expiry and return the claims.
    pub fn verify(&self, token: &str) -> Result<SessionClaims, SessionError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        decode::<SessionClaims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(SessionError::InvalidToken)
    }
}
