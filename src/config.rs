// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application configuration loaded from environment variables.
//!
//! Everything is read once at startup and never mutated afterwards.

use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Default session lifetime: 30 days.
const DEFAULT_SESSION_TTL_SECS: u64 = 30 * 24 * 60 * 60;
/// Longest accepted session lifetime: 10 years.
const MAX_SESSION_TTL_SECS: u64 = 10 * 365 * 24 * 60 * 60;
const DEFAULT_PASSWORD_MIN_LENGTH: usize = 8;
const DEFAULT_BCRYPT_COST: u32 = 10;

/// Which document store backs the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Firestore,
    Memory,
}

impl FromStr for StorageBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "firestore" => Ok(Self::Firestore),
            "memory" => Ok(Self::Memory),
            _ => Err(ConfigError::Invalid("STORAGE_BACKEND")),
        }
    }
}

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    // --- Environment Variables (non-sensitive) ---
    /// Frontend URL allowed by CORS
    pub frontend_url: String,
    /// GCP project ID
    pub gcp_project_id: String,
    /// Server port
    pub port: u16,
    /// Google OAuth client ID; the expected audience of Google ID tokens
    pub google_client_id: String,
    /// Document store selection
    pub storage_backend: StorageBackend,

    // --- Auth policy ---
    /// Lifetime of issued session tokens
    pub session_ttl: Duration,
    /// Minimum accepted password length at registration
    pub password_min_length: usize,
    /// bcrypt work factor
    pub bcrypt_cost: u32,

    // --- Secrets ---
    /// Google OAuth client secret (not needed for ID token verification)
    pub google_client_secret: Option<String>,
    /// HMAC key for session tokens (raw bytes)
    pub jwt_secret: Vec<u8>,
}

impl Config {
    /// Config for tests: memory storage and the cheapest bcrypt cost.
    pub fn test_default() -> Self {
        Self {
            frontend_url: "http://localhost:5173".to_string(),
            gcp_project_id: "test-project".to_string(),
            port: 8080,
            google_client_id: "test-client-id.apps.googleusercontent.com".to_string(),
            storage_backend: StorageBackend::Memory,
            session_ttl: Duration::from_secs(DEFAULT_SESSION_TTL_SECS),
            password_min_length: DEFAULT_PASSWORD_MIN_LENGTH,
            bcrypt_cost: 4,
            google_client_secret: None,
            jwt_secret: b"test_jwt_key_32_bytes_minimum!!".to_vec(),
        }
    }

    /// Load configuration from environment variables.
    ///
    /// A `.env` file in the working directory is honored for local development.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let jwt_secret = env::var("JWT_SECRET")
            .map(|v| v.trim().to_string())
            .map_err(|_| ConfigError::Missing("JWT_SECRET"))?;
        if jwt_secret.is_empty() {
            return Err(ConfigError::Invalid("JWT_SECRET"));
        }

        let bcrypt_cost = parse_or("BCRYPT_COST", DEFAULT_BCRYPT_COST)?;
        if !(4..=31).contains(&bcrypt_cost) {
            return Err(ConfigError::Invalid("BCRYPT_COST"));
        }

        Ok(Self {
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
            gcp_project_id: env::var("GCP_PROJECT_ID").unwrap_or_else(|_| "local-dev".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
            google_client_id: env::var("GOOGLE_CLIENT_ID")
                .map(|v| v.trim().to_string())
                .map_err(|_| ConfigError::Missing("GOOGLE_CLIENT_ID"))?,
            storage_backend: env::var("STORAGE_BACKEND")
                .map(|v| v.parse())
                .unwrap_or(Ok(StorageBackend::Firestore))?,
            session_ttl: session_ttl(parse_or("SESSION_TTL_SECS", DEFAULT_SESSION_TTL_SECS)?)?,
            password_min_length: parse_or("PASSWORD_MIN_LENGTH", DEFAULT_PASSWORD_MIN_LENGTH)?,
            bcrypt_cost,
            google_client_secret: env::var("GOOGLE_CLIENT_SECRET")
                .ok()
                .map(|v| v.trim().to_string()),
            jwt_secret: jwt_secret.into_bytes(),
        })
    }
}

fn session_ttl(secs: u64) -> Result<Duration, ConfigError> {
    if secs == 0 || secs > MAX_SESSION_TTL_SECS {
        return Err(ConfigError::Invalid("SESSION_TTL_SECS"));
    }
    Ok(Duration::from_secs(secs))
}

/// Parse an optional numeric variable, rejecting values that are present but malformed.
fn parse_or<T: FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid(name)),
        Err(_) => Ok(default),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for environment variable: {0}")]
    Invalid(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_from_env() {
        // Set required env vars for test
        env::set_var("JWT_SECRET", "test_jwt_key_32_bytes_minimum!!");
        env::set_var("GOOGLE_CLIENT_ID", "abc.apps.googleusercontent.com");
        env::set_var("STORAGE_BACKEND", "memory");

        let config = Config::from_env().expect("Config should load");

        assert_eq!(config.google_client_id, "abc.apps.googleusercontent.com");
        assert_eq!(config.storage_backend, StorageBackend::Memory);
        assert_eq!(config.jwt_secret, b"test_jwt_key_32_bytes_minimum!!");
        assert_eq!(config.port, 8080);
        assert_eq!(config.password_min_length, 8);
        assert_eq!(config.session_ttl, Duration::from_secs(2_592_000));
    }

    #[test]
    fn test_session_ttl_bounds() {
        assert_eq!(session_ttl(3600).unwrap(), Duration::from_secs(3600));
        assert!(session_ttl(MAX_SESSION_TTL_SECS).is_ok());
        assert!(matches!(
            session_ttl(MAX_SESSION_TTL_SECS + 1),
            Err(ConfigError::Invalid("SESSION_TTL_SECS"))
        ));
        assert!(session_ttl(u64::MAX).is_err());
        assert!(session_ttl(0).is_err());
    }

    #[test]
    fn test_storage_backend_parse() {
        assert_eq!(
            "Firestore".parse::<StorageBackend>().unwrap(),
            StorageBackend::Firestore
        );
        assert_eq!(
            " memory ".parse::<StorageBackend>().unwrap(),
            StorageBackend::Memory
        );
        assert!("mongo".parse::<StorageBackend>().is_err());
    }
}
