// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Salted password hashing (bcrypt).
//!
//! Hashing is deliberately slow, so both operations run on the blocking
//! thread pool instead of the request task.

/// bcrypt only looks at the first 72 bytes of input.
pub const MAX_PASSWORD_BYTES: usize = 72;

/// Password hashing errors.
#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    #[error("password must not be empty")]
    Empty,

    #[error("password exceeds {MAX_PASSWORD_BYTES} bytes")]
    TooLong,

    #[error("bcrypt failure: {0}")]
    Bcrypt(#[from] bcrypt::BcryptError),

    #[error("hashing task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// bcrypt hasher with a fixed work factor.
#[derive(Debug, Clone, Copy)]
pub struct PasswordHasher {
    cost: u32,
}

impl PasswordHasher {
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }

    /// Hash `plaintext` with a fresh random salt.
    pub async fn hash(&self, plaintext: &str) -> Result<String, PasswordError> {
        if plaintext.is_empty() {
            return Err(PasswordError::Empty);
        }
        if plaintext.len() > MAX_PASSWORD_BYTES {
            return Err(PasswordError::TooLong);
        }

        let cost = self.cost;
        let plaintext = plaintext.to_owned();
        let hash = tokio::task::spawn_blocking(move || bcrypt::hash(plaintext, cost)).await??;
        Ok(hash)
    }

    /// Check `plaintext` against a stored hash.
    ///
    /// Returns `false` for any mismatch, including a malformed stored hash.
    pub async fn verify(&self, plaintext: &str, hash: &str) -> bool {
        if plaintext.is_empty() || plaintext.len() > MAX_PASSWORD_BYTES {
            return false;
        }

        let plaintext = plaintext.to_owned();
        let hash = hash.to_owned();
        match tokio::task::spawn_blocking(move || bcrypt::verify(plaintext, &hash)).await {
            Ok(Ok(matched)) => matched,
            Ok(Err(e)) => {
                tracing::warn!(error = %e, "Stored password hash could not be parsed");
                false
            }
            Err(e) => {
                tracing::error!(error = %e, "Password verification task failed");
                false
            }
        }
    }
}
