// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Account registration and login.
//!
//! Inputs arrive already validated. Credential rejections are ordinary
//! outcomes, not errors; only infrastructure failures surface as `AppError`.

use crate::db::Database;
use crate::error::AppError;
use crate::models::{NewUser, User};
use crate::services::google_oidc::{GoogleIdTokenVerifier, GoogleIdentity};
use crate::services::password::PasswordHasher;
use crate::services::session::SessionTokens;
use std::sync::Arc;

/// Result of a registration or login attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthOutcome {
    /// Credentials accepted; a session token was minted.
    Authenticated { user_id: String, token: String },
    /// Registration refused because the email is taken.
    AlreadyExists,
    /// No account for the email.
    UnknownEmail,
    /// Wrong password, or the account has no local password.
    PasswordMismatch,
}

/// Registration input.
#[derive(Debug, Clone, Default)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub age: Option<u32>,
    pub gender: Option<String>,
    pub height: Option<f64>,
    pub weight: Option<f64>,
    pub password: String,
}

/// Orchestrates the credential store, hasher, Google verifier and session tokens.
#[derive(Clone)]
pub struct AccountService {
    db: Arc<dyn Database>,
    sessions: Arc<SessionTokens>,
    passwords: PasswordHasher,
    google: Arc<GoogleIdTokenVerifier>,
}

impl AccountService {
    pub fn new(
        db: Arc<dyn Database>,
        sessions: Arc<SessionTokens>,
        passwords: PasswordHasher,
        google: Arc<GoogleIdTokenVerifier>,
    ) -> Self {
        Self {
            db,
            sessions,
            passwords,
            google,
        }
    }

    /// Create a local account and sign it in.
    pub async fn register(&self, registration: Registration) -> Result<AuthOutcome, AppError> {
        if self
            .db
            .find_user_by_email(&registration.email)
            .await?
            .is_some()
        {
            tracing::info!("Registration refused: email already registered");
            return Ok(AuthOutcome::AlreadyExists);
        }

        let password_hash = self
            .passwords
            .hash(&registration.password)
            .await
            .map_err(|e| AppError::Internal(anyhow::anyhow!("password hashing failed: {e}")))?;

        let user = self
            .db
            .create_user(NewUser {
                name: registration.name,
                email: registration.email,
                age: registration.age,
                gender: registration.gender,
                height: registration.height,
                weight: registration.weight,
                password_hash: Some(password_hash),
            })
            .await?;

        tracing::info!(user_id = %user.id, "User registered");
        self.authenticated(&user)
    }

    /// Check an email/password pair.
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthOutcome, AppError> {
        let Some(user) = self.db.find_user_by_email(email).await? else {
            tracing::info!("Login rejected: unknown email");
            return Ok(AuthOutcome::UnknownEmail);
        };

        let Some(hash) = user.password_hash.as_deref() else {
            tracing::info!(user_id = %user.id, "Login rejected: account has no password");
            return Ok(AuthOutcome::PasswordMismatch);
        };

        if !self.passwords.verify(password, hash).await {
            tracing::info!(user_id = %user.id, "Login rejected: password mismatch");
            return Ok(AuthOutcome::PasswordMismatch);
        }

        tracing::info!(user_id = %user.id, "User logged in");
        self.authenticated(&user)
    }

    /// Sign in with a Google ID token, creating the account on first use.
    pub async fn login_with_google(&self, id_token: &str) -> Result<AuthOutcome, AppError> {
        let identity = self.google.verify_id_token(id_token).await.map_err(|e| {
            tracing::warn!(error = %e, "Google ID token rejected");
            AppError::Internal(e.into())
        })?;

        let user = match self.db.find_user_by_email(&identity.email).await? {
            Some(user) => user,
            None => self.create_google_user(identity).await?,
        };

        tracing::info!(user_id = %user.id, "User logged in with Google");
        self.authenticated(&user)
    }

    /// First Google sign-in for an email. A concurrent sign-in may claim the
    /// email between our lookup and insert; that account is then the one to use.
    async fn create_google_user(&self, identity: GoogleIdentity) -> Result<User, AppError> {
        let email = identity.email.clone();
        let created = self
            .db
            .create_user(NewUser {
                name: identity.name,
                email: identity.email,
                ..Default::default()
            })
            .await;

        match created {
            Ok(user) => {
                tracing::info!(user_id = %user.id, "User created from Google sign-in");
                Ok(user)
            }
            Err(AppError::Conflict(_)) => {
                tracing::info!("Google sign-in raced another account creation");
                self.db.find_user_by_email(&email).await?.ok_or_else(|| {
                    AppError::Internal(anyhow::anyhow!(
                        "email conflict but no account found on re-read"
                    ))
                })
            }
            Err(e) => Err(e),
        }
    }

    fn authenticated(&self, user: &User) -> Result<AuthOutcome, AppError> {
        let token = self
            .sessions
            .issue(&user.id)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("session token creation failed: {e}")))?;

        Ok(AuthOutcome::Authenticated {
            user_id: user.id.clone(),
            token,
        })
    }
}
