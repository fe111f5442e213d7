// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Account routes: registration, logins and profile.
//!
//! Rejected credentials are answered with `200 {success: false}` rather than
//! a 4xx; existing clients key off the `success` flag.

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::UserProfile;
use crate::services::password::MAX_PASSWORD_BYTES;
use crate::services::{AuthOutcome, Registration};
use crate::validation::{self, FieldError, JsonBody};
use crate::AppState;
use axum::{
    extract::State,
    routing::{get, post},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use validator::Validate;

/// Public account routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/login-google", post(login_google))
}

/// Routes that need a session token. The auth layer is applied in routes/mod.rs.
pub fn protected_routes() -> Router<Arc<AppState>> {
    Router::new().route("/profile", get(profile))
}

// ─── Responses ───────────────────────────────────────────────

/// Outcome of a registration or login call.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct AuthResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth_token: Option<String>,
}

impl AuthResponse {
    fn rejected(message: &str) -> Self {
        Self {
            success: false,
            message: message.to_string(),
            auth_token: None,
        }
    }

    fn from_outcome(outcome: AuthOutcome, success_message: &str) -> Self {
        match outcome {
            AuthOutcome::Authenticated { token, .. } => Self {
                success: true,
                message: success_message.to_string(),
                auth_token: Some(token),
            },
            AuthOutcome::AlreadyExists => Self::rejected("User already exists"),
            AuthOutcome::UnknownEmail => Self::rejected("Enter a valid Email"),
            AuthOutcome::PasswordMismatch => Self::rejected("password not match"),
        }
    }
}

#[derive(Debug, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ProfileResponse {
    pub success: bool,
    pub user: UserProfile,
}

// ─── Register ────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default)]
pub struct RegisterRequest {
    #[validate(length(min = 3, message = "Name must be at least 3 characters"))]
    pub name: String,
    #[validate(email(message = "Enter a Valid Email"))]
    pub email: String,
    #[serde(deserialize_with = "validation::lenient_number")]
    pub age: Option<u32>,
    pub gender: Option<String>,
    #[serde(deserialize_with = "validation::lenient_number")]
    pub height: Option<f64>,
    #[serde(deserialize_with = "validation::lenient_number")]
    pub weight: Option<f64>,
    pub password: String,
}

impl RegisterRequest {
    /// Rules apply to what gets stored, so surrounding whitespace goes first.
    fn trimmed(mut self) -> Self {
        self.name = self.name.trim().to_string();
        self.email = self.email.trim().to_string();
        self
    }
}

impl From<RegisterRequest> for Registration {
    fn from(req: RegisterRequest) -> Self {
        Self {
            name: req.name,
            email: req.email,
            age: req.age,
            gender: req.gender,
            height: req.height,
            weight: req.weight,
            password: req.password,
        }
    }
}

/// Password rules that depend on configuration.
fn password_failures(password: &str, min_length: usize) -> Vec<FieldError> {
    let mut errors = Vec::new();
    if password.chars().count() < min_length {
        errors.push(FieldError::new(
            "password",
            format!("Password Length Must be {min_length} Characters"),
        ));
    }
    if password.len() > MAX_PASSWORD_BYTES {
        errors.push(FieldError::new(
            "password",
            format!("Password must be at most {MAX_PASSWORD_BYTES} bytes"),
        ));
    }
    errors
}

async fn register(
    State(state): State<Arc<AppState>>,
    JsonBody(req): JsonBody<RegisterRequest>,
) -> Result<Json<AuthResponse>> {
    let req = req.trimmed();
    let mut errors = validation::failures(&req);
    errors.extend(password_failures(
        &req.password,
        state.config.password_min_length,
    ));
    validation::into_result(errors)?;

    match state.accounts.register(req.into()).await {
        Ok(outcome) => Ok(Json(AuthResponse::from_outcome(
            outcome,
            "Register Successfully",
        ))),
        Err(e) => {
            // Includes the duplicate-email race lost to a concurrent registration.
            tracing::error!(error = %e, "Registration failed");
            Ok(Json(AuthResponse::rejected("Please Enter Valid Details")))
        }
    }
}

// ─── Login ───────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default)]
pub struct LoginRequest {
    #[validate(email(message = "Enter a Valid Email"))]
    pub email: String,
    #[validate(required(message = "Password cannot be blank"))]
    pub password: Option<String>,
}

async fn login(
    State(state): State<Arc<AppState>>,
    JsonBody(req): JsonBody<LoginRequest>,
) -> Result<Json<AuthResponse>> {
    let req = validation::validated(LoginRequest {
        email: req.email.trim().to_string(),
        ..req
    })?;
    let password = req.password.as_deref().unwrap_or_default();

    let outcome = state.accounts.login(&req.email, password).await?;
    Ok(Json(AuthResponse::from_outcome(outcome, "Login Successfull")))
}

// ─── Google Login ────────────────────────────────────────────

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default)]
pub struct GoogleLoginRequest {
    /// Google ID token (JWT) obtained by the frontend.
    #[validate(length(min = 1, message = "Token is required"))]
    pub token: String,
}

async fn login_google(
    State(state): State<Arc<AppState>>,
    JsonBody(req): JsonBody<GoogleLoginRequest>,
) -> Result<Json<AuthResponse>> {
    let req = validation::validated(req)?;

    let outcome = state.accounts.login_with_google(&req.token).await?;
    Ok(Json(AuthResponse::from_outcome(
        outcome,
        "Login with Google Successful",
    )))
}

// ─── Profile ─────────────────────────────────────────────────

/// Get the signed-in user's profile.
async fn profile(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<ProfileResponse>> {
    let found = state
        .db
        .find_user_by_id(&user.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    Ok(Json(ProfileResponse {
        success: true,
        user: found.into(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_rules() {
        assert!(password_failures("pw123456", 8).is_empty());
        assert_eq!(
            password_failures("short", 8),
            vec![FieldError::new(
                "password",
                "Password Length Must be 8 Characters"
            )]
        );
        assert_eq!(password_failures(&"x".repeat(73), 8).len(), 1);
    }

    #[test]
    fn outcome_messages() {
        let ok = AuthResponse::from_outcome(
            AuthOutcome::Authenticated {
                user_id: "u1".to_string(),
                token: "t".to_string(),
            },
            "Login Successfull",
        );
        assert!(ok.success);
        assert_eq!(ok.auth_token.as_deref(), Some("t"));

        let mismatch = AuthResponse::from_outcome(AuthOutcome::PasswordMismatch, "unused");
        assert!(!mismatch.success);
        assert_eq!(mismatch.message, "password not match");
        assert!(mismatch.auth_token.is_none());
    }
}
