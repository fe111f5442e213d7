// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Fitness Hub: blog, diet and contact API with user accounts
//!
//! This crate provides the backend API: email/password and Google sign-in
//! issuing stateless session tokens, plus the content routes.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;
pub mod validation;

use config::Config;
use db::Database;
use services::{AccountService, GoogleIdTokenVerifier, PasswordHasher, SessionTokens};
use std::sync::Arc;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: Arc<dyn Database>,
    pub sessions: Arc<SessionTokens>,
    pub accounts: AccountService,
}

impl AppState {
    /// Wire the services together from configuration and a store.
    pub fn new(
        config: Config,
        db: Arc<dyn Database>,
        google_verifier: Arc<GoogleIdTokenVerifier>,
    ) -> Self {
        let sessions = Arc::new(SessionTokens::from_config(&config));
        let accounts = AccountService::new(
            db.clone(),
            sessions.clone(),
            PasswordHasher::new(config.bcrypt_cost),
            google_verifier,
        );

        Self {
            config,
            db,
            sessions,
            accounts,
        }
    }
}
