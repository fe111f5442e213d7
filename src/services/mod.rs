// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod accounts;
pub mod google_oidc;
pub mod password;
pub mod session;

pub use accounts::{AccountService, AuthOutcome, Registration};
pub use google_oidc::{GoogleIdTokenVerifier, GoogleIdentity, IdentityError};
pub use password::{PasswordError, PasswordHasher};
pub use session::{SessionClaims, SessionError, SessionTokens};
