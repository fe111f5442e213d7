// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Sign-in with Google ID tokens through the HTTP API.

use async_trait::async_trait;
use axum::http::StatusCode;
use fitness_hub::config::Config;
use fitness_hub::db::{Database, MemoryDb};
use fitness_hub::error::AppError;
use fitness_hub::models::{
    Blog, BlogUpdate, Contact, Diet, NewBlog, NewContact, NewDiet, NewUser, User,
};
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

mod common;
use common::{
    create_test_app, create_test_app_with_db, google_claims, now_secs, post_json, register_ann, request, sign_google_token,
    sign_rs256, sign_with_rogue_key,
};

const GOOGLE_LOGIN: &str = "/api/v1/users/login-google";

#[tokio::test]
async fn test_first_google_login_creates_user() {
    let (app, state, db) = create_test_app();
    let token = sign_google_token(&google_claims(&state.config, "gina@x.com", "Gina"));

    let (status, body) = post_json(&app, GOOGLE_LOGIN, json!({ "token": token })).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Login with Google Successful");
    assert_eq!(db.user_count().await, 1);

    let session = body["authToken"].as_str().unwrap();
    let (status, profile) = request(&app, "GET", "/api/v1/users/profile", Some(session)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(profile["user"]["email"], "gina@x.com");
    assert_eq!(profile["user"]["name"], "Gina");
}

#[tokio::test]
async fn test_repeat_google_login_reuses_account() {
    let (app, state, db) = create_test_app();
    let claims = google_claims(&state.config, "gina@x.com", "Gina");

    let (_, first) = post_json(&app, GOOGLE_LOGIN, json!({ "token": sign_google_token(&claims) })).await;
    let (_, second) =
        post_json(&app, GOOGLE_LOGIN, json!({ "token": sign_google_token(&claims) })).await;

    let first_id = state
        .sessions
        .verify(first["authToken"].as_str().unwrap())
        .unwrap()
        .user
        .id;
    let second_id = state
        .sessions
        .verify(second["authToken"].as_str().unwrap())
        .unwrap()
        .user
        .id;

    assert_eq!(first_id, second_id);
    assert_eq!(db.user_count().await, 1);
}

#[tokio::test]
async fn test_google_login_links_to_existing_local_account() {
    let (app, state, db) = create_test_app();
    let local_token = register_ann(&app).await;
    let local_id = state.sessions.verify(&local_token).unwrap().user.id;

    let token = sign_google_token(&google_claims(&state.config, "ann@x.com", "Ann G"));
    let (status, body) = post_json(&app, GOOGLE_LOGIN, json!({ "token": token })).await;

    assert_eq!(status, StatusCode::OK);
    let google_id = state
        .sessions
        .verify(body["authToken"].as_str().unwrap())
        .unwrap()
        .user
        .id;
    assert_eq!(google_id, local_id);
    assert_eq!(db.user_count().await, 1);

    // The local password still works afterwards.
    let (_, login) = post_json(
        &app,
        "/api/v1/users/login",
        json!({ "email": "ann@x.com", "password": "pw123456" }),
    )
    .await;
    assert_eq!(login["success"], true);
}

#[tokio::test]
async fn test_google_only_account_cannot_use_password_login() {
    let (app, state, _) = create_test_app();
    let token = sign_google_token(&google_claims(&state.config, "gina@x.com", "Gina"));
    post_json(&app, GOOGLE_LOGIN, json!({ "token": token })).await;

    let (status, body) = post_json(
        &app,
        "/api/v1/users/login",
        json!({ "email": "gina@x.com", "password": "anything1" }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "password not match");
}

async fn assert_rejected(token: String) {
    let (app, _, db) = create_test_app();

    let (status, body) = post_json(&app, GOOGLE_LOGIN, json!({ "token": token })).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "success": false, "message": "Server Error" }));
    assert_eq!(db.user_count().await, 0);
}

#[tokio::test]
async fn test_google_token_for_other_client_is_rejected() {
    let config = Config::test_default();
    let mut claims = google_claims(&config, "gina@x.com", "Gina");
    claims["aud"] = json!("someone-else.apps.googleusercontent.com");

    assert_rejected(sign_google_token(&claims)).await;
}

#[tokio::test]
async fn test_google_token_with_foreign_issuer_is_rejected() {
    let config = Config::test_default();
    let mut claims = google_claims(&config, "gina@x.com", "Gina");
    claims["iss"] = json!("https://evil.example.com");

    assert_rejected(sign_google_token(&claims)).await;
}

#[tokio::test]
async fn test_google_token_signed_by_unknown_key_is_rejected() {
    let config = Config::test_default();
    let claims = google_claims(&config, "gina@x.com", "Gina");

    assert_rejected(sign_with_rogue_key(&claims)).await;
}

#[tokio::test]
async fn test_google_token_with_unknown_kid_is_rejected() {
    let config = Config::test_default();
    let claims = google_claims(&config, "gina@x.com", "Gina");
    let private_pem = include_bytes!("fixtures/google_test_private.pem");

    assert_rejected(sign_rs256(&claims, "not-a-google-key", private_pem)).await;
}

#[tokio::test]
async fn test_expired_google_token_is_rejected() {
    let config = Config::test_default();
    let mut claims = google_claims(&config, "gina@x.com", "Gina");
    let now = now_secs();
    claims["iat"] = json!(now - 7200);
    claims["exp"] = json!(now - 3600);

    assert_rejected(sign_google_token(&claims)).await;
}

#[tokio::test]
async fn test_unverified_google_email_is_rejected() {
    let config = Config::test_default();
    let mut claims = google_claims(&config, "gina@x.com", "Gina");
    claims["email_verified"] = json!(false);

    assert_rejected(sign_google_token(&claims)).await;
}

#[tokio::test]
async fn test_garbage_google_token_is_rejected() {
    assert_rejected("not.a.jwt".to_string()).await;
}

#[tokio::test]
async fn test_missing_google_token_is_validation_error() {
    let (app, _, _) = create_test_app();

    let (status, body) = post_json(&app, GOOGLE_LOGIN, json!({})).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errors"][0]["path"], "token");
    assert_eq!(body["errors"][0]["msg"], "Token is required");
}

/// Store whose email lookups miss the first `hidden` times, as if another
/// sign-in created the account between our lookup and our insert.
struct LateVisibleDb {
    inner: MemoryDb,
    hidden: AtomicUsize,
}

impl LateVisibleDb {
    fn new(inner: MemoryDb, hidden: usize) -> Self {
        Self {
            inner,
            hidden: AtomicUsize::new(hidden),
        }
    }
}

#[async_trait]
impl Database for LateVisibleDb {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let still_hidden = self
            .hidden
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if still_hidden {
            return Ok(None);
        }
        self.inner.find_user_by_email(email).await
    }

    async fn find_user_by_id(&self, id: &str) -> Result<Option<User>, AppError> {
        self.inner.find_user_by_id(id).await
    }

    async fn create_user(&self, user: NewUser) -> Result<User, AppError> {
        self.inner.create_user(user).await
    }

    async fn list_blogs(&self) -> Result<Vec<Blog>, AppError> {
        self.inner.list_blogs().await
    }

    async fn create_blog(&self, blog: NewBlog) -> Result<Blog, AppError> {
        self.inner.create_blog(blog).await
    }

    async fn get_blog(&self, id: &str) -> Result<Option<Blog>, AppError> {
        self.inner.get_blog(id).await
    }

    async fn update_blog(&self, id: &str, update: BlogUpdate) -> Result<Option<Blog>, AppError> {
        self.inner.update_blog(id, update).await
    }

    async fn delete_blog(&self, id: &str) -> Result<Option<Blog>, AppError> {
        self.inner.delete_blog(id).await
    }

    async fn list_diets(&self) -> Result<Vec<Diet>, AppError> {
        self.inner.list_diets().await
    }

    async fn create_diet(&self, diet: NewDiet) -> Result<Diet, AppError> {
        self.inner.create_diet(diet).await
    }

    async fn get_diet(&self, id: &str) -> Result<Option<Diet>, AppError> {
        self.inner.get_diet(id).await
    }

    async fn update_diet(&self, id: &str, diet: NewDiet) -> Result<Option<Diet>, AppError> {
        self.inner.update_diet(id, diet).await
    }

    async fn delete_diet(&self, id: &str) -> Result<Option<Diet>, AppError> {
        self.inner.delete_diet(id).await
    }

    async fn list_contacts(&self) -> Result<Vec<Contact>, AppError> {
        self.inner.list_contacts().await
    }

    async fn create_contact(&self, contact: NewContact) -> Result<Contact, AppError> {
        self.inner.create_contact(contact).await
    }
}

fn gina() -> NewUser {
    NewUser {
        name: "Gina".to_string(),
        email: "gina@x.com".to_string(),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_google_login_losing_creation_race_signs_into_winner() {
    let memory = MemoryDb::new();
    let existing = memory.create_user(gina()).await.unwrap();
    let db: Arc<dyn Database> = Arc::new(LateVisibleDb::new(memory.clone(), 1));
    let (app, state) = create_test_app_with_db(db);

    let token = sign_google_token(&google_claims(&state.config, "gina@x.com", "Gina"));
    let (status, body) = post_json(&app, GOOGLE_LOGIN, json!({ "token": token })).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    let user_id = state
        .sessions
        .verify(body["authToken"].as_str().unwrap())
        .unwrap()
        .user
        .id;
    assert_eq!(user_id, existing.id);
    assert_eq!(memory.user_count().await, 1);
}

#[tokio::test]
async fn test_google_login_conflict_without_account_is_server_error() {
    let memory = MemoryDb::new();
    memory.create_user(gina()).await.unwrap();
    let db: Arc<dyn Database> = Arc::new(LateVisibleDb::new(memory.clone(), usize::MAX));
    let (app, state) = create_test_app_with_db(db);

    let token = sign_google_token(&google_claims(&state.config, "gina@x.com", "Gina"));
    let (status, body) = post_json(&app, GOOGLE_LOGIN, json!({ "token": token })).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "success": false, "message": "Server Error" }));
    assert_eq!(memory.user_count().await, 1);
}
