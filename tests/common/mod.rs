// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use fitness_hub::config::Config;
use fitness_hub::db::{Database, FirestoreDb, MemoryDb};
use fitness_hub::routes::create_router;
use fitness_hub::services::GoogleIdTokenVerifier;
use fitness_hub::AppState;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use tower::ServiceExt;

/// Key id the static test verifier trusts.
#[allow(dead_code)]
pub const TEST_KID: &str = "test-key-1";

const GOOGLE_TEST_PRIVATE_PEM: &[u8] = include_bytes!("../fixtures/google_test_private.pem");
const GOOGLE_TEST_PUBLIC_PEM: &[u8] = include_bytes!("../fixtures/google_test_public.pem");
#[allow(dead_code)]
const ROGUE_PRIVATE_PEM: &[u8] = include_bytes!("../fixtures/rogue_private.pem");

/// Check if emulator is available via environment variable.
#[allow(dead_code)]
pub fn emulator_available() -> bool {
    std::env::var("FIRESTORE_EMULATOR_HOST").is_ok()
}

/// Skip test with message if emulator not available.
#[macro_export]
macro_rules! require_emulator {
    () => {
        if !crate::common::emulator_available() {
            eprintln!("⚠️  Skipping: FIRESTORE_EMULATOR_HOST not set");
            return;
        }
    };
}

/// Create a test database connection.
#[allow(dead_code)]
pub async fn test_db() -> FirestoreDb {
    FirestoreDb::new("test-project")
        .await
        .expect("Failed to connect to Firestore emulator")
}

/// Google verifier that trusts only the fixture public key.
#[allow(dead_code)]
pub fn test_verifier(config: &Config) -> GoogleIdTokenVerifier {
    let key = DecodingKey::from_rsa_pem(GOOGLE_TEST_PUBLIC_PEM).expect("fixture public key");
    GoogleIdTokenVerifier::new_with_static_key(config, TEST_KID, key).expect("static verifier")
}

/// Create a test app backed by the given store.
#[allow(dead_code)]
pub fn create_test_app_with_db(db: Arc<dyn Database>) -> (Router, Arc<AppState>) {
    let config = Config::test_default();
    let verifier = Arc::new(test_verifier(&config));
    let state = Arc::new(AppState::new(config, db, verifier));

    (create_router(state.clone()), state)
}

/// Create a test app with an in-memory store.
/// Returns the router, the shared state and a handle on the store.
#[allow(dead_code)]
pub fn create_test_app() -> (Router, Arc<AppState>, MemoryDb) {
    let db = MemoryDb::new();
    let (app, state) = create_test_app_with_db(Arc::new(db.clone()));
    (app, state, db)
}

#[allow(dead_code)]
pub fn now_secs() -> usize {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs() as usize
}

/// Claims of a Google ID token addressed to the test client.
#[allow(dead_code)]
pub fn google_claims(config: &Config, email: &str, name: &str) -> Value {
    let now = now_secs();
    json!({
        "iss": "https://accounts.google.com",
        "aud": config.google_client_id,
        "sub": format!("google-{email}"),
        "email": email,
        "email_verified": true,
        "name": name,
        "iat": now,
        "exp": now + 3600,
    })
}

/// Sign Google-style claims with the trusted fixture key.
#[allow(dead_code)]
pub fn sign_google_token(claims: &Value) -> String {
    sign_rs256(claims, TEST_KID, GOOGLE_TEST_PRIVATE_PEM)
}

/// Sign claims with a key the verifier has never seen, under the trusted kid.
#[allow(dead_code)]
pub fn sign_with_rogue_key(claims: &Value) -> String {
    sign_rs256(claims, TEST_KID, ROGUE_PRIVATE_PEM)
}

#[allow(dead_code)]
pub fn sign_rs256(claims: &Value, kid: &str, private_pem: &[u8]) -> String {
    let mut header = Header::new(Algorithm::RS256);
    header.kid = Some(kid.to_string());
    let key = EncodingKey::from_rsa_pem(private_pem).expect("fixture private key");
    jsonwebtoken::encode(&header, claims, &key).expect("sign test token")
}

async fn into_json(response: axum::response::Response) -> (StatusCode, Value) {
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, body)
}

/// POST a JSON body and return status + parsed JSON response.
#[allow(dead_code)]
pub async fn post_json(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    send_json(app, "POST", uri, body).await
}

#[allow(dead_code)]
pub async fn send_json(app: &Router, method: &str, uri: &str, body: Value) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method(method)
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(serde_json::to_string(&body).unwrap()))
                .unwrap(),
        )
        .await
        .unwrap();

    into_json(response).await
}

/// Send a bodyless request, optionally with a session token.
#[allow(dead_code)]
pub async fn request(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("x-auth-token", token);
    }

    let response = app
        .clone()
        .oneshot(builder.body(Body::empty()).unwrap())
        .await
        .unwrap();

    into_json(response).await
}

/// Register Ann and return her session token.
#[allow(dead_code)]
pub async fn register_ann(app: &Router) -> String {
    let (status, body) = post_json(
        app,
        "/api/v1/users/register",
        json!({
            "name": "Ann",
            "email": "ann@x.com",
            "age": 30,
            "gender": "f",
            "height": 165,
            "weight": 60,
            "password": "pw123456"
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true, "registration failed: {body}");
    body["authToken"].as_str().unwrap().to_string()
}
