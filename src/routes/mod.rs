// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! HTTP route handlers.

pub mod blog;
pub mod contact;
pub mod diet;
pub mod users;

use crate::middleware::auth::{require_auth, AUTH_TOKEN_HEADER};
use crate::AppState;
use axum::http::{header, request, HeaderName, HeaderValue, Method};
use axum::{middleware, routing::get, Json, Router};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct HealthResponse {
    pub status: String,
    pub build_id: String,
}

/// Health check response
async fn health_check() -> Json<HealthResponse> {
    let build_id = option_env!("BUILD_ID").unwrap_or("unknown").to_string();
    Json(HealthResponse {
        status: "ok".to_string(),
        build_id,
    })
}

async fn root() -> &'static str {
    "Hello World!"
}

/// Build the complete router with all routes.
pub fn create_router(state: Arc<AppState>) -> Router {
    // Only /profile needs a session token
    let user_routes = users::routes().merge(
        users::protected_routes()
            .route_layer(middleware::from_fn_with_state(state.clone(), require_auth)),
    );

    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .nest("/api/v1/users", user_routes)
        .nest("/api/v1/blog", blog::routes())
        .nest("/api/v1/diet", diet::routes())
        .nest("/api/v1/contact", contact::routes())
        .layer(middleware::from_fn(
            crate::middleware::security::add_security_headers,
        ))
        .layer(cors_layer(state.config.frontend_url.clone()))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .with_state(state)
}

/// Browsers may call the API from the configured frontend, or from any local
/// dev server.
fn cors_layer(frontend_url: String) -> CorsLayer {
    let allowed = move |origin: &HeaderValue, _: &request::Parts| {
        origin.to_str().is_ok_and(|origin| {
            origin == frontend_url
                || origin.starts_with("http://localhost")
                || origin.starts_with("http://127.0.0.1")
        })
    };

    CorsLayer::new()
        .allow_origin(AllowOrigin::predicate(allowed))
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::CONTENT_TYPE,
            header::ACCEPT,
            HeaderName::from_static(AUTH_TOKEN_HEADER),
        ])
}
