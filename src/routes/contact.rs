// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Contact form routes.

use crate::error::Result;
use crate::models::{Contact, NewContact};
use crate::validation::{self, JsonBody};
use crate::AppState;
use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/create", post(create_contact))
        .route("/getall", get(list_contacts))
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default)]
pub struct ContactRequest {
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
    #[validate(length(min = 1, message = "Email is required"))]
    pub email: String,
    #[validate(length(min = 1, message = "Message is required"))]
    pub message: String,
}

#[derive(Serialize)]
pub struct ContactCreated {
    pub message: String,
    pub contact: Contact,
}

async fn create_contact(
    State(state): State<Arc<AppState>>,
    JsonBody(req): JsonBody<ContactRequest>,
) -> Result<Json<ContactCreated>> {
    let req = validation::validated(req)?;

    let contact = state
        .db
        .create_contact(NewContact {
            name: req.name,
            email: req.email,
            message: req.message,
        })
        .await?;

    tracing::info!(contact_id = %contact.id, "Contact message stored");

    Ok(Json(ContactCreated {
        message: "We Will Contact you Soon".to_string(),
        contact,
    }))
}

async fn list_contacts(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Contact>>> {
    Ok(Json(state.db.list_contacts().await?))
}
