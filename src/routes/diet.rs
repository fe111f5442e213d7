// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Diet plan routes.

use crate::error::{AppError, Result};
use crate::models::{Diet, NewDiet};
use crate::validation::{self, JsonBody};
use crate::AppState;
use axum::{
    extract::{Path, State},
    routing::{delete, get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/create", post(create_diet))
        .route("/all", get(list_diets))
        .route("/{id}", get(get_diet))
        .route("/update/{id}", put(update_diet))
        .route("/delete/{id}", delete(delete_diet))
}

fn not_found() -> AppError {
    AppError::NotFound("Diet not found".to_string())
}

/// Body for both create and update.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default)]
pub struct DietRequest {
    #[validate(length(min = 1, message = "Dietary Preference is required"))]
    pub dietpref: String,
    #[validate(length(min = 1, message = "Activity Level is required"))]
    pub activity: String,
    #[validate(length(min = 1, message = "Your Diet is required"))]
    pub yourdiet: String,
}

impl From<DietRequest> for NewDiet {
    fn from(req: DietRequest) -> Self {
        Self {
            diet_preference: req.dietpref,
            activity: req.activity,
            your_diet: req.yourdiet,
        }
    }
}

#[derive(Serialize)]
pub struct DietMessage {
    pub message: String,
    pub diet: Diet,
}

async fn create_diet(
    State(state): State<Arc<AppState>>,
    JsonBody(req): JsonBody<DietRequest>,
) -> Result<Json<DietMessage>> {
    let req = validation::validated(req)?;
    let diet = state.db.create_diet(req.into()).await?;

    tracing::info!(diet_id = %diet.id, "Diet created");

    Ok(Json(DietMessage {
        message: "Diet created successfully".to_string(),
        diet,
    }))
}

async fn list_diets(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Diet>>> {
    Ok(Json(state.db.list_diets().await?))
}

async fn get_diet(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Diet>> {
    let diet = state.db.get_diet(&id).await?.ok_or_else(not_found)?;
    Ok(Json(diet))
}

async fn update_diet(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    JsonBody(req): JsonBody<DietRequest>,
) -> Result<Json<DietMessage>> {
    let req = validation::validated(req)?;
    let diet = state
        .db
        .update_diet(&id, req.into())
        .await?
        .ok_or_else(not_found)?;

    Ok(Json(DietMessage {
        message: "Diet updated successfully".to_string(),
        diet,
    }))
}

async fn delete_diet(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<DietMessage>> {
    let diet = state.db.delete_diet(&id).await?.ok_or_else(not_found)?;

    tracing::info!(diet_id = %id, "Diet deleted");

    Ok(Json(DietMessage {
        message: "Diet deleted successfully".to_string(),
        diet,
    }))
}
