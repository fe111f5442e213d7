// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Blog post routes.

use crate::error::{AppError, Result};
use crate::models::{Blog, BlogSummary, BlogUpdate, NewBlog};
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
        .route("/getall", get(list_blogs))
        .route("/create", post(create_blog))
        .route("/getblog/{id}", get(get_blog))
        .route("/update/{id}", put(update_blog))
        .route("/delete/{id}", delete(delete_blog))
}

fn not_found() -> AppError {
    AppError::NotFound("Blog not found".to_string())
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default)]
pub struct CreateBlogRequest {
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: String,
    #[validate(length(min = 1, message = "Summary is required"))]
    pub summery: String,
    #[validate(length(min = 1, message = "Description is required"))]
    pub description: String,
    #[validate(length(min = 1, message = "Image URL is required"))]
    pub img: String,
}

/// Partial update body; absent fields are left unchanged.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct UpdateBlogRequest {
    pub title: Option<String>,
    pub summery: Option<String>,
    pub description: Option<String>,
    pub img: Option<String>,
}

#[derive(Serialize)]
pub struct BlogCreated {
    pub message: String,
    pub blog: Blog,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogUpdated {
    pub message: String,
    pub updated_blog: Blog,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogDeleted {
    pub message: String,
    pub deleted_blog: Blog,
}

/// All posts, without their descriptions.
async fn list_blogs(State(state): State<Arc<AppState>>) -> Result<Json<Vec<BlogSummary>>> {
    let blogs = state.db.list_blogs().await?;
    Ok(Json(blogs.into_iter().map(BlogSummary::from).collect()))
}

async fn create_blog(
    State(state): State<Arc<AppState>>,
    JsonBody(req): JsonBody<CreateBlogRequest>,
) -> Result<Json<BlogCreated>> {
    let req = validation::validated(req)?;

    let blog = state
        .db
        .create_blog(NewBlog {
            title: req.title,
            summary: req.summery,
            description: req.description,
            img: req.img,
        })
        .await?;

    tracing::info!(blog_id = %blog.id, "Blog created");

    Ok(Json(BlogCreated {
        message: "Blog created successfully".to_string(),
        blog,
    }))
}

async fn get_blog(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Blog>> {
    let blog = state.db.get_blog(&id).await?.ok_or_else(not_found)?;
    Ok(Json(blog))
}

async fn update_blog(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    JsonBody(req): JsonBody<UpdateBlogRequest>,
) -> Result<Json<BlogUpdated>> {
    let update = BlogUpdate {
        title: req.title,
        summary: req.summery,
        description: req.description,
        img: req.img,
    };

    let updated_blog = state
        .db
        .update_blog(&id, update)
        .await?
        .ok_or_else(not_found)?;

    Ok(Json(BlogUpdated {
        message: "Blog updated successfully".to_string(),
        updated_blog,
    }))
}

async fn delete_blog(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<BlogDeleted>> {
    let deleted_blog = state.db.delete_blog(&id).await?.ok_or_else(not_found)?;

    tracing::info!(blog_id = %id, "Blog deleted");

    Ok(Json(BlogDeleted {
        message: "Blog deleted successfully".to_string(),
        deleted_blog,
    }))
}
