// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-memory document store for tests and local development.

use super::{new_document_id, Database};
use crate::error::AppError;
use crate::models::{Blog, BlogUpdate, Contact, Diet, NewBlog, NewContact, NewDiet, NewUser, User};
use crate::time_utils::now_rfc3339;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Default)]
struct Collections {
    users: Vec<User>,
    blogs: Vec<Blog>,
    diets: Vec<Diet>,
    contacts: Vec<Contact>,
}

/// Process-local store; clones share the same data.
#[derive(Clone, Default)]
pub struct MemoryDb {
    inner: Arc<RwLock<Collections>>,
}

impl MemoryDb {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored users.
    pub async fn user_count(&self) -> usize {
        self.inner.read().await.users.len()
    }
}

#[async_trait]
impl Database for MemoryDb {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let data = self.inner.read().await;
        Ok(data.users.iter().find(|u| u.email == email).cloned())
    }

    async fn find_user_by_id(&self, id: &str) -> Result<Option<User>, AppError> {
        let data = self.inner.read().await;
        Ok(data.users.iter().find(|u| u.id == id).cloned())
    }

    async fn create_user(&self, user: NewUser) -> Result<User, AppError> {
        // Check and insert under one write lock so concurrent registrations
        // cannot both claim the same email.
        let mut data = self.inner.write().await;
        if data.users.iter().any(|u| u.email == user.email) {
            return Err(AppError::Conflict(format!(
                "email already registered: {}",
                user.email
            )));
        }

        let user = user.into_user(new_document_id(), now_rfc3339());
        data.users.push(user.clone());
        Ok(user)
    }

    async fn list_blogs(&self) -> Result<Vec<Blog>, AppError> {
        Ok(self.inner.read().await.blogs.clone())
    }

    async fn create_blog(&self, blog: NewBlog) -> Result<Blog, AppError> {
        let blog = blog.into_blog(new_document_id(), now_rfc3339());
        self.inner.write().await.blogs.push(blog.clone());
        Ok(blog)
    }

    async fn get_blog(&self, id: &str) -> Result<Option<Blog>, AppError> {
        let data = self.inner.read().await;
        Ok(data.blogs.iter().find(|b| b.id == id).cloned())
    }

    async fn update_blog(&self, id: &str, update: BlogUpdate) -> Result<Option<Blog>, AppError> {
        let mut data = self.inner.write().await;
        Ok(data.blogs.iter_mut().find(|b| b.id == id).map(|blog| {
            update.apply(blog);
            blog.clone()
        }))
    }

    async fn delete_blog(&self, id: &str) -> Result<Option<Blog>, AppError> {
        let mut data = self.inner.write().await;
        Ok(data
            .blogs
            .iter()
            .position(|b| b.id == id)
            .map(|idx| data.blogs.remove(idx)))
    }

    async fn list_diets(&self) -> Result<Vec<Diet>, AppError> {
        Ok(self.inner.read().await.diets.clone())
    }

    async fn create_diet(&self, diet: NewDiet) -> Result<Diet, AppError> {
        let diet = diet.into_diet(new_document_id(), now_rfc3339());
        self.inner.write().await.diets.push(diet.clone());
        Ok(diet)
    }

    async fn get_diet(&self, id: &str) -> Result<Option<Diet>, AppError> {
        let data = self.inner.read().await;
        Ok(data.diets.iter().find(|d| d.id == id).cloned())
    }

    async fn update_diet(&self, id: &str, update: NewDiet) -> Result<Option<Diet>, AppError> {
        let mut data = self.inner.write().await;
        Ok(data.diets.iter_mut().find(|d| d.id == id).map(|diet| {
            update.apply(diet);
            diet.clone()
        }))
    }

    async fn delete_diet(&self, id: &str) -> Result<Option<Diet>, AppError> {
        let mut data = self.inner.write().await;
        Ok(data
            .diets
            .iter()
            .position(|d| d.id == id)
            .map(|idx| data.diets.remove(idx)))
    }

    async fn list_contacts(&self) -> Result<Vec<Contact>, AppError> {
        Ok(self.inner.read().await.contacts.clone())
    }

    async fn create_contact(&self, contact: NewContact) -> Result<Contact, AppError> {
        let contact = contact.into_contact(new_document_id(), now_rfc3339());
        self.inner.write().await.contacts.push(contact.clone());
        Ok(contact)
    }
}
