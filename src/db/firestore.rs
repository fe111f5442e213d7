// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore client wrapper with typed operations.
//!
//! Provides high-level operations for:
//! - Users (accounts plus the email uniqueness index)
//! - Blogs, diets and contact messages

use super::{new_document_id, Database};
use crate::db::collections;
use crate::error::AppError;
use crate::models::{Blog, BlogUpdate, Contact, Diet, NewBlog, NewContact, NewDiet, NewUser, User};
use crate::time_utils::now_rfc3339;
use async_trait::async_trait;
use firestore::errors::FirestoreError;
use serde::{de::DeserializeOwned, Deserialize, Serialize};

/// Document in `user_emails`, keyed by the url-encoded email.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct EmailIndex {
    user_id: String,
}

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreDb {
    client: Option<firestore::FirestoreDb>,
}

impl FirestoreDb {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, AppError> {
        // If the emulator environment variable is set, use unauthenticated connection
        // to avoid local credential warnings and leakage.
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, AppError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::Database(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a mock Firestore client for testing (offline mode).
    ///
    /// All database operations will return an error if called.
    pub fn new_mock() -> Self {
        Self { client: None }
    }

    /// Helper to get the client or return an error if offline.
    fn get_client(&self) -> Result<&firestore::FirestoreDb, AppError> {
        self.client
            .as_ref()
            .ok_or_else(|| AppError::Database("Database not connected (offline mode)".to_string()))
    }

    // ─── Generic Helpers ──────────────────────────────────────────

    async fn get_by_id<T>(&self, collection: &str, id: &str) -> Result<Option<T>, AppError>
    where
        T: DeserializeOwned + Send,
    {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collection)
            .obj()
            .one(id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// All documents of a collection, oldest first.
    async fn list_all<T>(&self, collection: &str) -> Result<Vec<T>, AppError>
    where
        T: DeserializeOwned + Send,
    {
        self.get_client()?
            .fluent()
            .select()
            .from(collection)
            .order_by([("createdAt", firestore::FirestoreQueryDirection::Ascending)])
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a document; fails if the ID is already taken.
    async fn insert<T>(&self, collection: &str, id: &str, object: &T) -> Result<T, AppError>
    where
        T: Serialize + DeserializeOwned + Send + Sync,
    {
        self.get_client()?
            .fluent()
            .insert()
            .into(collection)
            .document_id(id)
            .object(object)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Overwrite a document.
    async fn replace<T>(&self, collection: &str, id: &str, object: &T) -> Result<T, AppError>
    where
        T: Serialize + DeserializeOwned + Send + Sync,
    {
        self.get_client()?
            .fluent()
            .update()
            .in_col(collection)
            .document_id(id)
            .object(object)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    async fn delete_by_id(&self, collection: &str, id: &str) -> Result<(), AppError> {
        self.get_client()?
            .fluent()
            .delete()
            .from(collection)
            .document_id(id)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

fn email_key(email: &str) -> String {
    urlencoding::encode(email).into_owned()
}

#[async_trait]
impl Database for FirestoreDb {
    // ─── User Operations ─────────────────────────────────────────

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let users: Vec<User> = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::USERS)
            .filter(|q| q.field("email").eq(email))
            .limit(1)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(users.into_iter().next())
    }

    async fn find_user_by_id(&self, id: &str) -> Result<Option<User>, AppError> {
        self.get_by_id(collections::USERS, id).await
    }

    /// Claims the email in `user_emails` first. Firestore rejects the create
    /// if another registration already holds it, which is what keeps emails
    /// unique under concurrent sign-ups.
    async fn create_user(&self, user: NewUser) -> Result<User, AppError> {
        let id = new_document_id();
        let key = email_key(&user.email);

        let claim = self
            .get_client()?
            .fluent()
            .insert()
            .into(collections::USER_EMAILS)
            .document_id(&key)
            .object(&EmailIndex {
                user_id: id.clone(),
            })
            .execute::<EmailIndex>()
            .await;

        match claim {
            Ok(_) => {}
            Err(FirestoreError::DataConflictError(_)) => {
                return Err(AppError::Conflict(format!(
                    "email already registered: {}",
                    user.email
                )));
            }
            Err(e) => return Err(AppError::Database(e.to_string())),
        }

        let user = user.into_user(id, now_rfc3339());
        match self.insert(collections::USERS, &user.id, &user).await {
            Ok(created) => {
                tracing::info!(user_id = %created.id, "User created");
                Ok(created)
            }
            Err(e) => {
                // Release the email so a retry can succeed.
                if let Err(cleanup) = self.delete_by_id(collections::USER_EMAILS, &key).await {
                    tracing::error!(error = %cleanup, "Failed to release email index");
                }
                Err(e)
            }
        }
    }

    // ─── Blog Operations ─────────────────────────────────────────

    async fn list_blogs(&self) -> Result<Vec<Blog>, AppError> {
        self.list_all(collections::BLOGS).await
    }

    async fn create_blog(&self, blog: NewBlog) -> Result<Blog, AppError> {
        let blog = blog.into_blog(new_document_id(), now_rfc3339());
        self.insert(collections::BLOGS, &blog.id, &blog).await
    }

    async fn get_blog(&self, id: &str) -> Result<Option<Blog>, AppError> {
        self.get_by_id(collections::BLOGS, id).await
    }

    async fn update_blog(&self, id: &str, update: BlogUpdate) -> Result<Option<Blog>, AppError> {
        let Some(mut blog) = self.get_blog(id).await? else {
            return Ok(None);
        };
        update.apply(&mut blog);
        self.replace(collections::BLOGS, id, &blog).await.map(Some)
    }

    async fn delete_blog(&self, id: &str) -> Result<Option<Blog>, AppError> {
        let Some(blog) = self.get_blog(id).await? else {
            return Ok(None);
        };
        self.delete_by_id(collections::BLOGS, id).await?;
        Ok(Some(blog))
    }

    // ─── Diet Operations ─────────────────────────────────────────

    async fn list_diets(&self) -> Result<Vec<Diet>, AppError> {
        self.list_all(collections::DIETS).await
    }

    async fn create_diet(&self, diet: NewDiet) -> Result<Diet, AppError> {
        let diet = diet.into_diet(new_document_id(), now_rfc3339());
        self.insert(collections::DIETS, &diet.id, &diet).await
    }

    async fn get_diet(&self, id: &str) -> Result<Option<Diet>, AppError> {
        self.get_by_id(collections::DIETS, id).await
    }

    async fn update_diet(&self, id: &str, update: NewDiet) -> Result<Option<Diet>, AppError> {
        let Some(mut diet) = self.get_diet(id).await? else {
            return Ok(None);
        };
        update.apply(&mut diet);
        self.replace(collections::DIETS, id, &diet).await.map(Some)
    }

    async fn delete_diet(&self, id: &str) -> Result<Option<Diet>, AppError> {
        let Some(diet) = self.get_diet(id).await? else {
            return Ok(None);
        };
        self.delete_by_id(collections::DIETS, id).await?;
        Ok(Some(diet))
    }

    // ─── Contact Operations ──────────────────────────────────────

    async fn list_contacts(&self) -> Result<Vec<Contact>, AppError> {
        self.list_all(collections::CONTACTS).await
    }

    async fn create_contact(&self, contact: NewContact) -> Result<Contact, AppError> {
        let contact = contact.into_contact(new_document_id(), now_rfc3339());
        self.insert(collections::CONTACTS, &contact.id, &contact)
            .await
    }
}
