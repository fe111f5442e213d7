//! Database layer.
//!
//! Handlers talk to a [`Database`] trait object so the same routes run against
//! Firestore in production and an in-memory store in tests and local runs.

pub mod firestore;
pub mod memory;

pub use self::firestore::FirestoreDb;
pub use memory::MemoryDb;

use crate::error::AppError;
use crate::models::{Blog, BlogUpdate, Contact, Diet, NewBlog, NewContact, NewDiet, NewUser, User};
use async_trait::async_trait;

/// Collection names as constants.
pub mod collections {
    pub const USERS: &str = "users";
    /// Email uniqueness index (document ID is the url-encoded email)
    pub const USER_EMAILS: &str = "user_emails";
    pub const BLOGS: &str = "blogs";
    pub const DIETS: &str = "diets";
    pub const CONTACTS: &str = "contacts";
}

/// Fresh document ID.
pub fn new_document_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

/// Document store operations used by the API.
#[async_trait]
pub trait Database: Send + Sync {
    // ─── Users ───────────────────────────────────────────────────

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError>;

    async fn find_user_by_id(&self, id: &str) -> Result<Option<User>, AppError>;

    /// Create a user. Fails with `AppError::Conflict` when the email is taken.
    async fn create_user(&self, user: NewUser) -> Result<User, AppError>;

    // ─── Blogs ───────────────────────────────────────────────────

    async fn list_blogs(&self) -> Result<Vec<Blog>, AppError>;

    async fn create_blog(&self, blog: NewBlog) -> Result<Blog, AppError>;

    async fn get_blog(&self, id: &str) -> Result<Option<Blog>, AppError>;

    async fn update_blog(&self, id: &str, update: BlogUpdate) -> Result<Option<Blog>, AppError>;

    async fn delete_blog(&self, id: &str) -> Result<Option<Blog>, AppError>;

    // ─── Diets ───────────────────────────────────────────────────

    async fn list_diets(&self) -> Result<Vec<Diet>, AppError>;

    async fn create_diet(&self, diet: NewDiet) -> Result<Diet, AppError>;

    async fn get_diet(&self, id: &str) -> Result<Option<Diet>, AppError>;

    async fn update_diet(&self, id: &str, diet: NewDiet) -> Result<Option<Diet>, AppError>;

    async fn delete_diet(&self, id: &str) -> Result<Option<Diet>, AppError>;

    // ─── Contacts ────────────────────────────────────────────────

    async fn list_contacts(&self) -> Result<Vec<Contact>, AppError>;

    async fn create_contact(&self, contact: NewContact) -> Result<Contact, AppError>;
}
