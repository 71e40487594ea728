//! Ports to the identity provider and document database.
//!
//! Everything the admin API and the maintenance commands need from the
//! hosted platform goes through two traits:
//!
//! - [`IdentityProvider`] - ID token verification and identity records
//! - [`DocumentStore`] - `users` and `categories` documents
//!
//! [`FirebaseClient`] implements both against the Firebase REST APIs.
//! [`InMemoryPlatform`] implements both over in-process maps for tests and
//! local runs.

pub mod firebase;
pub mod memory;

pub use firebase::FirebaseClient;
pub use memory::InMemoryPlatform;

use async_trait::async_trait;
use gmexpress_core::{CategoryId, UserId, UserRole};
use thiserror::Error;

/// Errors returned by platform calls.
#[derive(Debug, Error)]
pub enum PlatformError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Record or document does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// ID token is malformed, expired, or revoked.
    #[error("Invalid ID token: {0}")]
    InvalidToken(String),

    /// Service credentials are missing or were rejected.
    #[error("Credentials error: {0}")]
    Credentials(String),

    /// Failed to parse response.
    #[error("Parse error: {0}")]
    Parse(String),
}

impl PlatformError {
    /// Whether this error means the target does not exist.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

/// Claims extracted from a verified ID token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedToken {
    pub uid: UserId,
    pub email: Option<String>,
}

/// An identity-provider account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityRecord {
    pub uid: UserId,
    pub email: Option<String>,
    pub display_name: Option<String>,
}

impl IdentityRecord {
    /// Email if known, otherwise the UID.
    #[must_use]
    pub fn label(&self) -> &str {
        self.email.as_deref().unwrap_or_else(|| self.uid.as_str())
    }
}

/// One page of identity records.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserPage {
    pub users: Vec<IdentityRecord>,
    /// Token for the next page; `None` on the last page.
    pub next_page_token: Option<String>,
}

/// Profile document stored at `users/{uid}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserDocument {
    pub uid: UserId,
    pub role: Option<UserRole>,
}

impl UserDocument {
    /// Whether the stored role grants admin rights.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role.as_ref().is_some_and(UserRole::is_admin)
    }
}

/// A category document to create.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCategory {
    pub name: String,
    /// Marker recorded as `createdBy`.
    pub created_by: String,
}

/// Identity provider operations.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Verify an ID token and return the UID it was issued to.
    ///
    /// # Errors
    ///
    /// Returns [`PlatformError::InvalidToken`] for bad tokens, or a transport
    /// error if the provider could not be reached.
    async fn verify_id_token(&self, id_token: &str) -> Result<VerifiedToken, PlatformError>;

    /// Delete an identity record.
    ///
    /// # Errors
    ///
    /// Returns [`PlatformError::NotFound`] if no such record exists.
    async fn delete_user(&self, uid: &UserId) -> Result<(), PlatformError>;

    /// List identity records, one page at a time.
    ///
    /// # Errors
    ///
    /// Returns an error if the provider call fails.
    async fn list_users(
        &self,
        page_size: u32,
        page_token: Option<&str>,
    ) -> Result<UserPage, PlatformError>;
}

/// Document database operations.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Fetch `users/{uid}`, or `None` if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the database call fails.
    async fn get_user(&self, uid: &UserId) -> Result<Option<UserDocument>, PlatformError>;

    /// Delete `users/{uid}`. Deleting a missing document succeeds.
    ///
    /// # Errors
    ///
    /// Returns an error if the database call fails.
    async fn delete_user(&self, uid: &UserId) -> Result<(), PlatformError>;

    /// Find a category whose `name` equals `name` exactly.
    ///
    /// # Errors
    ///
    /// Returns an error if the database call fails.
    async fn find_category_by_name(&self, name: &str) -> Result<Option<CategoryId>, PlatformError>;

    /// Create a category document with a generated ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database call fails.
    async fn insert_category(&self, category: &NewCategory) -> Result<CategoryId, PlatformError>;
}
