//! Repository trait for origin URL storage.

use crate::domain::entities::{NewUrl, UrlRecord};
use crate::error::AppError;
use async_trait::async_trait;

/// Storage boundary for origin URLs.
///
/// Uniqueness of `origin_url` is the repository's job; the codec trusts that
/// one origin URL maps to one stable id.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgUrlRepository`] - PostgreSQL implementation
/// - [`crate::infrastructure::persistence::InMemoryUrlRepository`] - process-local store
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UrlRepository: Send + Sync {
    /// Finds the record for an exact origin URL.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on storage errors.
    async fn find_by_origin_url(&self, origin_url: &str) -> Result<Option<UrlRecord>, AppError>;

    /// Stores a new origin URL.
    ///
    /// If another writer stored the same URL first, the existing record is
    /// returned instead of a duplicate.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on storage errors.
    async fn create(&self, new_url: NewUrl) -> Result<UrlRecord, AppError>;

    /// Finds a record by id.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on storage errors.
    async fn find_by_id(&self, id: i64) -> Result<Option<UrlRecord>, AppError>;

    /// Verifies the store is reachable.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] if it is not.
    async fn ping(&self) -> Result<(), AppError>;
}
