//! Repository Module
//!
//! In-memory stores for employees and login accounts. Ids are assigned from a
//! per-table counter starting at 1 and are never reused.

pub mod employee;
pub mod user;

pub use employee::EmployeeRepository;
pub use user::UserRepository;

use async_trait::async_trait;
use thiserror::Error;

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate: {0}")]
    Duplicate(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;

/// Existence check for records that carry an owner reference
#[async_trait]
pub trait ResourceStore: Send + Sync {
    async fn exists(&self, id: i64) -> RepoResult<bool>;
}

/// Case-folded key for unique email indexes
pub(crate) fn email_key(email: &str) -> String {
    email.trim().to_lowercase()
}
