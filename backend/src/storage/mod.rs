//! User storage port and its adapters.
//!
//! Handlers depend on [`UserStorage`] only. [`MemoryUserStorage`] backs tests
//! and local runs; the MongoDB adapter is compiled with the `mongodb` feature.

mod memory;
#[cfg(feature = "mongodb")]
mod mongo;

use async_trait::async_trait;

use crate::models::{CreateUser, User};

pub use memory::MemoryUserStorage;
#[cfg(feature = "mongodb")]
pub use mongo::MongoUserStorage;

/// Errors raised by user storage adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StorageError {
    /// No user is stored under the identifier.
    #[error("user {id} not found")]
    NotFound { id: String },
    /// The identifier is not in the format the adapter expects.
    #[error("invalid user id: {id}")]
    InvalidId { id: String },
    /// The backing store could not be reached.
    #[error("user storage connection failed: {message}")]
    Connection { message: String },
    /// A read or write failed during execution.
    #[error("user storage query failed: {message}")]
    Query { message: String },
}

impl StorageError {
    /// No user is stored under `id`.
    pub fn not_found(id: impl Into<String>) -> Self {
        Self::NotFound { id: id.into() }
    }

    /// `id` is malformed for this adapter.
    pub fn invalid_id(id: impl Into<String>) -> Self {
        Self::InvalidId { id: id.into() }
    }

    /// The store is unreachable.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// A storage operation failed.
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }
}

/// Create, read, update and delete operations on stored users.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserStorage: Send + Sync {
    /// Insert a user and return the identifier assigned to it.
    async fn create(&self, user: CreateUser) -> Result<String, StorageError>;

    /// Fetch a single user.
    async fn find_one(&self, id: &str) -> Result<User, StorageError>;

    /// Fetch every stored user.
    async fn find_all(&self) -> Result<Vec<User>, StorageError>;

    /// Overwrite the stored user with the same identifier.
    async fn update(&self, user: &User) -> Result<(), StorageError>;

    /// Remove a user.
    async fn delete(&self, id: &str) -> Result<(), StorageError>;
}
