//! In-process user storage keyed by UUID.

use std::collections::BTreeMap;
use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;
use tracing::{debug, trace};
use uuid::Uuid;

use super::{StorageError, UserStorage};
use crate::models::{CreateUser, User};

/// User storage held in memory for the lifetime of the process.
///
/// Identifiers are UUIDs; anything else is rejected as
/// [`StorageError::InvalidId`], mirroring how the document store rejects
/// malformed object ids.
///
/// # Examples
/// ```
/// use rest_api_service::models::CreateUser;
/// use rest_api_service::storage::{MemoryUserStorage, UserStorage};
///
/// # tokio::runtime::Runtime::new().unwrap().block_on(async {
/// let storage = MemoryUserStorage::default();
/// let id = storage
///     .create(CreateUser { email: "ada@example.com".into(), username: "ada".into() })
///     .await
///     .expect("insert succeeds");
/// assert_eq!(storage.find_one(&id).await.expect("user stored").username, "ada");
/// # });
/// ```
#[derive(Debug, Default)]
pub struct MemoryUserStorage {
    users: RwLock<BTreeMap<Uuid, User>>,
}

impl MemoryUserStorage {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

fn parse_id(id: &str) -> Result<Uuid, StorageError> {
    Uuid::parse_str(id).map_err(|_| StorageError::invalid_id(id))
}

fn poisoned<T>(_: PoisonError<T>) -> StorageError {
    StorageError::query("user map lock poisoned")
}

#[async_trait]
impl UserStorage for MemoryUserStorage {
    async fn create(&self, user: CreateUser) -> Result<String, StorageError> {
        let id = Uuid::new_v4();
        debug!(%id, "create user");
        let mut users = self.users.write().map_err(poisoned)?;
        users.insert(id, User::from_create(id.to_string(), user));
        Ok(id.to_string())
    }

    async fn find_one(&self, id: &str) -> Result<User, StorageError> {
        let key = parse_id(id)?;
        let users = self.users.read().map_err(poisoned)?;
        users
            .get(&key)
            .cloned()
            .ok_or_else(|| StorageError::not_found(id))
    }

    async fn find_all(&self) -> Result<Vec<User>, StorageError> {
        let users = self.users.read().map_err(poisoned)?;
        Ok(users.values().cloned().collect())
    }

    async fn update(&self, user: &User) -> Result<(), StorageError> {
        let key = parse_id(&user.id)?;
        let mut users = self.users.write().map_err(poisoned)?;
        let stored = users
            .get_mut(&key)
            .ok_or_else(|| StorageError::not_found(user.id.as_str()))?;
        trace!(id = %key, "matched 1 user, replacing");
        stored.clone_from(user);
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<(), StorageError> {
        let key = parse_id(id)?;
        let mut users = self.users.write().map_err(poisoned)?;
        users
            .remove(&key)
            .map(|_| trace!(id = %key, "deleted 1 user"))
            .ok_or_else(|| StorageError::not_found(id))
    }
}
