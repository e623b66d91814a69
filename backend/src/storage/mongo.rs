//! MongoDB-backed user storage.

use async_trait::async_trait;
use futures_util::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId};
use mongodb::{Client, Collection, Database};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use super::{StorageError, UserStorage};
use crate::models::{CreateUser, User};

/// Document shape stored in the users collection.
#[derive(Debug, Serialize, Deserialize)]
struct UserDocument {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    id: Option<ObjectId>,
    email: String,
    username: String,
}

impl UserDocument {
    fn into_user(self) -> Result<User, StorageError> {
        let id = self
            .id
            .ok_or_else(|| StorageError::query("stored user document has no _id"))?;
        Ok(User {
            id: id.to_hex(),
            email: self.email,
            username: self.username,
        })
    }
}

/// User storage over a MongoDB collection.
#[derive(Debug, Clone)]
pub struct MongoUserStorage {
    collection: Collection<UserDocument>,
}

impl MongoUserStorage {
    /// Bind to `collection` inside an already connected database.
    pub fn new(database: &Database, collection: &str) -> Self {
        Self {
            collection: database.collection(collection),
        }
    }

    /// Connect to `uri` and bind to `database.collection`.
    ///
    /// # Errors
    /// Returns [`StorageError::Connection`] when the URI cannot be parsed or
    /// the client cannot be created.
    pub async fn connect(uri: &str, database: &str, collection: &str) -> Result<Self, StorageError> {
        let client = Client::with_uri_str(uri)
            .await
            .map_err(|err| StorageError::connection(err.to_string()))?;
        Ok(Self::new(&client.database(database), collection))
    }
}

fn object_id(id: &str) -> Result<ObjectId, StorageError> {
    ObjectId::parse_str(id).map_err(|_| StorageError::invalid_id(id))
}

fn query_error(action: &str, err: &mongodb::error::Error) -> StorageError {
    StorageError::query(format!("failed to {action}: {err}"))
}

#[async_trait]
impl UserStorage for MongoUserStorage {
    async fn create(&self, user: CreateUser) -> Result<String, StorageError> {
        debug!("create user");
        let document = UserDocument {
            id: None,
            email: user.email,
            username: user.username,
        };
        let result = self
            .collection
            .insert_one(&document)
            .await
            .map_err(|err| query_error("create user", &err))?;
        result
            .inserted_id
            .as_object_id()
            .map(|oid| oid.to_hex())
            .ok_or_else(|| {
                StorageError::query(format!(
                    "inserted id is not an ObjectId: {}",
                    result.inserted_id
                ))
            })
    }

    async fn find_one(&self, id: &str) -> Result<User, StorageError> {
        let oid = object_id(id)?;
        let document = self
            .collection
            .find_one(doc! { "_id": oid })
            .await
            .map_err(|err| query_error(&format!("find user {id}"), &err))?;
        document
            .ok_or_else(|| StorageError::not_found(id))?
            .into_user()
    }

    async fn find_all(&self) -> Result<Vec<User>, StorageError> {
        let cursor = self
            .collection
            .find(doc! {})
            .await
            .map_err(|err| query_error("find all users", &err))?;
        let documents: Vec<UserDocument> = cursor
            .try_collect()
            .await
            .map_err(|err| query_error("read all documents from cursor", &err))?;
        documents.into_iter().map(UserDocument::into_user).collect()
    }

    async fn update(&self, user: &User) -> Result<(), StorageError> {
        let oid = object_id(&user.id)?;
        let result = self
            .collection
            .update_one(
                doc! { "_id": oid },
                doc! { "$set": { "email": user.email.as_str(), "username": user.username.as_str() } },
            )
            .await
            .map_err(|err| query_error("update user", &err))?;
        if result.matched_count == 0 {
            return Err(StorageError::not_found(user.id.as_str()));
        }
        trace!(
            matched = result.matched_count,
            modified = result.modified_count,
            "updated user"
        );
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<(), StorageError> {
        let oid = object_id(id)?;
        let result = self
            .collection
            .delete_one(doc! { "_id": oid })
            .await
            .map_err(|err| query_error("delete user", &err))?;
        if result.deleted_count == 0 {
            return Err(StorageError::not_found(id));
        }
        trace!(deleted = result.deleted_count, "deleted user");
        Ok(())
    }
}
