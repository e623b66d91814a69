//! Builders for the storage adapter behind the user handlers.

use std::sync::Arc;

use actix_web::web;
use color_eyre::eyre::{Result, WrapErr};
use tracing::info;

use rest_api_service::api::users::UsersState;
use rest_api_service::config::{ServerSettings, StorageBackend};
use rest_api_service::storage::{MemoryUserStorage, UserStorage};

/// Build handler state, connecting to MongoDB when a URI is configured and
/// falling back to the in-memory store otherwise.
///
/// # Errors
/// Fails when the settings are inconsistent or the database cannot be
/// reached.
pub async fn build_users_state(settings: &ServerSettings) -> Result<web::Data<UsersState>> {
    let backend = settings
        .storage_backend()
        .wrap_err("invalid storage settings")?;
    let storage = build_storage(backend).await?;
    Ok(web::Data::new(UsersState::new(storage)))
}

async fn build_storage(backend: StorageBackend) -> Result<Arc<dyn UserStorage>> {
    match backend {
        StorageBackend::Memory => {
            info!("using in-memory user storage");
            Ok(Arc::new(MemoryUserStorage::new()))
        }
        #[cfg(feature = "mongodb")]
        StorageBackend::MongoDb {
            uri,
            database,
            collection,
        } => {
            use rest_api_service::storage::MongoUserStorage;

            info!(%database, %collection, "using MongoDB user storage");
            let storage = MongoUserStorage::connect(&uri, &database, &collection)
                .await
                .wrap_err("failed to connect to MongoDB")?;
            Ok(Arc::new(storage))
        }
        #[cfg(not(feature = "mongodb"))]
        StorageBackend::MongoDb { .. } => Err(color_eyre::eyre::eyre!(
            "MongoDB storage requested in a build without the `mongodb` feature"
        )),
    }
}
