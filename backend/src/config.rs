//! Server settings loaded via OrthoConfig.
//!
//! Values come from CLI flags, `USERS_API_*` environment variables and
//! configuration files, in OrthoConfig's usual precedence.

use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_TIMEOUT_SECS: u64 = 15;
const DEFAULT_MONGODB_DATABASE: &str = "rest_api_service";
const DEFAULT_MONGODB_COLLECTION: &str = "users";

/// Settings that cannot be turned into a running server.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettingsError {
    /// A MongoDB URI was configured but the adapter was not compiled in.
    #[error("mongodb_uri is set but this build lacks the `mongodb` feature")]
    MongoDbUnavailable,
    /// A configured value is empty.
    #[error("{field} must not be empty")]
    Empty {
        /// Offending setting.
        field: &'static str,
    },
}

/// Storage adapter selected by the settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageBackend {
    /// Process-local map; contents are lost on restart.
    Memory,
    /// MongoDB collection.
    MongoDb {
        /// Connection string.
        uri: String,
        /// Database name.
        database: String,
        /// Collection holding user documents.
        collection: String,
    },
}

/// Configuration for the HTTP server and its storage.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "USERS_API")]
pub struct ServerSettings {
    /// Interface to bind.
    pub host: Option<String>,
    /// Port to bind.
    #[ortho_config(default = 1234)]
    pub port: u16,
    /// Seconds a client has to send request headers.
    pub request_timeout_secs: Option<u64>,
    /// Seconds a client has to acknowledge connection shutdown.
    pub disconnect_timeout_secs: Option<u64>,
    /// MongoDB connection string; the in-memory store is used when absent.
    pub mongodb_uri: Option<String>,
    /// MongoDB database name.
    pub mongodb_database: Option<String>,
    /// MongoDB collection name.
    pub mongodb_collection: Option<String>,
}

impl ServerSettings {
    /// Interface to bind, defaulting to all interfaces.
    pub fn host(&self) -> &str {
        self.host.as_deref().unwrap_or(DEFAULT_HOST)
    }

    /// Port to bind.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Address tuple accepted by `HttpServer::bind`.
    pub fn bind_addr(&self) -> (&str, u16) {
        (self.host(), self.port())
    }

    /// Client request timeout.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS))
    }

    /// Client disconnect timeout.
    pub fn disconnect_timeout(&self) -> Duration {
        Duration::from_secs(
            self.disconnect_timeout_secs
                .unwrap_or(DEFAULT_TIMEOUT_SECS),
        )
    }

    /// Pick the storage adapter.
    ///
    /// # Errors
    /// [`SettingsError::MongoDbUnavailable`] when a MongoDB URI is set in a
    /// build without the `mongodb` feature, and [`SettingsError::Empty`] for
    /// blank MongoDB names.
    pub fn storage_backend(&self) -> Result<StorageBackend, SettingsError> {
        let Some(uri) = self.mongodb_uri.as_deref() else {
            return Ok(StorageBackend::Memory);
        };
        if !cfg!(feature = "mongodb") {
            return Err(SettingsError::MongoDbUnavailable);
        }
        Ok(StorageBackend::MongoDb {
            uri: non_empty("mongodb_uri", Some(uri), "")?,
            database: non_empty(
                "mongodb_database",
                self.mongodb_database.as_deref(),
                DEFAULT_MONGODB_DATABASE,
            )?,
            collection: non_empty(
                "mongodb_collection",
                self.mongodb_collection.as_deref(),
                DEFAULT_MONGODB_COLLECTION,
            )?,
        })
    }
}

fn non_empty(
    field: &'static str,
    value: Option<&str>,
    default: &str,
) -> Result<String, SettingsError> {
    let value = value.unwrap_or(default).trim();
    if value.is_empty() {
        return Err(SettingsError::Empty { field });
    }
    Ok(value.to_owned())
}
