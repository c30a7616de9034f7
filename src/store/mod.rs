//! Todo storage trait, backends, and backend selection.
//!
//! # Architecture
//!
//! Request handlers only see [`TodoStore`], held as `Arc<dyn TodoStore>` in
//! the router state. Backends are thin adapters over a collection and carry
//! no validation logic; ids and timestamps arrive already assigned.
//!
//! # Backends
//!
//! - [`InMemoryStore`](memory::InMemoryStore) -- Thread-safe map using
//!   `DashMap`. Used by tests and `--store memory`.
//! - [`MongoStore`](mongodb::MongoStore) -- MongoDB collection. Available
//!   behind the `mongodb` feature flag (enabled by default).

pub mod memory;
#[cfg(feature = "mongodb")]
pub mod mongodb;

use std::sync::Arc;

use async_trait::async_trait;
use bson::oid::ObjectId;
use thiserror::Error;
use tracing::info;

use crate::domain::{StoredTodo, TodoFields};

/// Errors raised by a storage backend.
///
/// Handlers surface the `Display` text to clients in the envelope `error`
/// field.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backend could not be reached at startup.
    #[error("failed to connect to store: {message}")]
    Connect {
        /// Human-readable description of the failure.
        message: String,
    },

    /// An operation failed inside the backend (network, timeout, write
    /// rejected, undecodable document).
    #[error("backend error: {message}")]
    Backend {
        /// Human-readable description of the failure.
        message: String,
    },

    /// The configured backend was not compiled into this binary.
    #[error("store backend `{backend}` is not available in this build")]
    Unsupported {
        /// Name of the requested backend.
        backend: &'static str,
    },
}

/// Collection-level access to todo records.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync`; every request handler shares the
/// same instance. No application-level locking happens around calls, so
/// concurrent writes to one record resolve as last-write-wins inside the
/// backend.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TodoStore: Send + Sync {
    /// Returns every record, in whatever order the backend yields them.
    ///
    /// # Errors
    ///
    /// [`StoreError::Backend`] on query failure.
    async fn list_all(&self) -> Result<Vec<StoredTodo>, StoreError>;

    /// Persists a fully-formed record.
    ///
    /// # Errors
    ///
    /// [`StoreError::Backend`] if the write fails.
    async fn insert(&self, record: &StoredTodo) -> Result<(), StoreError>;

    /// Sets `title` and `completed` on the record with the given id.
    ///
    /// Succeeds without effect when no record matches.
    ///
    /// # Errors
    ///
    /// [`StoreError::Backend`] if the write fails.
    async fn update_by_id(&self, id: ObjectId, fields: TodoFields) -> Result<(), StoreError>;

    /// Removes the record with the given id.
    ///
    /// Succeeds without effect when no record matches.
    ///
    /// # Errors
    ///
    /// [`StoreError::Backend`] if the delete fails.
    async fn delete_by_id(&self, id: ObjectId) -> Result<(), StoreError>;
}

/// Which backend to construct.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum StoreKind {
    /// Process-local map; contents are lost on exit.
    Memory,
    /// MongoDB collection.
    Mongodb,
}

/// Backend selection and connection settings.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub kind: StoreKind,
    /// MongoDB connection string.
    pub mongo_uri: String,
    pub database: String,
    pub collection: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            kind: StoreKind::Memory,
            mongo_uri: "mongodb://localhost:27017".to_string(),
            database: "todo-app".to_string(),
            collection: "todos".to_string(),
        }
    }
}

/// Builds the configured backend.
///
/// For MongoDB this verifies the server is reachable before returning.
///
/// # Errors
///
/// - [`StoreError::Connect`] if the database cannot be reached.
/// - [`StoreError::Unsupported`] if the backend was compiled out.
pub async fn connect(config: &StoreConfig) -> Result<Arc<dyn TodoStore>, StoreError> {
    match config.kind {
        StoreKind::Memory => {
            info!("Using in-memory todo store");
            Ok(Arc::new(memory::InMemoryStore::new()))
        },
        #[cfg(feature = "mongodb")]
        StoreKind::Mongodb => {
            let store =
                self::mongodb::MongoStore::connect(&config.mongo_uri, &config.database, &config.collection)
                    .await?;
            Ok(Arc::new(store))
        },
        #[cfg(not(feature = "mongodb"))]
        StoreKind::Mongodb => Err(StoreError::Unsupported { backend: "mongodb" }),
    }
}
