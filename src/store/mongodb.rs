//! MongoDB todo store.
//!
//! [`MongoStore`] maps each [`TodoStore`] method onto a single-document
//! driver call against one collection:
//!
//! | Method         | Driver call                                          |
//! |----------------|------------------------------------------------------|
//! | `list_all`     | `find({})`                                           |
//! | `insert`       | `insert_one(doc)`                                    |
//! | `update_by_id` | `update_one({_id}, {$set: {title, completed}})`      |
//! | `delete_by_id` | `delete_one({_id})`                                  |
//!
//! Documents are stored as `{_id, title, completed, createdAt}` with
//! `createdAt` as a native BSON date. `update_one` and `delete_one` report
//! matched counts, which are logged but never turned into errors.
//!
//! # Usage
//!
//! ```rust,no_run
//! use todo_server::store::mongodb::MongoStore;
//!
//! # async fn example() {
//! let store = MongoStore::connect("mongodb://localhost:27017", "todo-app", "todos")
//!     .await
//!     .unwrap();
//! # }
//! ```

use ::mongodb::{Client, Collection};
use async_trait::async_trait;
use bson::doc;
use bson::oid::ObjectId;
use chrono::{DateTime, Utc};
use futures::TryStreamExt;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{StoreError, TodoStore};
use crate::domain::{StoredTodo, TodoFields};

/// Document layout inside the collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct TodoDocument {
    #[serde(rename = "_id")]
    id: ObjectId,
    title: String,
    completed: bool,
    #[serde(
        rename = "createdAt",
        with = "bson::serde_helpers::chrono_datetime_as_bson_datetime"
    )]
    created_at: DateTime<Utc>,
}

impl From<&StoredTodo> for TodoDocument {
    fn from(todo: &StoredTodo) -> Self {
        Self {
            id: todo.id,
            title: todo.title.clone(),
            completed: todo.completed,
            created_at: todo.created_at,
        }
    }
}

impl From<TodoDocument> for StoredTodo {
    fn from(doc: TodoDocument) -> Self {
        Self {
            id: doc.id,
            title: doc.title,
            completed: doc.completed,
            created_at: doc.created_at,
        }
    }
}

impl From<::mongodb::error::Error> for StoreError {
    fn from(err: ::mongodb::error::Error) -> Self {
        Self::Backend {
            message: err.to_string(),
        }
    }
}

/// Todo store backed by a MongoDB collection.
#[derive(Debug, Clone)]
pub struct MongoStore {
    collection: Collection<TodoDocument>,
}

impl MongoStore {
    /// Connects to `uri` and pings the server.
    ///
    /// # Errors
    ///
    /// [`StoreError::Connect`] if the URI is invalid or the server does not
    /// answer the ping within the driver's server selection timeout.
    pub async fn connect(uri: &str, database: &str, collection: &str) -> Result<Self, StoreError> {
        let connect_err = |err: ::mongodb::error::Error| StoreError::Connect {
            message: err.to_string(),
        };

        let client = Client::with_uri_str(uri).await.map_err(connect_err)?;
        let db = client.database(database);
        db.run_command(doc! { "ping": 1 })
            .await
            .map_err(connect_err)?;

        info!(database, collection, "Connected to MongoDB");
        Ok(Self {
            collection: db.collection(collection),
        })
    }

    /// Removes every document in the collection.
    #[cfg(all(test, feature = "mongodb-tests"))]
    async fn clear(&self) -> Result<(), StoreError> {
        self.collection.delete_many(doc! {}).await?;
        Ok(())
    }
}

#[async_trait]
impl TodoStore for MongoStore {
    async fn list_all(&self) -> Result<Vec<StoredTodo>, StoreError> {
        let cursor = self.collection.find(doc! {}).await?;
        let docs: Vec<TodoDocument> = cursor.try_collect().await?;
        Ok(docs.into_iter().map(StoredTodo::from).collect())
    }

    async fn insert(&self, record: &StoredTodo) -> Result<(), StoreError> {
        self.collection
            .insert_one(TodoDocument::from(record))
            .await?;
        Ok(())
    }

    async fn update_by_id(&self, id: ObjectId, fields: TodoFields) -> Result<(), StoreError> {
        let result = self
            .collection
            .update_one(
                doc! { "_id": id },
                doc! { "$set": { "title": fields.title, "completed": fields.completed } },
            )
            .await?;
        debug!(%id, matched = result.matched_count, "update todo");
        Ok(())
    }

    async fn delete_by_id(&self, id: ObjectId) -> Result<(), StoreError> {
        let result = self.collection.delete_one(doc! { "_id": id }).await?;
        debug!(%id, deleted = result.deleted_count, "delete todo");
        Ok(())
    }
}
