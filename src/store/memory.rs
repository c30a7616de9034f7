//! In-memory todo store.
//!
//! [`InMemoryStore`] keeps records in a `DashMap<ObjectId, StoredTodo>`.
//! Listing order follows the map's iteration order, which is unspecified,
//! matching the "store-native order" contract of [`TodoStore::list_all`].
//!
//! # Examples
//!
//! ```
//! use todo_server::store::memory::InMemoryStore;
//!
//! let store = InMemoryStore::new();
//! assert!(store.is_empty());
//! ```

use async_trait::async_trait;
use bson::oid::ObjectId;
use dashmap::DashMap;
use tracing::debug;

use super::{StoreError, TodoStore};
use crate::domain::{StoredTodo, TodoFields};

/// Thread-safe in-memory store using [`DashMap`].
#[derive(Debug, Default)]
pub struct InMemoryStore {
    data: DashMap<ObjectId, StoredTodo>,
}

impl InMemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self {
            data: DashMap::new(),
        }
    }

    /// Returns the number of records stored.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if the store contains no records.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

#[async_trait]
impl TodoStore for InMemoryStore {
    async fn list_all(&self) -> Result<Vec<StoredTodo>, StoreError> {
        Ok(self.data.iter().map(|entry| entry.value().clone()).collect())
    }

    async fn insert(&self, record: &StoredTodo) -> Result<(), StoreError> {
        debug!(id = %record.id, "insert todo");
        self.data.insert(record.id, record.clone());
        Ok(())
    }

    async fn update_by_id(&self, id: ObjectId, fields: TodoFields) -> Result<(), StoreError> {
        match self.data.get_mut(&id) {
            Some(mut entry) => entry.value_mut().apply(fields),
            None => debug!(%id, "update matched no todo"),
        }
        Ok(())
    }

    async fn delete_by_id(&self, id: ObjectId) -> Result<(), StoreError> {
        if self.data.remove(&id).is_none() {
            debug!(%id, "delete matched no todo");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn todo(title: &str) -> StoredTodo {
        StoredTodo::new(TodoFields {
            title: title.to_string(),
            completed: false,
        })
    }

    // ---- list_all tests ----

    #[tokio::test]
    async fn list_empty_store_returns_empty_vec() {
        let store = InMemoryStore::new();
        assert_eq!(store.list_all().await.unwrap(), Vec::new());
    }

    #[tokio::test]
    async fn list_returns_every_inserted_record() {
        let store = InMemoryStore::new();
        let a = todo("a");
        let b = todo("b");
        store.insert(&a).await.unwrap();
        store.insert(&b).await.unwrap();

        let mut listed = store.list_all().await.unwrap();
        listed.sort_by_key(|t| t.title.clone());
        assert_eq!(listed, vec![a, b]);
    }

    // ---- update_by_id tests ----

    #[tokio::test]
    async fn update_changes_only_mutable_fields() {
        let store = InMemoryStore::new();
        let original = todo("draft");
        store.insert(&original).await.unwrap();

        store
            .update_by_id(
                original.id,
                TodoFields {
                    title: "final".to_string(),
                    completed: true,
                },
            )
            .await
            .unwrap();

        let listed = store.list_all().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, original.id);
        assert_eq!(listed[0].created_at, original.created_at);
        assert_eq!(listed[0].title, "final");
        assert!(listed[0].completed);
    }

    #[tokio::test]
    async fn update_unknown_id_is_a_silent_no_op() {
        let store = InMemoryStore::new();
        store.insert(&todo("keep")).await.unwrap();

        let result = store
            .update_by_id(
                ObjectId::new(),
                TodoFields {
                    title: "ghost".to_string(),
                    completed: true,
                },
            )
            .await;

        assert!(result.is_ok());
        assert_eq!(store.list_all().await.unwrap()[0].title, "keep");
    }

    // ---- delete_by_id tests ----

    #[tokio::test]
    async fn delete_removes_record() {
        let store = InMemoryStore::new();
        let record = todo("gone");
        store.insert(&record).await.unwrap();

        store.delete_by_id(record.id).await.unwrap();
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn delete_unknown_id_succeeds() {
        let store = InMemoryStore::new();
        store.insert(&todo("stay")).await.unwrap();

        assert!(store.delete_by_id(ObjectId::new()).await.is_ok());
        assert_eq!(store.len(), 1);
    }

    // ---- concurrency ----

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_inserts_are_all_kept() {
        let store = std::sync::Arc::new(InMemoryStore::new());
        let handles: Vec<_> = (0..32)
            .map(|i| {
                let store = store.clone();
                tokio::spawn(async move { store.insert(&todo(&format!("t{i}"))).await })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }
        assert_eq!(store.len(), 32);
    }
}
