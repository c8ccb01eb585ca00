//! In-process backend used for local runs and tests.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use bookstore_kernel::Migration;
use time::OffsetDateTime;
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use crate::{DbError, Document, DocumentStore, Fields};

/// Documents keyed by v7 uuid, so iteration follows creation order.
type Collection = BTreeMap<Uuid, Document>;

#[derive(Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<String, Collection>>,
    applied: Mutex<HashSet<(String, &'static str)>>,
    closed: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn ensure_open(&self) -> Result<(), DbError> {
        if self.closed.load(Ordering::Acquire) {
            return Err(DbError::Closed);
        }
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn ping(&self) -> Result<(), DbError> {
        self.ensure_open()
    }

    async fn apply_migration(
        &self,
        module: &str,
        migration: &Migration,
    ) -> Result<bool, DbError> {
        self.ensure_open()?;
        let fresh = self
            .applied
            .lock()
            .await
            .insert((module.to_string(), migration.id));
        if fresh {
            tracing::debug!(
                target: "bookstore-db",
                module,
                migration = migration.id,
                "recorded migration (memory backend has no schema)"
            );
        }
        Ok(fresh)
    }

    async fn insert_one(&self, collection: &str, fields: Fields) -> Result<Document, DbError> {
        self.ensure_open()?;
        let id = Uuid::now_v7();
        let now = OffsetDateTime::now_utc();
        let document = Document {
            id: id.to_string(),
            fields,
            created_at: now,
            updated_at: now,
        };

        self.collections
            .write()
            .await
            .entry(collection.to_string())
            .or_default()
            .insert(id, document.clone());

        Ok(document)
    }

    async fn find_all(&self, collection: &str) -> Result<Vec<Document>, DbError> {
        self.ensure_open()?;
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .map(|documents| documents.values().cloned().collect())
            .unwrap_or_default())
    }

    async fn find_by_id(&self, collection: &str, id: &str) -> Result<Option<Document>, DbError> {
        self.ensure_open()?;
        let Ok(key) = Uuid::parse_str(id) else {
            return Ok(None);
        };
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .and_then(|documents| documents.get(&key))
            .cloned())
    }

    async fn update_by_id(
        &self,
        collection: &str,
        id: &str,
        fields: Fields,
    ) -> Result<Option<Document>, DbError> {
        self.ensure_open()?;
        let Ok(key) = Uuid::parse_str(id) else {
            return Ok(None);
        };
        let mut collections = self.collections.write().await;
        let Some(document) = collections
            .get_mut(collection)
            .and_then(|documents| documents.get_mut(&key))
        else {
            return Ok(None);
        };

        document.fields.extend(fields);
        document.updated_at = OffsetDateTime::now_utc();
        Ok(Some(document.clone()))
    }

    async fn delete_by_id(&self, collection: &str, id: &str) -> Result<Option<Document>, DbError> {
        self.ensure_open()?;
        let Ok(key) = Uuid::parse_str(id) else {
            return Ok(None);
        };
        let mut collections = self.collections.write().await;
        Ok(collections
            .get_mut(collection)
            .and_then(|documents| documents.remove(&key)))
    }

    async fn close(&self) {
        self.closed.store(true, Ordering::Release);
        tracing::info!(target: "bookstore-db", "memory store closed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn fields(title: &str) -> Fields {
        let mut fields = Fields::new();
        fields.insert("title".into(), json!(title));
        fields.insert("shelf".into(), json!("A1"));
        fields
    }

    #[tokio::test]
    async fn insert_assigns_distinct_ids_and_timestamps() {
        let store = MemoryStore::new();
        let first = store.insert_one("books", fields("Dune")).await.unwrap();
        let second = store.insert_one("books", fields("Emma")).await.unwrap();

        assert_ne!(first.id, second.id);
        assert_eq!(first.created_at, first.updated_at);
        assert!(Uuid::parse_str(&first.id).is_ok());
    }

    #[tokio::test]
    async fn find_all_returns_creation_order_per_collection() {
        let store = MemoryStore::new();
        for title in ["Dune", "Emma", "Ulysses"] {
            store.insert_one("books", fields(title)).await.unwrap();
        }
        store.insert_one("authors", fields("Austen")).await.unwrap();

        let titles: Vec<_> = store
            .find_all("books")
            .await
            .unwrap()
            .into_iter()
            .map(|doc| doc.fields["title"].clone())
            .collect();
        assert_eq!(titles, [json!("Dune"), json!("Emma"), json!("Ulysses")]);
        assert!(store.find_all("missing").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn update_merges_fields_and_keeps_identity() {
        let store = MemoryStore::new();
        let created = store.insert_one("books", fields("Dune")).await.unwrap();

        let mut patch = Fields::new();
        patch.insert("title".into(), json!("Dune Messiah"));
        let updated = store
            .update_by_id("books", &created.id, patch)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.id, created.id);
        assert_eq!(updated.created_at, created.created_at);
        assert!(updated.updated_at >= created.updated_at);
        assert_eq!(updated.fields["title"], json!("Dune Messiah"));
        assert_eq!(updated.fields["shelf"], json!("A1"));
    }

    #[tokio::test]
    async fn malformed_and_unknown_ids_are_absent() {
        let store = MemoryStore::new();
        store.insert_one("books", fields("Dune")).await.unwrap();
        let unknown = Uuid::now_v7().to_string();

        for id in ["doesnotexist", unknown.as_str()] {
            assert_eq!(store.find_by_id("books", id).await.unwrap(), None);
            assert_eq!(
                store.update_by_id("books", id, Fields::new()).await.unwrap(),
                None
            );
            assert_eq!(store.delete_by_id("books", id).await.unwrap(), None);
        }
    }

    #[tokio::test]
    async fn delete_removes_document_once() {
        let store = MemoryStore::new();
        let created = store.insert_one("books", fields("Dune")).await.unwrap();

        let removed = store.delete_by_id("books", &created.id).await.unwrap();
        assert_eq!(removed, Some(created.clone()));
        assert_eq!(store.find_by_id("books", &created.id).await.unwrap(), None);
        assert_eq!(store.delete_by_id("books", &created.id).await.unwrap(), None);
    }

    #[tokio::test]
    async fn migrations_are_recorded_once() {
        let store = MemoryStore::new();
        let migration = Migration {
            id: "001_init",
            up: "CREATE TABLE nothing",
        };

        assert!(store.apply_migration("books", &migration).await.unwrap());
        assert!(!store.apply_migration("books", &migration).await.unwrap());
        assert!(store.apply_migration("db", &migration).await.unwrap());
    }

    #[tokio::test]
    async fn closed_store_refuses_work() {
        let store = MemoryStore::new();
        store.close().await;

        assert!(matches!(store.ping().await, Err(DbError::Closed)));
        assert!(matches!(
            store.insert_one("books", fields("Dune")).await,
            Err(DbError::Closed)
        ));
    }
}
