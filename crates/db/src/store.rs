use async_trait::async_trait;
use bookstore_kernel::Migration;

use crate::{DbError, Document, Fields};

/// Capabilities the application consumes from a document database.
///
/// Every call is a single-document operation; there are no transactions
/// spanning several documents. Ids are assigned by the backend and are
/// opaque to callers. An id the backend could never have issued is treated
/// like an absent one.
#[async_trait]
pub trait DocumentStore: Send + Sync + 'static {
    /// Short backend name for logs.
    fn backend(&self) -> &'static str;

    async fn ping(&self) -> Result<(), DbError>;

    /// Apply a migration once. Returns `false` if it was already applied.
    async fn apply_migration(&self, module: &str, migration: &Migration)
        -> Result<bool, DbError>;

    async fn insert_one(&self, collection: &str, fields: Fields) -> Result<Document, DbError>;

    async fn find_all(&self, collection: &str) -> Result<Vec<Document>, DbError>;

    async fn find_by_id(&self, collection: &str, id: &str) -> Result<Option<Document>, DbError>;

    /// Merge `fields` into the document, refreshing `updated_at`.
    async fn update_by_id(
        &self,
        collection: &str,
        id: &str,
        fields: Fields,
    ) -> Result<Option<Document>, DbError>;

    /// Remove the document, returning it as it was before deletion.
    async fn delete_by_id(&self, collection: &str, id: &str) -> Result<Option<Document>, DbError>;

    async fn close(&self);
}
