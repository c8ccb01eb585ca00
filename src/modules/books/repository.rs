use std::sync::Arc;

use bookstore_db::{to_fields, Database, DbError, DocumentStore};

use super::models::{book_from_document, Book, NewBook};

/// Collection holding book documents.
pub const COLLECTION: &str = "books";

/// Typed access to the `books` collection.
#[derive(Clone)]
pub struct BookRepository {
    store: Arc<dyn DocumentStore>,
}

impl BookRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            store: Arc::clone(db.store()),
        }
    }

    pub async fn create(&self, book: &NewBook) -> Result<Book, DbError> {
        let document = self.store.insert_one(COLLECTION, to_fields(book)?).await?;
        book_from_document(document)
    }

    pub async fn list(&self) -> Result<Vec<Book>, DbError> {
        self.store
            .find_all(COLLECTION)
            .await?
            .into_iter()
            .map(book_from_document)
            .collect()
    }

    pub async fn get(&self, id: &str) -> Result<Option<Book>, DbError> {
        self.store
            .find_by_id(COLLECTION, id)
            .await?
            .map(book_from_document)
            .transpose()
    }

    /// Replace title, author, and publish year. `None` if no such book.
    pub async fn update(&self, id: &str, book: &NewBook) -> Result<Option<Book>, DbError> {
        self.store
            .update_by_id(COLLECTION, id, to_fields(book)?)
            .await?
            .map(book_from_document)
            .transpose()
    }

    pub async fn delete(&self, id: &str) -> Result<Option<Book>, DbError> {
        self.store
            .delete_by_id(COLLECTION, id)
            .await?
            .map(book_from_document)
            .transpose()
    }
}
