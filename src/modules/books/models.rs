//! Book wire types, plus their mapping from stored documents.

use bookstore_db::{DbError, Document};

pub use bookstore_model::book::{Book, BookInput, BookList, Deleted, MissingFields, NewBook};

/// Assemble a book from a stored document and its metadata.
pub fn book_from_document(document: Document) -> Result<Book, DbError> {
    let NewBook {
        title,
        author,
        publish_year,
    } = document.decode()?;

    Ok(Book {
        id: document.id,
        title,
        author,
        publish_year,
        created_at: document.created_at,
        updated_at: document.updated_at,
    })
}
