//! JSON shapes exchanged over `/books`.
//!
//! Kept free of server dependencies so clients can link them without
//! pulling in axum or a database driver.

pub mod book;
pub mod error;

pub use book::{Book, BookInput, BookList, Deleted, MissingFields, NewBook};
pub use error::{ErrorBody, ErrorEnvelope};
