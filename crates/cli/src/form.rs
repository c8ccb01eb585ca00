//! Client-side form checks.
//!
//! These only short-circuit obviously bad submissions before a round trip;
//! the service validates again and its answer is the one that counts.

use bookstore_model::{Book, NewBook};

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum FormError {
    #[error("All fields are required")]
    MissingFields,
    #[error("Publish Year must be a valid positive number")]
    InvalidYear,
}

/// Raw field values as typed by the user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookForm {
    pub title: String,
    pub author: String,
    pub publish_year: String,
}

impl BookForm {
    pub fn validate(&self) -> Result<NewBook, FormError> {
        if self.title.is_empty() || self.author.is_empty() || self.publish_year.trim().is_empty() {
            return Err(FormError::MissingFields);
        }

        let publish_year = self
            .publish_year
            .trim()
            .parse::<i32>()
            .ok()
            .filter(|year| *year >= 0)
            .ok_or(FormError::InvalidYear)?;

        Ok(NewBook {
            title: self.title.clone(),
            author: self.author.clone(),
            publish_year,
        })
    }

    /// Replace the fields the user supplied, keep the rest.
    pub fn apply(
        mut self,
        title: Option<String>,
        author: Option<String>,
        publish_year: Option<String>,
    ) -> Self {
        if let Some(title) = title {
            self.title = title;
        }
        if let Some(author) = author {
            self.author = author;
        }
        if let Some(publish_year) = publish_year {
            self.publish_year = publish_year;
        }
        self
    }
}

/// Edit forms start from the stored values.
impl From<&Book> for BookForm {
    fn from(book: &Book) -> Self {
        Self {
            title: book.title.clone(),
            author: book.author.clone(),
            publish_year: book.publish_year.to_string(),
        }
    }
}
