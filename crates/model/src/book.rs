use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// A catalog entry as served over HTTP.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    /// Store-assigned identifier
    pub id: String,
    pub title: String,
    pub author: String,
    pub publish_year: i32,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// The three user-editable fields. Also the shape stored in the document body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBook {
    pub title: String,
    pub author: String,
    pub publish_year: i32,
}

/// Request body for create and update. Every field is optional here so a
/// missing one surfaces as a validation error rather than a decode failure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookInput {
    pub title: Option<String>,
    pub author: Option<String>,
    pub publish_year: Option<i32>,
}

/// Names of the required fields that were absent or empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingFields(pub Vec<&'static str>);

impl BookInput {
    pub fn validate(self) -> Result<NewBook, MissingFields> {
        let present = |value: Option<String>| value.filter(|text| !text.is_empty());

        match (present(self.title), present(self.author), self.publish_year) {
            (Some(title), Some(author), Some(publish_year)) => Ok(NewBook {
                title,
                author,
                publish_year,
            }),
            (title, author, publish_year) => {
                let mut missing = Vec::new();
                if title.is_none() {
                    missing.push("title");
                }
                if author.is_none() {
                    missing.push("author");
                }
                if publish_year.is_none() {
                    missing.push("publishYear");
                }
                Err(MissingFields(missing))
            }
        }
    }
}

/// Response of the list endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookList {
    pub count: usize,
    pub data: Vec<Book>,
}

impl From<Vec<Book>> for BookList {
    fn from(data: Vec<Book>) -> Self {
        Self {
            count: data.len(),
            data,
        }
    }
}

/// Response of the delete endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deleted {
    pub message: String,
    pub id: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn input(title: Option<&str>, author: Option<&str>, year: Option<i32>) -> BookInput {
        BookInput {
            title: title.map(str::to_string),
            author: author.map(str::to_string),
            publish_year: year,
        }
    }

    #[test]
    fn complete_input_validates() {
        let book = input(Some("Dune"), Some("Herbert"), Some(1965))
            .validate()
            .unwrap();
        assert_eq!(
            book,
            NewBook {
                title: "Dune".into(),
                author: "Herbert".into(),
                publish_year: 1965,
            }
        );
    }

    #[test]
    fn empty_strings_count_as_missing() {
        let missing = input(Some(""), Some("Herbert"), None).validate().unwrap_err();
        assert_eq!(missing, MissingFields(vec!["title", "publishYear"]));
    }

    #[test]
    fn server_trusts_any_year() {
        let book = input(Some("Old"), Some("Anon"), Some(-300)).validate().unwrap();
        assert_eq!(book.publish_year, -300);
    }

    #[test]
    fn input_uses_camel_case_keys() {
        let input: BookInput =
            serde_json::from_value(json!({"title": "Dune", "publishYear": 1965})).unwrap();
        assert_eq!(input.publish_year, Some(1965));
        assert_eq!(input.author, None);
    }

    #[test]
    fn list_counts_its_data() {
        let list = BookList::from(Vec::new());
        assert_eq!(serde_json::to_value(list).unwrap(), json!({"count": 0, "data": []}));
    }
}
