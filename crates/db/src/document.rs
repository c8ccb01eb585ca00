use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use time::OffsetDateTime;

use crate::DbError;

/// Top-level fields of a stored document.
pub type Fields = serde_json::Map<String, Value>;

/// A document as returned by the store, with its store-managed metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub fields: Fields,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl Document {
    /// Deserialize the document fields into a typed value.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, DbError> {
        Ok(serde_json::from_value(Value::Object(self.fields.clone()))?)
    }
}

/// Serialize a value into document fields. Only JSON objects are accepted.
pub fn to_fields<T: Serialize>(value: &T) -> Result<Fields, DbError> {
    match serde_json::to_value(value)? {
        Value::Object(fields) => Ok(fields),
        Value::Null => Err(DbError::NotAnObject("null")),
        Value::Bool(_) => Err(DbError::NotAnObject("bool")),
        Value::Number(_) => Err(DbError::NotAnObject("number")),
        Value::String(_) => Err(DbError::NotAnObject("string")),
        Value::Array(_) => Err(DbError::NotAnObject("array")),
    }
}
