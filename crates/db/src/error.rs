#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("unsupported database url '{0}'; expected memory:// or postgres://")]
    UnsupportedUrl(String),
    #[error("database backend '{0}' is not compiled in")]
    BackendDisabled(&'static str),
    #[error("document store is closed")]
    Closed,
    #[error("document fields must be a JSON object, got {0}")]
    NotAnObject(&'static str),
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
    #[cfg(feature = "postgres")]
    #[error(transparent)]
    Postgres(#[from] sqlx::Error),
    #[cfg(feature = "postgres")]
    #[error("migration {module}/{id} failed: {source}")]
    Migration {
        module: String,
        id: &'static str,
        #[source]
        source: sqlx::Error,
    },
}
