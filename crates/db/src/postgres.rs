//! Postgres backend: one `documents` table with a JSONB body per document.

use async_trait::async_trait;
use bookstore_kernel::settings::DatabaseSettings;
use bookstore_kernel::Migration;
use sqlx::postgres::PgPoolOptions;
use sqlx::types::Json;
use sqlx::{Executor, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{DbError, Document, DocumentStore, Fields};

/// Schema owned by the `db` module itself; applied before any other module.
pub(crate) const DOCUMENTS_MIGRATIONS: &[Migration] = &[
    Migration {
        id: "001_documents",
        // language=postgresql
        up: r#"
            CREATE TABLE IF NOT EXISTS documents (
                id          UUID PRIMARY KEY DEFAULT gen_random_uuid(),
                collection  TEXT NOT NULL,
                body        JSONB NOT NULL,
                created_at  TIMESTAMPTZ NOT NULL DEFAULT now(),
                updated_at  TIMESTAMPTZ NOT NULL DEFAULT now()
            )
            "#,
    },
    Migration {
        id: "002_documents_collection_idx",
        // language=postgresql
        up: r#"
            CREATE INDEX IF NOT EXISTS documents_collection_idx
            ON documents (collection, created_at)
            "#,
    },
];

pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    pub async fn connect(settings: &DatabaseSettings) -> Result<Self, DbError> {
        let pool = PgPoolOptions::new()
            .max_connections(settings.max_connections)
            .connect(&settings.url)
            .await?;

        // language=postgresql
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS schema_migrations (
                module      TEXT NOT NULL,
                id          TEXT NOT NULL,
                applied_at  TIMESTAMPTZ NOT NULL DEFAULT now(),
                PRIMARY KEY (module, id)
            )
            "#,
        )
        .execute(&pool)
        .await?;

        Ok(Self { pool })
    }
}

#[derive(sqlx::FromRow)]
struct DocumentRow {
    id: Uuid,
    body: Json<Fields>,
    created_at: OffsetDateTime,
    updated_at: OffsetDateTime,
}

impl From<DocumentRow> for Document {
    fn from(row: DocumentRow) -> Self {
        Document {
            id: row.id.to_string(),
            fields: row.body.0,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[async_trait]
impl DocumentStore for PostgresStore {
    fn backend(&self) -> &'static str {
        "postgres"
    }

    async fn ping(&self) -> Result<(), DbError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn apply_migration(
        &self,
        module: &str,
        migration: &Migration,
    ) -> Result<bool, DbError> {
        let failed = |source| DbError::Migration {
            module: module.to_string(),
            id: migration.id,
            source,
        };

        let mut tx = self.pool.begin().await?;

        // language=postgresql
        let applied: Option<(String,)> = sqlx::query_as(
            r#"
            SELECT id FROM schema_migrations
            WHERE module = $1 AND id = $2
            "#,
        )
        .bind(module)
        .bind(migration.id)
        .fetch_optional(&mut *tx)
        .await?;

        if applied.is_some() {
            return Ok(false);
        }

        (&mut *tx).execute(migration.up).await.map_err(failed)?;

        // language=postgresql
        sqlx::query(
            r#"
            INSERT INTO schema_migrations (module, id)
            VALUES ($1, $2)
            "#,
        )
        .bind(module)
        .bind(migration.id)
        .execute(&mut *tx)
        .await
        .map_err(failed)?;

        tx.commit().await?;
        Ok(true)
    }

    async fn insert_one(&self, collection: &str, fields: Fields) -> Result<Document, DbError> {
        // language=postgresql
        let row = sqlx::query_as::<_, DocumentRow>(
            r#"
            INSERT INTO documents (collection, body)
            VALUES ($1, $2)
            RETURNING id, body, created_at, updated_at
            "#,
        )
        .bind(collection)
        .bind(Json(fields))
        .fetch_one(&self.pool)
        .await?;
        Ok(row.into())
    }

    async fn find_all(&self, collection: &str) -> Result<Vec<Document>, DbError> {
        // language=postgresql
        let rows = sqlx::query_as::<_, DocumentRow>(
            r#"
            SELECT id, body, created_at, updated_at
            FROM documents
            WHERE collection = $1
            ORDER BY created_at, id
            "#,
        )
        .bind(collection)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Document::from).collect())
    }

    async fn find_by_id(&self, collection: &str, id: &str) -> Result<Option<Document>, DbError> {
        let Ok(id) = Uuid::parse_str(id) else {
            return Ok(None);
        };
        // language=postgresql
        let row = sqlx::query_as::<_, DocumentRow>(
            r#"
            SELECT id, body, created_at, updated_at
            FROM documents
            WHERE collection = $1 AND id = $2
            "#,
        )
        .bind(collection)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Document::from))
    }

    async fn update_by_id(
        &self,
        collection: &str,
        id: &str,
        fields: Fields,
    ) -> Result<Option<Document>, DbError> {
        let Ok(id) = Uuid::parse_str(id) else {
            return Ok(None);
        };
        // language=postgresql
        let row = sqlx::query_as::<_, DocumentRow>(
            r#"
            UPDATE documents
            SET body = body || $3, updated_at = now()
            WHERE collection = $1 AND id = $2
            RETURNING id, body, created_at, updated_at
            "#,
        )
        .bind(collection)
        .bind(id)
        .bind(Json(fields))
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Document::from))
    }

    async fn delete_by_id(&self, collection: &str, id: &str) -> Result<Option<Document>, DbError> {
        let Ok(id) = Uuid::parse_str(id) else {
            return Ok(None);
        };
        // language=postgresql
        let row = sqlx::query_as::<_, DocumentRow>(
            r#"
            DELETE FROM documents
            WHERE collection = $1 AND id = $2
            RETURNING id, body, created_at, updated_at
            "#,
        )
        .bind(collection)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Document::from))
    }

    async fn close(&self) {
        self.pool.close().await;
        tracing::info!(target: "bookstore-db", "postgres pool closed");
    }
}
