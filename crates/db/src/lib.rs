//! Document store access for the bookstore.
//!
//! The backend is chosen from the connection URL scheme:
//! `memory://` keeps documents in process, `postgres://` stores them in a
//! JSONB table. Both hand out opaque string ids and maintain
//! `created_at`/`updated_at` themselves.

mod document;
mod error;
mod memory;
#[cfg(feature = "postgres")]
mod postgres;
mod store;

use std::sync::Arc;

use async_trait::async_trait;
use bookstore_kernel::settings::DatabaseSettings;
use bookstore_kernel::{InitCtx, Migration, Module};

pub use document::{to_fields, Document, Fields};
pub use error::DbError;
pub use memory::MemoryStore;
#[cfg(feature = "postgres")]
pub use postgres::PostgresStore;
pub use store::DocumentStore;

/// Shared handle to the configured document store.
#[derive(Clone)]
pub struct Database {
    store: Arc<dyn DocumentStore>,
}

impl Database {
    /// Connect to the backend named by `settings.url`.
    pub async fn connect(settings: &DatabaseSettings) -> Result<Self, DbError> {
        let scheme = settings
            .url
            .split_once("://")
            .map(|(scheme, _)| scheme)
            .unwrap_or_default();

        let store: Arc<dyn DocumentStore> = match scheme {
            "memory" => Arc::new(MemoryStore::new()),
            #[cfg(feature = "postgres")]
            "postgres" | "postgresql" => Arc::new(PostgresStore::connect(settings).await?),
            #[cfg(not(feature = "postgres"))]
            "postgres" | "postgresql" => return Err(DbError::BackendDisabled("postgres")),
            _ => return Err(DbError::UnsupportedUrl(settings.redacted_url())),
        };

        tracing::info!(
            target: "bookstore-db",
            backend = store.backend(),
            url = %settings.redacted_url(),
            "document store connected"
        );

        Ok(Self { store })
    }

    pub fn in_memory() -> Self {
        Self::from_store(Arc::new(MemoryStore::new()))
    }

    pub fn from_store(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn DocumentStore> {
        &self.store
    }

    /// Apply migrations in order, skipping ones already applied.
    /// Returns how many were newly applied.
    pub async fn migrate(&self, migrations: &[(String, Migration)]) -> Result<usize, DbError> {
        let mut applied = 0;
        for (module, migration) in migrations {
            if self.store.apply_migration(module, migration).await? {
                tracing::info!(
                    target: "bookstore-db",
                    module = %module,
                    migration = migration.id,
                    "migration applied"
                );
                applied += 1;
            }
        }
        Ok(applied)
    }

    /// Lifecycle module that owns the connection: checks it on init and
    /// closes it on stop.
    pub fn module(&self) -> Arc<dyn Module> {
        Arc::new(DatabaseModule { db: self.clone() })
    }
}

pub struct DatabaseModule {
    db: Database,
}

#[async_trait]
impl Module for DatabaseModule {
    fn name(&self) -> &'static str {
        "db"
    }

    async fn init(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        self.db.store.ping().await?;
        tracing::info!(
            module = self.name(),
            backend = self.db.store.backend(),
            "database module initialized"
        );
        Ok(())
    }

    fn migrations(&self) -> Vec<Migration> {
        match self.db.store.backend() {
            #[cfg(feature = "postgres")]
            "postgres" => postgres::DOCUMENTS_MIGRATIONS.to_vec(),
            _ => vec![],
        }
    }

    async fn stop(&self) -> anyhow::Result<()> {
        self.db.store.close().await;
        tracing::info!(module = self.name(), "database module stopped");
        Ok(())
    }
}
