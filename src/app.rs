use std::future::Future;

use anyhow::Context;
use axum::Router;
use bookstore_db::Database;
use bookstore_kernel::{settings::Settings, InitCtx, ModuleRegistry};
use tokio::net::TcpListener;

use crate::modules;

/// A fully started application: store connected, migrations applied,
/// modules running. Dropping it without [`App::shutdown`] leaves the store
/// open.
pub struct App {
    settings: Settings,
    db: Database,
    registry: ModuleRegistry,
}

impl App {
    /// Connect to the configured store and bring every module up.
    pub async fn bootstrap(settings: Settings) -> anyhow::Result<Self> {
        let db = Database::connect(&settings.database)
            .await
            .context("failed to connect to the document store")?;
        Self::with_database(settings, db).await
    }

    /// Bring every module up on an existing store handle.
    pub async fn with_database(settings: Settings, db: Database) -> anyhow::Result<Self> {
        let mut registry = ModuleRegistry::new();
        registry.register_core(db.module());
        modules::register_all(&mut registry, &db);

        {
            let ctx = InitCtx {
                settings: &settings,
            };
            registry.init_core_modules(&ctx).await?;
            registry.init_custom_modules(&ctx).await?;

            let applied = db
                .migrate(&registry.collect_migrations())
                .await
                .context("failed to apply migrations")?;
            tracing::info!(applied, "migrations complete");

            registry.start_core_modules(&ctx).await?;
            registry.start_custom_modules(&ctx).await?;
        }

        Ok(Self {
            settings,
            db,
            registry,
        })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    pub fn router(&self) -> Router {
        bookstore_http::build_router(&self.registry, &self.settings)
    }

    /// Serve on the configured address until `shutdown` resolves, then stop
    /// every module.
    pub async fn serve<F>(self, shutdown: F) -> anyhow::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let served = bookstore_http::start_server(&self.registry, &self.settings, shutdown).await;
        let stopped = self.shutdown().await;
        served.and(stopped)
    }

    /// Serve on an already bound listener, then stop every module.
    pub async fn serve_on<F>(self, listener: TcpListener, shutdown: F) -> anyhow::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let served = bookstore_http::serve(listener, self.router(), shutdown).await;
        let stopped = self.shutdown().await;
        served.and(stopped)
    }

    /// Stop custom modules, then core modules (which closes the store).
    /// Core modules are stopped even when a custom module fails to stop.
    pub async fn shutdown(&self) -> anyhow::Result<()> {
        let custom = self.registry.stop_custom_modules().await;
        if let Err(err) = &custom {
            tracing::error!(error = %err, "custom modules did not stop cleanly");
        }
        let core = self.registry.stop_core_modules().await;
        custom.and(core)
    }
}

/// Resolves on Ctrl-C, or SIGTERM on unix.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bookstore_kernel::Module;
    use std::sync::Arc;

    struct StuckModule;

    #[async_trait]
    impl Module for StuckModule {
        fn name(&self) -> &'static str {
            "stuck"
        }

        async fn stop(&self) -> anyhow::Result<()> {
            anyhow::bail!("worker did not drain")
        }
    }

    #[tokio::test]
    async fn store_closes_even_when_a_custom_module_fails_to_stop() {
        let db = Database::in_memory();
        let mut registry = ModuleRegistry::new();
        registry.register_core(db.module());
        registry.register_custom(Arc::new(StuckModule));

        let app = App {
            settings: Settings::default(),
            db: db.clone(),
            registry,
        };

        let err = app.shutdown().await.unwrap_err();
        assert!(format!("{err:#}").contains("worker did not drain"));
        assert!(db.store().ping().await.is_err());
    }
}
