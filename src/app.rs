//! Application bootstrap: store selection, module registration, lifecycle.

use std::future::Future;
use std::sync::Arc;

use axum::Router;
use bookshelf_db::DbModule;
use bookshelf_kernel::settings::{DatabaseBackend, Settings};
use bookshelf_kernel::{InitCtx, ModuleRegistry};
use mongodb::Database;

use crate::modules;
use crate::modules::books::store::{BookStore, InMemoryBookStore, MongoBookStore};

/// A fully wired service: settings, registered modules, and the database
/// handle when running against MongoDB.
pub struct Application {
    settings: Settings,
    registry: ModuleRegistry,
    database: Option<Database>,
}

impl Application {
    /// Open the configured store and register every module. Does not contact
    /// the database; that happens during [`Application::init`].
    pub async fn build(settings: Settings) -> anyhow::Result<Self> {
        let mut registry = ModuleRegistry::new();

        let (store, database): (Arc<dyn BookStore>, Option<Database>) =
            match settings.database.backend {
                DatabaseBackend::Mongodb => {
                    let database = bookshelf_db::connect(&settings.database).await?;
                    registry.register_core(Arc::new(DbModule::new(database.clone())));
                    let store = MongoBookStore::new(&database, &settings.database.collection);
                    (Arc::new(store), Some(database))
                }
                DatabaseBackend::Memory => {
                    tracing::warn!("using the in-memory book store; data is lost on restart");
                    (Arc::new(InMemoryBookStore::new()), None)
                }
            };

        modules::register_all(&mut registry, store, &settings);

        Ok(Self {
            settings,
            registry,
            database,
        })
    }

    pub fn registry(&self) -> &ModuleRegistry {
        &self.registry
    }

    pub fn router(&self) -> Router {
        bookshelf_http::build_router(&self.registry, &self.settings)
    }

    pub async fn init(&self) -> anyhow::Result<()> {
        let ctx = InitCtx {
            settings: &self.settings,
        };
        self.registry.init_all(&ctx).await
    }

    /// Apply pending module migrations. A no-op for the in-memory backend.
    pub async fn migrate(&self) -> anyhow::Result<usize> {
        let Some(database) = &self.database else {
            tracing::info!("in-memory backend; skipping migrations");
            return Ok(0);
        };
        let migrations = self.registry.collect_migrations();
        let applied = bookshelf_db::migrate::run(database, &migrations).await?;
        tracing::info!(applied, total = migrations.len(), "migrations complete");
        Ok(applied)
    }

    /// Verify the configured store is reachable.
    pub async fn check(&self) -> anyhow::Result<()> {
        match &self.database {
            Some(database) => bookshelf_db::ping(database).await,
            None => Ok(()),
        }
    }

    /// Initialize, migrate, start modules, and serve HTTP until `shutdown`
    /// resolves. Modules are stopped even when the server fails.
    pub async fn serve<F>(self, shutdown: F) -> anyhow::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let ctx = InitCtx {
            settings: &self.settings,
        };

        self.registry.init_all(&ctx).await?;
        self.migrate().await?;
        self.registry.start_all(&ctx).await?;

        tracing::info!("bootstrap complete");

        let served =
            bookshelf_http::start_server(&self.registry, &self.settings, shutdown).await;
        let stopped = self.registry.stop_all().await;
        served.and(stopped)
    }
}
