//! MongoDB client factory, store errors, and migration tooling.

use anyhow::Context;
use async_trait::async_trait;
use bookshelf_kernel::settings::DatabaseSettings;
use bookshelf_kernel::{InitCtx, Module};
use mongodb::bson::doc;
use mongodb::options::ClientOptions;
use mongodb::{Client, Database};

pub mod error;
pub mod migrate;

pub use error::{parse_object_id, StoreError};

/// Build a client from the configured connection string and select the database.
///
/// The driver connects lazily; use [`ping`] to verify reachability.
pub async fn connect(settings: &DatabaseSettings) -> anyhow::Result<Database> {
    let mut options = ClientOptions::parse(settings.uri.as_str())
        .await
        .with_context(|| "invalid MongoDB connection string")?;
    options.app_name = Some(settings.app_name.clone());

    let client = Client::with_options(options).with_context(|| "failed to build MongoDB client")?;

    tracing::info!(
        target: "bookshelf-db",
        database = %settings.name,
        "MongoDB client created"
    );

    Ok(client.database(&settings.name))
}

/// Round-trip a `ping` command to the server.
pub async fn ping(database: &Database) -> anyhow::Result<()> {
    database
        .run_command(doc! { "ping": 1 })
        .await
        .with_context(|| format!("failed to reach MongoDB database '{}'", database.name()))?;
    Ok(())
}

/// Core module owning the shared database handle.
pub struct DbModule {
    database: Database,
}

impl DbModule {
    pub fn new(database: Database) -> Self {
        Self { database }
    }
}

#[async_trait]
impl Module for DbModule {
    fn name(&self) -> &'static str {
        "db"
    }

    async fn init(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        ping(&self.database).await?;
        tracing::info!(
            module = self.name(),
            database = %self.database.name(),
            "connected to MongoDB"
        );
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "database module stopped");
        Ok(())
    }
}
