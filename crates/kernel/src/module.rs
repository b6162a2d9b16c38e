use async_trait::async_trait;
use axum::Router;

/// Settings handed to each module while the service boots.
pub struct InitCtx<'a> {
    pub settings: &'a crate::settings::Settings,
}

/// Migration contributed by a module.
///
/// `command` is a database command document (for MongoDB, anything accepted
/// by `runCommand`, e.g. `createIndexes`). Key order is significant.
#[derive(Debug, Clone)]
pub struct Migration {
    pub id: &'static str,
    pub command: serde_json::Value,
}

/// A pluggable part of the service. The registry drives every module
/// through `init`, migrations, `start`, and finally `stop` on shutdown.
#[async_trait]
pub trait Module: Sync + Send {
    /// Registry key and URL segment, e.g. `books`.
    fn name(&self) -> &'static str;

    /// Check dependencies before anything is served. An error aborts
    /// startup; the db module uses this to ping MongoDB.
    async fn init(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        Ok(())
    }

    /// Routes nested under `/api/{name}`.
    fn routes(&self) -> Router {
        Router::new()
    }

    /// `paths` and `components` merged into `/docs/openapi.json`, with
    /// paths prefixed by `/api/{name}`.
    fn openapi(&self) -> Option<serde_json::Value> {
        None
    }

    /// Commands applied once per database, ordered by module name then id
    /// and recorded in the `_migrations` ledger.
    fn migrations(&self) -> Vec<Migration> {
        vec![]
    }

    /// Runs once migrations are applied, just before the listener binds.
    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        Ok(())
    }

    /// Runs after the server drains, in reverse registration order.
    async fn stop(&self) -> anyhow::Result<()> {
        Ok(())
    }
}
