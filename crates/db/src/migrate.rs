//! Applies module migrations as MongoDB database commands.

use anyhow::Context;
use bookshelf_kernel::Migration;
use mongodb::bson::{doc, DateTime, Document};
use mongodb::Database;

/// Collection recording which migrations have already run.
pub const LEDGER_COLLECTION: &str = "_migrations";

/// Convert a migration's JSON command into a BSON command document.
/// Key order is kept; MongoDB reads the command name from the first key.
pub fn to_command(command: &serde_json::Value) -> anyhow::Result<Document> {
    mongodb::bson::to_document(command).with_context(|| "migration command must be a JSON object")
}

fn ledger_key(module: &str, migration: &Migration) -> String {
    format!("{}:{}", module, migration.id)
}

/// Run every migration not yet recorded in the ledger. Returns how many ran.
pub async fn run(database: &Database, migrations: &[(String, Migration)]) -> anyhow::Result<usize> {
    let ledger = database.collection::<Document>(LEDGER_COLLECTION);
    let mut applied = 0;

    for (module, migration) in migrations {
        let key = ledger_key(module, migration);
        let seen = ledger
            .find_one(doc! { "_id": key.as_str() })
            .await
            .with_context(|| format!("failed to read migration ledger for '{}'", key))?;
        if seen.is_some() {
            tracing::debug!(migration = %key, "migration already applied");
            continue;
        }

        let command = to_command(&migration.command)
            .with_context(|| format!("invalid migration '{}'", key))?;
        database
            .run_command(command)
            .await
            .with_context(|| format!("migration '{}' failed", key))?;
        ledger
            .insert_one(doc! {
                "_id": key.as_str(),
                "module": module.as_str(),
                "migration": migration.id,
                "appliedAt": DateTime::now(),
            })
            .await
            .with_context(|| format!("failed to record migration '{}'", key))?;

        tracing::info!(migration = %key, "migration applied");
        applied += 1;
    }

    Ok(applied)
}
