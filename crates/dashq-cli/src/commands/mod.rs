//! CLI subcommands

pub mod history;
pub mod panel;

use dashq_core::errors::{ExError, ExErrorKind};
use dashq_store::migrations::applied_migrations;
use dashq_store::{SqlStore, StoreConfig};
use serde::Serialize;
use std::path::Path;

pub type CliResult = Result<(), ExError>;

/// Resolve the store configuration and open the store
///
/// Precedence: `--db` over the config file's `db_path` over the default.
pub fn open_store(config: Option<&Path>, db: Option<&Path>) -> Result<SqlStore, ExError> {
    let mut store_config = match config {
        Some(path) => StoreConfig::load(path)?,
        None => StoreConfig::default(),
    };
    if let Some(db) = db {
        store_config = store_config.with_db_path(db);
    }
    store_config.validate()?;
    SqlStore::open(store_config)
}

/// Report the schema state; opening the store already applied pending migrations
pub fn migrate(store: &SqlStore) -> CliResult {
    let applied = store.with_session(applied_migrations)?;
    let ids: Vec<&str> = applied.iter().map(|m| m.migration_id.as_str()).collect();
    print_json(&serde_json::json!({
        "dbPath": store.config().db_path.display().to_string(),
        "migrated": true,
        "migrations": ids,
    }))
}

pub fn print_json<T: Serialize>(value: &T) -> CliResult {
    let text = serde_json::to_string_pretty(value).map_err(|e| {
        ExError::new(ExErrorKind::Serialization)
            .with_op("print_json")
            .with_message(e.to_string())
    })?;
    println!("{}", text);
    Ok(())
}
