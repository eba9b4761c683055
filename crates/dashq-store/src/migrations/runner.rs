//! Migration runner
//!
//! Each embedded migration runs at most once, in its own transaction, and
//! is recorded in `schema_version` with the SHA-256 of its SQL. Re-running
//! verifies recorded checksums before touching anything else.

use crate::errors::{checksum_mismatch, from_rusqlite, migration_error, Result};
use crate::migrations::checksums::compute_checksum;
use crate::migrations::embedded::{get_migrations, Migration};
use rusqlite::{Connection, OptionalExtension};

/// A row of `schema_version`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedMigration {
    pub migration_id: String,
    pub applied_at: i64,
}

/// Apply all pending migrations; returns the ids applied by this call
///
/// ## Errors
///
/// - `Persistence`: a migration failed, or an applied migration's recorded
///   checksum no longer matches the embedded SQL
pub fn apply_migrations(conn: &mut Connection) -> Result<Vec<&'static str>> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_version (
            id INTEGER PRIMARY KEY,
            migration_id TEXT NOT NULL UNIQUE,
            applied_at INTEGER NOT NULL,
            checksum TEXT
        )",
    )
    .map_err(from_rusqlite)?;

    let migrations = get_migrations();
    let mut pending = Vec::new();
    for migration in &migrations {
        if !is_recorded(conn, migration)? {
            pending.push(migration);
        }
    }

    let mut applied = Vec::with_capacity(pending.len());
    for migration in pending {
        apply_one(conn, migration)?;
        applied.push(migration.id);
    }
    Ok(applied)
}

/// Migrations recorded in `schema_version`, oldest first
pub fn applied_migrations(conn: &Connection) -> Result<Vec<AppliedMigration>> {
    let mut stmt = conn
        .prepare("SELECT migration_id, applied_at FROM schema_version ORDER BY id")
        .map_err(from_rusqlite)?;
    let rows = stmt
        .query_map([], |row| {
            Ok(AppliedMigration {
                migration_id: row.get(0)?,
                applied_at: row.get(1)?,
            })
        })
        .map_err(from_rusqlite)?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(from_rusqlite)?;
    Ok(rows)
}

// True when already applied with matching SQL; a checksum mismatch is an error.
fn is_recorded(conn: &Connection, migration: &Migration) -> Result<bool> {
    let recorded: Option<Option<String>> = conn
        .query_row(
            "SELECT checksum FROM schema_version WHERE migration_id = ?1",
            [migration.id],
            |row| row.get(0),
        )
        .optional()
        .map_err(from_rusqlite)?;

    let expected = compute_checksum(migration.sql);
    match recorded {
        None => Ok(false),
        Some(Some(existing)) if existing != expected => {
            Err(checksum_mismatch(migration.id, &existing, &expected))
        }
        Some(_) => Ok(true),
    }
}

fn apply_one(conn: &mut Connection, migration: &Migration) -> Result<()> {
    let tx = conn.transaction().map_err(from_rusqlite)?;
    tx.execute_batch(migration.sql)
        .map_err(|e| migration_error(migration.id, &e.to_string()))?;
    tx.execute(
        "INSERT INTO schema_version (migration_id, applied_at, checksum) VALUES (?1, ?2, ?3)",
        rusqlite::params![
            migration.id,
            chrono::Utc::now().timestamp(),
            compute_checksum(migration.sql)
        ],
    )
    .map_err(from_rusqlite)?;
    tx.commit().map_err(from_rusqlite)?;

    tracing::debug!(migration_id = migration.id, "Applied migration");
    Ok(())
}
