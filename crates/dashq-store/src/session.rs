//! Scoped sessions and transactions over one SQLite connection
//!
//! `SqlStore` is the only path to the database. Every multi-step mutation
//! runs inside `with_transaction`, which commits when the closure returns
//! `Ok` and rolls back on `Err` or unwind. Read-only work uses
//! `with_session`.

use crate::config::StoreConfig;
use crate::db;
use crate::dialect::{Dialect, SqliteDialect};
use crate::errors::{from_rusqlite, Result};
use crate::migrations::apply_migrations;
use rusqlite::{Connection, Transaction, TransactionBehavior};
use std::sync::{Mutex, MutexGuard, PoisonError};

pub struct SqlStore {
    conn: Mutex<Connection>,
    dialect: Box<dyn Dialect>,
    config: StoreConfig,
}

impl SqlStore {
    /// Open, configure and migrate the database named by `config`
    pub fn open(config: StoreConfig) -> Result<Self> {
        let mut conn = db::open(&config.db_path)?;
        db::configure(&conn, &config)?;
        let applied = apply_migrations(&mut conn)?;
        let store = Self::from_parts(conn, Box::new(SqliteDialect), config);
        tracing::debug!(
            db_path = %store.config.db_path.display(),
            dialect = store.dialect().name(),
            applied = applied.len(),
            "Opened store"
        );
        Ok(store)
    }

    /// Migrated in-memory store
    pub fn open_in_memory() -> Result<Self> {
        let mut conn = db::open_in_memory()?;
        let config = StoreConfig {
            wal: false,
            ..StoreConfig::default()
        };
        db::configure(&conn, &config)?;
        apply_migrations(&mut conn)?;
        Ok(Self::from_parts(conn, Box::new(SqliteDialect), config))
    }

    /// Wrap an already configured and migrated connection
    pub fn from_parts(conn: Connection, dialect: Box<dyn Dialect>, config: StoreConfig) -> Self {
        Self {
            conn: Mutex::new(conn),
            dialect,
            config,
        }
    }

    pub fn dialect(&self) -> &dyn Dialect {
        self.dialect.as_ref()
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Run `f` against a plain session
    pub fn with_session<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T>,
    {
        let conn = self.lock();
        f(&conn)
    }

    /// Run `f` inside one transaction
    ///
    /// The transaction takes the write lock up front (`BEGIN IMMEDIATE`) so
    /// concurrent writers queue on the busy timeout instead of failing on
    /// lock upgrade. Dropping the guard without commit rolls back, which
    /// covers early returns and panics inside `f`.
    pub fn with_transaction<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Transaction<'_>) -> Result<T>,
    {
        let mut conn = self.lock();
        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(from_rusqlite)?;

        match f(&tx) {
            Ok(value) => {
                tx.commit().map_err(from_rusqlite)?;
                Ok(value)
            }
            Err(err) => {
                if let Err(rollback_err) = tx.rollback() {
                    tracing::warn!(error = %rollback_err, "Rollback failed");
                }
                Err(err)
            }
        }
    }

    // A panic inside a closure poisons the mutex, but the open transaction
    // was already rolled back when its guard dropped during unwind, so the
    // connection itself is still consistent.
    fn lock(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(|poisoned: PoisonError<_>| {
            tracing::warn!("Recovering store connection after a panicked operation");
            poisoned.into_inner()
        })
    }
}

/// Run a step whose failure must not abort the surrounding operation
///
/// The error is logged at `warn` and dropped.
pub fn advisory<T>(step: &str, result: Result<T>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(err) => {
            tracing::warn!(step, error = %err, err_code = err.code(), "Advisory step failed; continuing");
            None
        }
    }
}
