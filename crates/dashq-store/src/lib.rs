//! dashq Store - SQLite store gateway
//!
//! Provides:
//! - Connection management and embedded, checksummed migrations
//! - `SqlStore`: scoped sessions and transactions with guaranteed
//!   commit-or-rollback
//! - The SQL dialect seam (boolean literals, pattern matching, unique
//!   constraint classification)
//! - A parameterized search query builder
//! - Row-level repositories for query history, stars and dashboards

pub mod config;
pub mod db;
pub mod dialect;
pub mod errors;
pub mod migrations;
pub mod repo;
pub mod search;
pub mod session;

// Re-export key types
pub use config::StoreConfig;
pub use dialect::{Dialect, SqliteDialect};
pub use errors::Result;
pub use repo::{DashboardRepo, QueryHistoryRepo};
pub use session::{advisory, SqlStore};
