//! dashq Core - domain kernel for query history and panel query validation
//!
//! This crate provides:
//! - The structured error facility shared by every layer
//! - The logging facility (initialisation, boundary macros, test capture)
//! - Query history entities, DTO projection, commands and search filters
//! - Read-only dashboard document inspection and the panel lookup
//! - Collaborator traits for dashboard fetching and query execution

pub mod dashboard;
pub mod errors;
pub mod logging_facility;
pub mod model;
pub mod query_engine;
pub mod uid;

// Re-export commonly used types
pub use dashboard::{
    ensure_panel, validate_panel_identifiers, Dashboard, DashboardDocument, DashboardSource,
};
pub use errors::{DashqError, ExError, ExErrorKind, Result};
pub use model::{
    CreateQueryCommand, PatchQueryCommentCommand, QueryHistory, QueryHistoryDto,
    QueryHistoryStar, SearchFilter, SignedInUser, Sort,
};
pub use query_engine::{MetricsRequest, QueryEngine};
