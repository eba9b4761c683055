//! dashq Engine - Operation boundary
//!
//! Coordinates the core domain rules with the store gateway. Every public
//! operation owns its lifecycle logging and its transactional scope.

pub mod commands;

pub use commands::dashboard_panel::{check_dashboard_and_panel, query_dashboard_panel};
pub use commands::query_history::{
    create_query, delete_query, patch_query_comment, search_queries, star_query, unstar_query,
};
