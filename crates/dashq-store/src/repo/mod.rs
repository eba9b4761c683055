//! Row-level repositories
//!
//! Functions here take a borrowed `Connection` and never open their own
//! transaction.

mod dashboard_repo;
mod query_history_repo;

pub use dashboard_repo::DashboardRepo;
pub use query_history_repo::QueryHistoryRepo;
