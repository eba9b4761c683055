//! Command orchestration layer.
//!
//! One module per area; each public function is a complete operation.

pub mod dashboard_panel;
pub mod query_history;
