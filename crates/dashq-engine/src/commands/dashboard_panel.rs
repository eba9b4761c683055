//! Dashboard panel validation ahead of panel-scoped queries
//!
//! ## Check order
//! 1. Identifier sanity (no store access)
//! 2. Dashboard fetch; `DashboardNotFound` propagates unchanged
//! 3. Document presence (`DashboardCorrupt` otherwise)
//! 4. Panel id lookup (`DashboardPanelNotFound` otherwise)

#![allow(clippy::result_large_err)]

use dashq_core::dashboard::{ensure_panel, validate_panel_identifiers, DashboardSource};
use dashq_core::model::SignedInUser;
use dashq_core::query_engine::{MetricsRequest, QueryEngine};
use dashq_store::errors::Result;
use serde_json::Value;
use std::time::Instant;

/// Confirm that `panel_id` exists on dashboard `dashboard_uid` in `org_id`
///
/// Performs at most one read through `source` and never writes.
///
/// ## Errors
///
/// - `DashboardOrPanelIdentifierNotSet`: org id or panel id not positive, or
///   empty dashboard uid
/// - `DashboardNotFound`: no such dashboard in the org
/// - `DashboardCorrupt`: the dashboard carries no usable document
/// - `DashboardPanelNotFound`: the document has no panel with this id
pub fn check_dashboard_and_panel(
    source: &dyn DashboardSource,
    org_id: i64,
    dashboard_uid: &str,
    panel_id: i64,
) -> Result<()> {
    let start = Instant::now();
    dashq_core::log_op_start!(
        "check_dashboard_and_panel",
        org_id = org_id,
        dashboard_uid = dashboard_uid,
        panel_id = panel_id
    );

    match check_impl(source, org_id, dashboard_uid, panel_id) {
        Ok(()) => {
            let duration_ms = start.elapsed().as_millis() as u64;
            dashq_core::log_op_end!(
                "check_dashboard_and_panel",
                duration_ms = duration_ms,
                dashboard_uid = dashboard_uid,
                panel_id = panel_id
            );
            Ok(())
        }
        Err(e) => {
            let duration_ms = start.elapsed().as_millis() as u64;
            dashq_core::log_op_error!(
                "check_dashboard_and_panel",
                e.clone(),
                duration_ms = duration_ms,
                dashboard_uid = dashboard_uid,
                panel_id = panel_id
            );
            Err(e)
        }
    }
}

fn check_impl(
    source: &dyn DashboardSource,
    org_id: i64,
    dashboard_uid: &str,
    panel_id: i64,
) -> Result<()> {
    validate_panel_identifiers(org_id, dashboard_uid, panel_id)?;
    let dashboard = source.get_dashboard(org_id, dashboard_uid)?;
    ensure_panel(&dashboard, panel_id)?;
    Ok(())
}

/// Run a panel-scoped query once the panel check passes
///
/// The engine is not called at all when the check fails.
pub fn query_dashboard_panel(
    source: &dyn DashboardSource,
    engine: &dyn QueryEngine,
    user: &SignedInUser,
    dashboard_uid: &str,
    panel_id: i64,
    request: &MetricsRequest,
) -> Result<Value> {
    check_dashboard_and_panel(source, user.org_id, dashboard_uid, panel_id)?;

    let start = Instant::now();
    dashq_core::log_op_start!(
        "query_dashboard_panel",
        dashboard_uid = dashboard_uid,
        panel_id = panel_id,
        query_count = request.queries.len()
    );

    match engine.query_data(user, request) {
        Ok(response) => {
            let duration_ms = start.elapsed().as_millis() as u64;
            dashq_core::log_op_end!("query_dashboard_panel", duration_ms = duration_ms);
            Ok(response)
        }
        Err(e) => {
            let duration_ms = start.elapsed().as_millis() as u64;
            dashq_core::log_op_error!(
                "query_dashboard_panel",
                e.clone(),
                duration_ms = duration_ms
            );
            Err(e)
        }
    }
}
