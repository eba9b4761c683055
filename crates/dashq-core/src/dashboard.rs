//! Read-only dashboard inspection
//!
//! A dashboard row carries a JSON document whose `panels` array lists the
//! visualisations on it. Collapsed rows nest their own `panels` array one
//! level down. Nothing here mutates a dashboard.

use crate::errors::{DashqError, ExError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A dashboard row as stored
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub id: i64,
    pub org_id: i64,
    pub uid: String,
    pub title: String,
    /// Raw document text; `None` only when the row is corrupt
    pub data: Option<String>,
}

impl Dashboard {
    /// Parse the document carried by this row
    ///
    /// ## Errors
    ///
    /// - `DashboardCorrupt`: the document is absent, JSON `null`, or not JSON
    pub fn document(&self) -> Result<DashboardDocument> {
        match self.data.as_deref() {
            None => Err(DashqError::DashboardCorrupt {
                dashboard_uid: self.uid.clone(),
                reason: "dashboard data is missing".to_string(),
            }),
            Some(text) => DashboardDocument::parse(&self.uid, text),
        }
    }
}

/// Parsed dashboard document
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardDocument(Value);

impl DashboardDocument {
    pub fn parse(dashboard_uid: &str, text: &str) -> Result<Self> {
        let value: Value =
            serde_json::from_str(text).map_err(|e| DashqError::DashboardCorrupt {
                dashboard_uid: dashboard_uid.to_string(),
                reason: format!("dashboard data is not valid JSON: {}", e),
            })?;
        if value.is_null() {
            return Err(DashqError::DashboardCorrupt {
                dashboard_uid: dashboard_uid.to_string(),
                reason: "dashboard data is null".to_string(),
            });
        }
        Ok(Self(value))
    }

    pub fn from_value(value: Value) -> Self {
        Self(value)
    }

    /// Ids of every panel, including those nested in collapsed rows
    ///
    /// Panels without an integral `id` are skipped. A document without a
    /// `panels` array has no panels.
    pub fn panel_ids(&self) -> Vec<i64> {
        let mut ids = Vec::new();
        for panel in panels_of(&self.0) {
            if let Some(id) = panel_id(panel) {
                ids.push(id);
            }
            for nested in panels_of(panel) {
                if let Some(id) = panel_id(nested) {
                    ids.push(id);
                }
            }
        }
        ids
    }

    pub fn has_panel(&self, id: i64) -> bool {
        self.panel_ids().contains(&id)
    }
}

fn panels_of(value: &Value) -> &[Value] {
    value
        .get("panels")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

fn panel_id(panel: &Value) -> Option<i64> {
    let id = panel.get("id")?;
    id.as_i64().or_else(|| {
        id.as_f64()
            .filter(|f| f.fract() == 0.0)
            .map(|f| f as i64)
    })
}

/// Reject identifiers that can never name a panel, before any lookup
pub fn validate_panel_identifiers(org_id: i64, dashboard_uid: &str, panel_id: i64) -> Result<()> {
    if org_id <= 0 || dashboard_uid.is_empty() || panel_id <= 0 {
        return Err(DashqError::DashboardOrPanelIdentifierNotSet {
            org_id,
            dashboard_uid: dashboard_uid.to_string(),
            panel_id,
        });
    }
    Ok(())
}

/// Check that `panel_id` appears in the dashboard's document
///
/// ## Errors
///
/// - `DashboardCorrupt`: the row carries no usable document
/// - `DashboardPanelNotFound`: no panel with this id
pub fn ensure_panel(dashboard: &Dashboard, panel_id: i64) -> Result<()> {
    let document = dashboard.document()?;
    if !document.has_panel(panel_id) {
        return Err(DashqError::DashboardPanelNotFound {
            dashboard_uid: dashboard.uid.clone(),
            panel_id,
        });
    }
    Ok(())
}

/// Fetches dashboards by `(org_id, uid)`
///
/// Implementations report a missing row as `ExErrorKind::DashboardNotFound`
/// and store failures as infrastructure kinds.
#[allow(clippy::result_large_err)]
pub trait DashboardSource: Send + Sync {
    fn get_dashboard(&self, org_id: i64, uid: &str) -> std::result::Result<Dashboard, ExError>;
}
