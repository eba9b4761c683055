//! Data-source query engine interface
//!
//! The engine itself lives outside this workspace; panel-scoped queries are
//! only handed to it after the dashboard panel check passes.

use crate::errors::ExError;
use crate::model::SignedInUser;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Ad-hoc metrics query as submitted by a panel
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MetricsRequest {
    pub from: String,
    pub to: String,
    pub queries: Vec<Value>,
    pub debug: bool,
}

/// Executes a validated query request against data sources
#[allow(clippy::result_large_err)]
pub trait QueryEngine: Send + Sync {
    /// ## Errors
    ///
    /// Implementations report data-source failures as
    /// `ExErrorKind::ExternalService`.
    fn query_data(&self, user: &SignedInUser, request: &MetricsRequest) -> Result<Value, ExError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_from_panel_payload() {
        let req: MetricsRequest = serde_json::from_value(json!({
            "from": "",
            "to": "",
            "queries": [{
                "datasource": {"type": "datasource", "uid": "grafana"},
                "queryType": "randomWalk",
                "refId": "A"
            }]
        }))
        .unwrap();
        assert_eq!(req.queries.len(), 1);
        assert_eq!(req.queries[0]["refId"], "A");
        assert!(!req.debug);
    }
}
