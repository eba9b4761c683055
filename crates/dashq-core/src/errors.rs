use dashq_core_types::{RequestId, TraceId};
use thiserror::Error;

/// Result type alias using DashqError
pub type Result<T> = std::result::Result<T, DashqError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Each kind maps to a stable error code and to the HTTP status the
/// surrounding API layer answers with. Semantic kinds are never retried;
/// infrastructure kinds are opaque to this crate and surface as 5xx.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExErrorKind {
    // Query history
    InvalidArgument,
    QueryNotFound,
    QueryAlreadyStarred,
    StarredQueryNotFound,

    // Dashboard panel validation
    DashboardOrPanelIdentifierNotSet,
    DashboardNotFound,
    DashboardCorrupt,
    DashboardPanelNotFound,

    // Infrastructure
    Persistence,
    Serialization,
    Io,
    Config,
    ExternalService,

    // Internal
    Internal,
}

impl ExErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::InvalidArgument => "ERR_INVALID_ARGUMENT",
            ExErrorKind::QueryNotFound => "ERR_QUERY_NOT_FOUND",
            ExErrorKind::QueryAlreadyStarred => "ERR_QUERY_ALREADY_STARRED",
            ExErrorKind::StarredQueryNotFound => "ERR_STARRED_QUERY_NOT_FOUND",
            ExErrorKind::DashboardOrPanelIdentifierNotSet => {
                "ERR_DASHBOARD_OR_PANEL_IDENTIFIER_NOT_SET"
            }
            ExErrorKind::DashboardNotFound => "ERR_DASHBOARD_NOT_FOUND",
            ExErrorKind::DashboardCorrupt => "ERR_DASHBOARD_CORRUPT",
            ExErrorKind::DashboardPanelNotFound => "ERR_DASHBOARD_PANEL_NOT_FOUND",
            ExErrorKind::Persistence => "ERR_PERSISTENCE",
            ExErrorKind::Serialization => "ERR_SERIALIZATION",
            ExErrorKind::Io => "ERR_IO",
            ExErrorKind::Config => "ERR_CONFIG",
            ExErrorKind::ExternalService => "ERR_EXTERNAL_SERVICE",
            ExErrorKind::Internal => "ERR_INTERNAL",
        }
    }

    /// True for failures of the store, filesystem or other collaborators
    pub fn is_infrastructure(&self) -> bool {
        matches!(
            self,
            ExErrorKind::Persistence
                | ExErrorKind::Serialization
                | ExErrorKind::Io
                | ExErrorKind::Config
                | ExErrorKind::ExternalService
                | ExErrorKind::Internal
        )
    }

    /// HTTP status an API layer should answer with for this kind
    pub fn http_status(&self) -> u16 {
        match self {
            ExErrorKind::InvalidArgument
            | ExErrorKind::QueryAlreadyStarred
            | ExErrorKind::DashboardOrPanelIdentifierNotSet
            | ExErrorKind::DashboardCorrupt => 400,
            ExErrorKind::QueryNotFound
            | ExErrorKind::StarredQueryNotFound
            | ExErrorKind::DashboardNotFound
            | ExErrorKind::DashboardPanelNotFound => 404,
            ExErrorKind::ExternalService => 502,
            ExErrorKind::Persistence
            | ExErrorKind::Serialization
            | ExErrorKind::Io
            | ExErrorKind::Config
            | ExErrorKind::Internal => 500,
        }
    }
}

/// Canonical structured error type
///
/// Carries the classification used for programmatic handling plus the
/// context (operation, entity, correlation ids) needed when debugging.
#[derive(Debug, Clone)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    entity_id: Option<String>,
    request_id: Option<RequestId>,
    trace_id: Option<TraceId>,
    message: String,
    source: Option<Box<ExError>>,
}

impl ExError {
    /// Create a new error with the specified kind
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            entity_id: None,
            request_id: None,
            trace_id: None,
            message: String::new(),
            source: None,
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add entity ID context (query uid, dashboard uid, ...)
    pub fn with_entity_id(mut self, id: impl Into<String>) -> Self {
        self.entity_id = Some(id.into());
        self
    }

    pub fn with_request_id(mut self, request_id: RequestId) -> Self {
        self.request_id = Some(request_id);
        self
    }

    pub fn with_trace_id(mut self, trace_id: TraceId) -> Self {
        self.trace_id = Some(trace_id);
        self
    }

    /// Add custom message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Add source error
    pub fn with_source(mut self, source: ExError) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    pub fn kind(&self) -> ExErrorKind {
        self.kind
    }

    /// Get the stable error code
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    pub fn entity_id(&self) -> Option<&str> {
        self.entity_id.as_deref()
    }

    pub fn request_id(&self) -> Option<&RequestId> {
        self.request_id.as_ref()
    }

    pub fn trace_id(&self) -> Option<&TraceId> {
        self.trace_id.as_ref()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn source_error(&self) -> Option<&ExError> {
        self.source.as_deref()
    }

    /// Shorthand for `self.kind() == kind`
    pub fn is(&self, kind: ExErrorKind) -> bool {
        self.kind == kind
    }
}

impl std::fmt::Display for ExError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.code())?;
        if let Some(op) = &self.op {
            write!(f, " in operation '{}'", op)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(entity_id) = &self.entity_id {
            write!(f, " (entity_id: {})", entity_id)?;
        }
        if let Some(request_id) = &self.request_id {
            write!(f, " (request_id: {})", request_id)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

// ========== End Error Facility ==========

/// Domain error taxonomy for query history and panel validation
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DashqError {
    // ===== Query history =====
    /// A required search field was not supplied
    #[error("Invalid argument: {reason}")]
    InvalidArgument { reason: String },

    /// No query with this uid exists for the caller's org and user
    #[error("Query not found in query history: {query_uid}")]
    QueryNotFound { query_uid: String },

    /// The caller already starred this query
    #[error("Query already starred: {query_uid}")]
    QueryAlreadyStarred { query_uid: String },

    /// The caller has no star on this query
    #[error("Starred query not found: {query_uid}")]
    StarredQueryNotFound { query_uid: String },

    // ===== Dashboard panel validation =====
    #[error("Dashboard or panel identifier is not set (org_id={org_id}, dashboard_uid={dashboard_uid:?}, panel_id={panel_id})")]
    DashboardOrPanelIdentifierNotSet {
        org_id: i64,
        dashboard_uid: String,
        panel_id: i64,
    },

    #[error("Dashboard not found: {dashboard_uid}")]
    DashboardNotFound { dashboard_uid: String },

    /// The dashboard row exists but carries no usable document
    #[error("Dashboard data is missing or corrupt: {dashboard_uid}: {reason}")]
    DashboardCorrupt {
        dashboard_uid: String,
        reason: String,
    },

    #[error("Panel {panel_id} not found in dashboard {dashboard_uid}")]
    DashboardPanelNotFound {
        dashboard_uid: String,
        panel_id: i64,
    },

    // ===== Infrastructure =====
    #[error("Serialization failed: {reason}")]
    Serialization { reason: String },
}

impl From<DashqError> for ExError {
    fn from(err: DashqError) -> Self {
        let message = err.to_string();
        match err {
            DashqError::InvalidArgument { .. } => {
                ExError::new(ExErrorKind::InvalidArgument).with_message(message)
            }
            DashqError::QueryNotFound { query_uid } => ExError::new(ExErrorKind::QueryNotFound)
                .with_entity_id(query_uid)
                .with_message(message),
            DashqError::QueryAlreadyStarred { query_uid } => {
                ExError::new(ExErrorKind::QueryAlreadyStarred)
                    .with_entity_id(query_uid)
                    .with_message(message)
            }
            DashqError::StarredQueryNotFound { query_uid } => {
                ExError::new(ExErrorKind::StarredQueryNotFound)
                    .with_entity_id(query_uid)
                    .with_message(message)
            }
            DashqError::DashboardOrPanelIdentifierNotSet { dashboard_uid, .. } => {
                ExError::new(ExErrorKind::DashboardOrPanelIdentifierNotSet)
                    .with_entity_id(dashboard_uid)
                    .with_message(message)
            }
            DashqError::DashboardNotFound { dashboard_uid } => {
                ExError::new(ExErrorKind::DashboardNotFound)
                    .with_entity_id(dashboard_uid)
                    .with_message(message)
            }
            DashqError::DashboardCorrupt { dashboard_uid, .. } => {
                ExError::new(ExErrorKind::DashboardCorrupt)
                    .with_entity_id(dashboard_uid)
                    .with_message(message)
            }
            DashqError::DashboardPanelNotFound { dashboard_uid, .. } => {
                ExError::new(ExErrorKind::DashboardPanelNotFound)
                    .with_entity_id(dashboard_uid)
                    .with_message(message)
            }
            DashqError::Serialization { .. } => {
                ExError::new(ExErrorKind::Serialization).with_message(message)
            }
        }
    }
}

impl From<serde_json::Error> for DashqError {
    fn from(err: serde_json::Error) -> Self {
        DashqError::Serialization {
            reason: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_errors_map_to_kinds() {
        let cases = vec![
            (
                DashqError::InvalidArgument {
                    reason: "no datasource".to_string(),
                },
                ExErrorKind::InvalidArgument,
            ),
            (
                DashqError::QueryNotFound {
                    query_uid: "q1".to_string(),
                },
                ExErrorKind::QueryNotFound,
            ),
            (
                DashqError::QueryAlreadyStarred {
                    query_uid: "q1".to_string(),
                },
                ExErrorKind::QueryAlreadyStarred,
            ),
            (
                DashqError::StarredQueryNotFound {
                    query_uid: "q1".to_string(),
                },
                ExErrorKind::StarredQueryNotFound,
            ),
            (
                DashqError::DashboardOrPanelIdentifierNotSet {
                    org_id: 1,
                    dashboard_uid: String::new(),
                    panel_id: 0,
                },
                ExErrorKind::DashboardOrPanelIdentifierNotSet,
            ),
            (
                DashqError::DashboardNotFound {
                    dashboard_uid: "d".to_string(),
                },
                ExErrorKind::DashboardNotFound,
            ),
            (
                DashqError::DashboardCorrupt {
                    dashboard_uid: "d".to_string(),
                    reason: "data is null".to_string(),
                },
                ExErrorKind::DashboardCorrupt,
            ),
            (
                DashqError::DashboardPanelNotFound {
                    dashboard_uid: "d".to_string(),
                    panel_id: 3,
                },
                ExErrorKind::DashboardPanelNotFound,
            ),
        ];

        for (err, kind) in cases {
            let ex: ExError = err.into();
            assert_eq!(ex.kind(), kind);
            assert!(!ex.kind().is_infrastructure());
            assert!((400..500).contains(&ex.kind().http_status()));
        }
    }

    #[test]
    fn test_infrastructure_kinds_are_5xx() {
        for kind in [
            ExErrorKind::Persistence,
            ExErrorKind::Serialization,
            ExErrorKind::Io,
            ExErrorKind::Config,
            ExErrorKind::ExternalService,
            ExErrorKind::Internal,
        ] {
            assert!(kind.is_infrastructure());
            assert!(kind.http_status() >= 500);
        }
    }

    #[test]
    fn test_entity_id_carried_through_conversion() {
        let ex: ExError = DashqError::QueryNotFound {
            query_uid: "abc".to_string(),
        }
        .into();
        assert_eq!(ex.entity_id(), Some("abc"));
        assert_eq!(ex.code(), "ERR_QUERY_NOT_FOUND");
    }

    #[test]
    fn test_display_includes_code_op_and_request_id() {
        let request_id = RequestId::from_string("req-1".to_string());
        let ex = ExError::new(ExErrorKind::Persistence)
            .with_op("sqlite")
            .with_message("disk I/O error")
            .with_request_id(request_id);
        let text = ex.to_string();
        assert!(text.starts_with("[ERR_PERSISTENCE]"));
        assert!(text.contains("in operation 'sqlite'"));
        assert!(text.contains("disk I/O error"));
        assert!(text.contains("req-1"));
    }

    #[test]
    fn test_source_chain() {
        use std::error::Error as _;
        let inner = ExError::new(ExErrorKind::Persistence).with_message("locked");
        let outer = ExError::new(ExErrorKind::Internal).with_source(inner);
        assert_eq!(
            outer.source_error().map(|e| e.kind()),
            Some(ExErrorKind::Persistence)
        );
        assert!(outer.source().is_some());
    }
}
