//! Canonical logging macros
//!
//! These macros provide a structured, consistent way to log operations at
//! the engine boundary.

/// Log the start of an operation
///
/// # Example
///
/// ```
/// # use dashq_core::log_op_start;
/// log_op_start!("star_query");
/// log_op_start!("star_query", query_uid = "q123");
/// ```
#[macro_export]
macro_rules! log_op_start {
    ($op:expr) => {
        ::tracing::info!(
            component = module_path!(),
            op = $op,
            event = $crate::logging_facility::schema::EVENT_START,
        );
    };
    ($op:expr, $($field:tt)*) => {
        ::tracing::info!(
            component = module_path!(),
            op = $op,
            event = $crate::logging_facility::schema::EVENT_START,
            $($field)*
        );
    };
}

/// Log the successful end of an operation
///
/// # Example
///
/// ```
/// # use dashq_core::log_op_end;
/// log_op_end!("star_query", duration_ms = 42);
/// ```
#[macro_export]
macro_rules! log_op_end {
    ($op:expr, duration_ms = $duration:expr) => {
        ::tracing::info!(
            component = module_path!(),
            op = $op,
            event = $crate::logging_facility::schema::EVENT_END,
            duration_ms = $duration,
        );
    };
    ($op:expr, duration_ms = $duration:expr, $($field:tt)*) => {
        ::tracing::info!(
            component = module_path!(),
            op = $op,
            event = $crate::logging_facility::schema::EVENT_END,
            duration_ms = $duration,
            $($field)*
        );
    };
}

/// Log an operation error
///
/// Semantic failures (not found, already starred, ...) are logged at `warn`;
/// infrastructure failures at `error`.
///
/// # Example
///
/// ```
/// # use dashq_core::log_op_error;
/// # use dashq_core::errors::DashqError;
/// let err = DashqError::QueryNotFound { query_uid: "q1".to_string() };
/// log_op_error!("delete_query", err, duration_ms = 10);
/// ```
#[macro_export]
macro_rules! log_op_error {
    ($op:expr, $err:expr, duration_ms = $duration:expr) => {{
        let ex_err: $crate::errors::ExError = $err.into();
        if ex_err.kind().is_infrastructure() {
            ::tracing::error!(
                component = module_path!(),
                op = $op,
                event = $crate::logging_facility::schema::EVENT_END_ERROR,
                duration_ms = $duration,
                err_kind = ?ex_err.kind(),
                err_code = ex_err.code(),
                err_message = ex_err.message(),
            );
        } else {
            ::tracing::warn!(
                component = module_path!(),
                op = $op,
                event = $crate::logging_facility::schema::EVENT_END_ERROR,
                duration_ms = $duration,
                err_kind = ?ex_err.kind(),
                err_code = ex_err.code(),
            );
        }
    }};
    ($op:expr, $err:expr, duration_ms = $duration:expr, $($field:tt)*) => {{
        let ex_err: $crate::errors::ExError = $err.into();
        if ex_err.kind().is_infrastructure() {
            ::tracing::error!(
                component = module_path!(),
                op = $op,
                event = $crate::logging_facility::schema::EVENT_END_ERROR,
                duration_ms = $duration,
                err_kind = ?ex_err.kind(),
                err_code = ex_err.code(),
                err_message = ex_err.message(),
                $($field)*
            );
        } else {
            ::tracing::warn!(
                component = module_path!(),
                op = $op,
                event = $crate::logging_facility::schema::EVENT_END_ERROR,
                duration_ms = $duration,
                err_kind = ?ex_err.kind(),
                err_code = ex_err.code(),
                $($field)*
            );
        }
    }};
}
