//! Canonical logging macros
//!
//! These macros provide a structured, consistent way to log operations.
//! Field names come from `bibkeep_core_types::schema`.

/// Log the start of an operation
///
/// # Example
///
/// ```
/// # use bibkeep_core::log_op_start;
/// log_op_start!("history_commit");
/// log_op_start!("history_commit", document = "refs.bib");
/// ```
#[macro_export]
macro_rules! log_op_start {
    ($op:expr) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = $crate::schema::EVENT_START,
        );
    };
    ($op:expr, $($field:tt)*) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = $crate::schema::EVENT_START,
            $($field)*
        );
    };
}

/// Log the successful end of an operation
///
/// # Example
///
/// ```
/// # use bibkeep_core::log_op_end;
/// log_op_end!("history_commit", duration_ms = 42);
/// ```
#[macro_export]
macro_rules! log_op_end {
    ($op:expr, duration_ms = $duration:expr) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = $crate::schema::EVENT_END,
            duration_ms = $duration,
        );
    };
    ($op:expr, duration_ms = $duration:expr, $($field:tt)*) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = $crate::schema::EVENT_END,
            duration_ms = $duration,
            $($field)*
        );
    };
}

/// Log an operation error
///
/// Non-fatal history conditions are logged at `warn`, everything else at `error`.
///
/// # Example
///
/// ```
/// # use bibkeep_core::log_op_error;
/// # use bibkeep_core::errors::{ExError, ExErrorKind};
/// let err = ExError::new(ExErrorKind::UndoPastRoot);
/// log_op_error!("history_undo", err, duration_ms = 10);
/// ```
#[macro_export]
macro_rules! log_op_error {
    ($op:expr, $err:expr, duration_ms = $duration:expr) => {{
        let ex_err: $crate::errors::ExError = $err.into();
        if ex_err.is_non_fatal() {
            tracing::warn!(
                component = module_path!(),
                op = $op,
                event = $crate::schema::EVENT_END_ERROR,
                duration_ms = $duration,
                err.kind = ?ex_err.kind(),
                err.code = ex_err.code(),
            );
        } else {
            tracing::error!(
                component = module_path!(),
                op = $op,
                event = $crate::schema::EVENT_END_ERROR,
                duration_ms = $duration,
                err.kind = ?ex_err.kind(),
                err.code = ex_err.code(),
            );
        }
    }};
}
