//! Start/end macros for operation logging.
//!
//! Each macro expands to one `tracing` event with `component` (the calling
//! module), `op` and `event` set, followed by any extra `key = value` fields
//! in `tracing` syntax (`%display`, `?debug` are accepted).

#[doc(hidden)]
#[macro_export]
macro_rules! __op_event {
    ($level:ident, $op:expr, $event:expr $(, $($field:tt)*)?) => {
        tracing::$level!(
            component = module_path!(),
            op = $op,
            event = $event,
            $($($field)*)?
        )
    };
}

/// Log that `op` began.
///
/// ```
/// # use distdiff_core::log_op_start;
/// log_op_start!("read_tree");
/// log_op_start!("read_tree", side = "A", root = "/opt/dist-a");
/// ```
#[macro_export]
macro_rules! log_op_start {
    ($op:expr $(, $($field:tt)*)?) => {
        $crate::__op_event!(
            info,
            $op,
            $crate::__types::schema::EVENT_START
            $(, $($field)*)?
        )
    };
}

/// Log that `op` finished; `duration_ms` is mandatory.
///
/// ```
/// # use distdiff_core::log_op_end;
/// log_op_end!("reconcile_layer", duration_ms = 7, layer = "base");
/// ```
#[macro_export]
macro_rules! log_op_end {
    ($op:expr, duration_ms = $duration:expr $(, $($field:tt)*)?) => {
        $crate::__op_event!(
            info,
            $op,
            $crate::__types::schema::EVENT_END,
            duration_ms = $duration
            $(, $($field)*)?
        )
    };
}

/// Log that `op` failed with `err`.
///
/// `err` may be a `DistDiffError` or a `DiffError`; its stable code, kind
/// and message are added as `err_code`, `err_kind` and `message`.
///
/// ```
/// # use distdiff_core::{log_op_error, errors::DistDiffError};
/// log_op_error!("run_pipeline", DistDiffError::NoPhases, duration_ms = 3);
/// ```
#[macro_export]
macro_rules! log_op_error {
    ($op:expr, $err:expr, duration_ms = $duration:expr $(, $($field:tt)*)?) => {{
        let diff_err: $crate::errors::DiffError = ::core::convert::Into::into($err);
        $crate::__op_event!(
            error,
            $op,
            $crate::__types::schema::EVENT_END_ERROR,
            duration_ms = $duration,
            err_kind = ?diff_err.kind(),
            err_code = diff_err.code(),
            message = %diff_err
            $(, $($field)*)?
        )
    }};
}
