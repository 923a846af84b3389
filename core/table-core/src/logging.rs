//! FILENAME: core/table-core/src/logging.rs
// PURPOSE: Category-tagged logging macros over the `log` facade.
// CONTEXT: The host decides where records go by installing a `log` backend.
// Categories used in this crate: TABLE, STATE, COLUMNS, HEADERS, ROWMODEL, MEMO.

macro_rules! log_debug {
    ($cat:expr, $($arg:tt)*) => {
        log::debug!(target: "table_core", "[{}] {}", $cat, format_args!($($arg)*))
    };
}

macro_rules! log_info {
    ($cat:expr, $($arg:tt)*) => {
        log::info!(target: "table_core", "[{}] {}", $cat, format_args!($($arg)*))
    };
}

macro_rules! log_warn {
    ($cat:expr, $($arg:tt)*) => {
        log::warn!(target: "table_core", "[{}] {}", $cat, format_args!($($arg)*))
    };
}

pub(crate) use log_debug;
pub(crate) use log_info;
pub(crate) use log_warn;
