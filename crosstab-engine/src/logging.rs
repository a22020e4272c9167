//! FILENAME: crosstab-engine/src/logging.rs
// PURPOSE: Category-tagged logging macros on top of the `log` facade.
//
// The engine never installs a logger. Hosts pick one (env_logger, a file sink,
// a frontend bridge) and filter on the category, which is passed as the log target.

// ============================================================================
// CATEGORIES
// ============================================================================

/// Pivot assembly (filter, enumerate, aggregate, totals).
pub const CAT_PIVOT: &str = "PIVOT";

/// Record ingestion and field type inference.
pub const CAT_CACHE: &str = "CACHE";

/// Configuration loading and editing.
pub const CAT_CONFIG: &str = "CONFIG";

// ============================================================================
// MACRO DEFINITIONS & EXPORTS
// ============================================================================

#[macro_export]
macro_rules! log_debug {
    ($cat:expr, $($arg:tt)*) => {
        ::log::log!(target: $cat, ::log::Level::Debug, $($arg)*)
    };
}

#[macro_export]
macro_rules! log_info {
    ($cat:expr, $($arg:tt)*) => {
        ::log::log!(target: $cat, ::log::Level::Info, $($arg)*)
    };
}

#[macro_export]
macro_rules! log_warn {
    ($cat:expr, $($arg:tt)*) => {
        ::log::log!(target: $cat, ::log::Level::Warn, $($arg)*)
    };
}

// ENTER/EXIT macros for function tracing

#[macro_export]
macro_rules! log_enter {
    ($cat:expr, $func:expr) => {
        ::log::log!(target: $cat, ::log::Level::Debug, "[ENTER] {}", $func)
    };
    ($cat:expr, $func:expr, $($arg:tt)*) => {
        ::log::log!(target: $cat, ::log::Level::Debug, "[ENTER] {} {}", $func, format_args!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_exit {
    ($cat:expr, $func:expr) => {
        ::log::log!(target: $cat, ::log::Level::Debug, "[EXIT] {}", $func)
    };
    ($cat:expr, $func:expr, $($arg:tt)*) => {
        ::log::log!(target: $cat, ::log::Level::Debug, "[EXIT] {} {}", $func, format_args!($($arg)*))
    };
}

// Re-export the macros so they can be imported via `use crate::logging::log_info;`
pub use crate::log_debug;
pub use crate::log_enter;
pub use crate::log_exit;
pub use crate::log_info;
pub use crate::log_warn;
