//! Read-only consumers of a [`Report`](crate::core::Report). The view is always
//! passed in by the caller.

pub mod export;
pub mod format;
pub mod table;

pub use export::{ExportError, month_trace_csv, projection_csv};
pub use format::{
    PLACEHOLDER, format_compact_currency, format_currency, format_integer, format_percent,
    format_ratio,
};
pub use table::render_report;
