//! Reporting utilities: run summaries, table formatting, and table slicing.

pub mod filter;
pub mod format;

pub use filter::{Column, TableFilter, select_columns};
pub use format::{MAJORITY, format_run_summary, format_table};
