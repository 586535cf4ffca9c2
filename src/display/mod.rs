//! Display formatting for terminal output

pub mod report;

pub use report::{format_backup_report, format_rename_report, format_restore_outcome};
