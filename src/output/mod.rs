//! Output writers for rendered reports.

pub mod text;

// Re-export main functions
pub use text::{print_report, write_report};
