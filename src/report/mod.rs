//! Text rendering of decoded profiles.
//!
//! This module converts a `Profile` into:
//! - An indented, cost-annotated call tree
//! - The full report (echoed headers + framed tree)

pub mod call_tree;
pub mod summary;

// Re-export main functions
pub use call_tree::{normalize_function_name, render_call_tree, select_root};
pub use summary::{render_headers, render_report};
