//! CLI command implementations.
//!
//! Commands orchestrate the various library components to perform user tasks.

pub mod annotate;

// Re-export main command functions
pub use annotate::{annotate_file, execute_annotate, validate_args, AnnotateArgs};
