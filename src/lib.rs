//! Callgrind Tree
//!
//! Decodes callgrind profiles (the line-oriented format written by
//! valgrind's callgrind tool) and renders a cost-annotated call tree from a
//! chosen root function.
//!
//! This crate provides the core implementation for the
//! `callgrind-tree` CLI tool.
//!
//! ## Getting Started
//!
//! ```bash
//! valgrind --tool=callgrind --compress-strings=yes ./app
//! callgrind-tree callgrind.out.12345
//! ```

pub mod commands;
pub mod output;
pub mod parser;
pub mod report;
pub mod utils;
