//! Error types for the entire application.
//!
//! We use `thiserror` for library-style errors with custom types,
//! and `anyhow` for application-level error propagation in main.rs and commands.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while decoding a callgrind profile
///
/// Every format error carries the input path and the 1-based line number.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("{}: cannot read input: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{}:{line} Error key [{key}] unknown | {value}", .path.display())]
    UnknownKey {
        path: PathBuf,
        line: usize,
        key: String,
        value: String,
    },

    #[error("{}:{line} Error invalid cost token [{token}]", .path.display())]
    InvalidCost {
        path: PathBuf,
        line: usize,
        token: String,
    },

    #[error("{}:{line} Error cost line before any 'events' header", .path.display())]
    MissingEvents { path: PathBuf, line: usize },

    #[error(
        "{}:{line} Error cost line has {found} columns, expected at most {expected}",
        .path.display()
    )]
    TooManyColumns {
        path: PathBuf,
        line: usize,
        expected: usize,
        found: usize,
    },

    #[error("{}:{line} Error calls line is not followed by a cost line", .path.display())]
    MissingCallCost { path: PathBuf, line: usize },
}

/// Errors from decoding a single cost line, before position is attached
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("invalid cost token [{0}]")]
    InvalidToken(String),

    #[error("cost line has {found} columns, expected at most {expected}")]
    TooManyColumns { expected: usize, found: usize },
}

/// Errors that can occur while rendering the call tree
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Profile contains no function blocks")]
    EmptyProfile,
}

/// Errors that can occur during file output
#[derive(Error, Debug)]
pub enum OutputError {
    #[error("Failed to write file: {0}")]
    WriteFailed(#[from] std::io::Error),

    #[error("Invalid output path: {0}")]
    InvalidPath(String),
}
