//! Error types for the entire application.
//!
//! We use `thiserror` for library-style errors with custom types,
//! and `anyhow` for application-level error propagation in main.rs and commands.
//!
//! Malformed log input is never an error: the reconstructor degrades the
//! affected fields and keeps going. The types here cover the two places a
//! real failure can surface: exporting the tree and writing files.

use thiserror::Error;

/// Errors that can occur while exporting a trace to the profile schema.
///
/// These indicate a defect in the exporter itself, not malformed input -
/// none of them are reachable from a well-formed reconstructor result.
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("synthetic identifier collision: {0}")]
    IdCollision(String),

    #[error("node index {0} missing from identifier map")]
    MissingNode(usize),
}

/// Errors that can occur during file output
#[derive(Error, Debug)]
pub enum OutputError {
    #[error("Failed to write file: {0}")]
    WriteFailed(#[from] std::io::Error),

    #[error("Failed to serialize JSON: {0}")]
    SerializationFailed(#[from] serde_json::Error),

    #[error("Invalid output path: {0}")]
    InvalidPath(String),
}
