//! Output schema and writers for profile data.
//!
//! This module owns the serialization boundary:
//! - The exported profile schema with synthetic node identifiers
//! - The JSON profile writer/reader

pub mod json;
pub mod schema;

// Re-export main functions
pub use json::{read_profile, write_profile};
pub use schema::{to_profile, NodeRecord, TraceProfile};

use crate::utils::error::OutputError;
use std::path::Path;

/// Common path validation for output files
pub fn validate_path(path: &Path) -> Result<(), OutputError> {
    if path.as_os_str().is_empty() {
        return Err(OutputError::InvalidPath("Path is empty".to_string()));
    }

    if path.exists() && path.is_dir() {
        return Err(OutputError::InvalidPath(format!(
            "Path is a directory: {}",
            path.display()
        )));
    }

    Ok(())
}
