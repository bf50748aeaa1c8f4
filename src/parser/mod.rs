//! Log line classification.
//!
//! This module handles:
//! - Recognizing marker tokens in raw log lines
//! - Extracting timestamps, duration/row hints, and labels
//! - Deriving namespaces from code unit labels

pub mod classifier;

// Re-export main types
pub use classifier::{classify_line, ClassifiedLine, LeafKind, LineClassifier, UnitKind};
