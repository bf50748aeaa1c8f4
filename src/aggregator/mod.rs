//! Trace reconstruction and aggregation.
//!
//! This module transforms classified log lines into:
//! - The arena-backed call tree with total/self time attribution
//! - Whole-trace statistics (duration, DML/SOQL/row counts)
//! - Hot unit and namespace rollup metrics

pub mod metrics;
pub mod tree_builder;

// Re-export main types and functions
pub use metrics::{calculate_hot_units, calculate_namespace_totals, HotUnit, NamespaceTotals};
pub use tree_builder::{parse_log, Event, EventKind, Statistics, Trace};
