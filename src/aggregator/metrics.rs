//! Summary metrics over a reconstructed trace.
//!
//! Hot units are the code units that spend the most time in their own
//! frame (self time). These are the primary optimization targets and
//! feed the CLI summary and the exported profile.

use super::tree_builder::{EventKind, Trace};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A code unit ranked by self time
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HotUnit {
    pub label: String,
    pub namespace: String,
    pub self_ms: f64,
    pub total_ms: f64,
    /// Share of the whole-trace duration spent in this unit's own frame
    pub percentage: f64,
}

/// Calculate the top code units by self time
///
/// **Public** - main entry point for metrics calculation
///
/// # Arguments
/// * `trace` - Reconstructed trace
/// * `top_n` - Number of top units to return (e.g., 10)
///
/// # Returns
/// Vector of hot units, sorted by self time (descending)
pub fn calculate_hot_units(trace: &Trace, top_n: usize) -> Vec<HotUnit> {
    debug!(
        "Calculating top {} hot units from {} code units",
        top_n,
        trace.code_units.len()
    );

    let denominator = trace.statistics.total_duration_ms;

    let mut units: Vec<&_> = trace
        .code_units
        .iter()
        .map(|&index| &trace.events[index])
        .collect();
    units.sort_by(|a, b| {
        b.self_ms
            .partial_cmp(&a.self_ms)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    units
        .into_iter()
        .take(top_n)
        .map(|event| HotUnit {
            label: event.label.clone(),
            namespace: event.namespace.clone(),
            self_ms: event.self_ms,
            total_ms: event.total_ms,
            percentage: if denominator > 0.0 {
                (event.self_ms / denominator) * 100.0
            } else {
                0.0
            },
        })
        .collect()
}

/// Per-namespace rollup of units and database operations
#[derive(Debug, Clone, Default, Serialize)]
pub struct NamespaceTotals {
    pub namespace: String,
    pub unit_count: usize,
    pub self_ms: f64,
    pub dml_count: u32,
    pub soql_count: u32,
}

/// Aggregate trace activity per namespace
///
/// **Public** - provides summary statistics for tabular display
///
/// DML/SOQL counts come from the leaves themselves (each leaf inherits
/// the namespace of its innermost unit), so nothing is double counted
/// through the subtree totals on container nodes.
pub fn calculate_namespace_totals(trace: &Trace) -> Vec<NamespaceTotals> {
    let mut by_namespace: HashMap<&str, NamespaceTotals> = HashMap::new();

    for event in &trace.events {
        let entry = by_namespace
            .entry(event.namespace.as_str())
            .or_insert_with(|| NamespaceTotals {
                namespace: event.namespace.clone(),
                ..NamespaceTotals::default()
            });

        match event.kind {
            EventKind::CodeUnit => {
                entry.unit_count += 1;
                entry.self_ms += event.self_ms;
            }
            EventKind::Dml => entry.dml_count += 1,
            EventKind::Soql => entry.soql_count += 1,
            EventKind::Execution | EventKind::Method | EventKind::Flow => {}
        }
    }

    let mut totals: Vec<NamespaceTotals> = by_namespace.into_values().collect();
    totals.sort_by(|a, b| {
        b.self_ms
            .partial_cmp(&a.self_ms)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.namespace.cmp(&b.namespace))
    });
    totals
}
