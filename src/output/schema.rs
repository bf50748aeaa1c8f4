//! Exported profile schema for trace data.
//!
//! This is the serialization boundary: the reconstructor's arena tree is
//! flattened into records whose parent/child cross-references are
//! synthetic string identifiers, so the profile can cross a process or
//! UI boundary with no reference cycles and be rejoined on the other
//! side through an identifier map. Schema is versioned to allow future
//! evolution.

use crate::aggregator::metrics::HotUnit;
use crate::aggregator::tree_builder::{EventKind, Statistics, Trace};
use crate::utils::config::{ID_LABEL_MAX_LEN, SCHEMA_VERSION};
use crate::utils::error::ExportError;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Top-level profile structure written to JSON
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraceProfile {
    /// Schema version for compatibility checking
    pub version: String,

    /// Timestamp when the profile was generated
    pub generated_at: String,

    /// Whole-trace aggregate statistics
    pub statistics: Statistics,

    /// Every reconstructed event, discovery order preserved
    pub nodes: Vec<NodeRecord>,

    /// Top code units ranked by self time
    pub hot_units: Vec<HotUnit>,
}

/// One exported event record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeRecord {
    /// Synthetic identifier, deterministic for a given input text
    pub id: String,
    pub kind: EventKind,
    pub label: String,
    pub namespace: String,

    pub offset_ms: f64,
    pub duration_ms: f64,
    pub total_ms: f64,
    pub self_ms: f64,

    pub dml_count: u32,
    pub soql_count: u32,
    pub row_count: u32,

    /// Identifier of the enclosing unit, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,

    /// Identifiers of nested units, discovery order
    pub children: Vec<String>,
}

/// Convert a reconstructed trace to the exported profile format
///
/// **Public** - used by commands to create final output
///
/// # Errors
/// * `ExportError::IdCollision` - duplicate synthetic identifier
/// * `ExportError::MissingNode` - dangling arena index
///
/// Both indicate a defect in the exporter or reconstructor, never
/// malformed log input.
pub fn to_profile(trace: &Trace, hot_units: Vec<HotUnit>) -> Result<TraceProfile, ExportError> {
    let ids = assign_node_ids(trace)?;

    let lookup = |index: usize| -> Result<String, ExportError> {
        ids.get(&index)
            .cloned()
            .ok_or(ExportError::MissingNode(index))
    };

    let mut nodes = Vec::with_capacity(trace.events.len());
    for (index, event) in trace.events.iter().enumerate() {
        let parent = match event.parent {
            Some(parent_index) => Some(lookup(parent_index)?),
            None => None,
        };
        let children = event
            .children
            .iter()
            .map(|&child| lookup(child))
            .collect::<Result<Vec<_>, _>>()?;

        nodes.push(NodeRecord {
            id: lookup(index)?,
            kind: event.kind,
            label: event.label.clone(),
            namespace: event.namespace.clone(),
            offset_ms: event.offset_ms,
            duration_ms: event.duration_ms,
            total_ms: event.total_ms,
            self_ms: event.self_ms,
            dml_count: event.dml_count,
            soql_count: event.soql_count,
            row_count: event.row_count,
            parent,
            children,
        });
    }

    Ok(TraceProfile {
        version: SCHEMA_VERSION.to_string(),
        generated_at: Utc::now().to_rfc3339(),
        statistics: trace.statistics,
        nodes,
        hot_units,
    })
}

/// Derive a synthetic identifier per arena node.
///
/// **Private** - internal helper for to_profile
///
/// Identifiers are `<offset-microseconds>-<label-slug>-<ordinal>`; the
/// ordinal disambiguates repeated offset+label pairs deterministically,
/// so parsing the same text twice yields the same identifiers.
fn assign_node_ids(trace: &Trace) -> Result<HashMap<usize, String>, ExportError> {
    let mut occurrences: HashMap<String, u32> = HashMap::new();
    let mut taken: HashSet<String> = HashSet::new();
    let mut ids: HashMap<usize, String> = HashMap::new();

    for (index, event) in trace.events.iter().enumerate() {
        let base = format!(
            "{}-{}",
            (event.offset_ms * 1_000.0).round() as u64,
            normalize_label(&event.label)
        );
        let ordinal = occurrences.entry(base.clone()).or_insert(0);
        let id = format!("{}-{}", base, ordinal);
        *ordinal += 1;

        if !taken.insert(id.clone()) {
            return Err(ExportError::IdCollision(id));
        }
        ids.insert(index, id);
    }

    Ok(ids)
}

/// Lowercased, dash-normalized, truncated label slug
///
/// **Private** - internal helper for assign_node_ids
fn normalize_label(label: &str) -> String {
    label
        .chars()
        .take(ID_LABEL_MAX_LEN)
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '-'
            }
        })
        .collect()
}
