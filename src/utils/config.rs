//! Configuration and constants for log analysis.

/// Current output schema version
pub const SCHEMA_VERSION: &str = "1.0.0";

// Marker tokens emitted by the instrumented runtime.
// Detection is substring-based on the trimmed line, and the order the
// classifier checks them in is the precedence order (DML/SOQL leaves
// before the generic METHOD/FLOW markers).
pub const EXECUTION_START_MARKER: &str = "EXECUTION_STARTED";
pub const EXECUTION_END_MARKER: &str = "EXECUTION_FINISHED";
pub const CODE_UNIT_START_MARKER: &str = "CODE_UNIT_STARTED";
pub const CODE_UNIT_END_MARKER: &str = "CODE_UNIT_FINISHED";

// Leaf markers (runtime versions differ slightly in flow naming)
pub const DML_MARKERS: &[&str] = &["DML_BEGIN"];
pub const SOQL_MARKERS: &[&str] = &["SOQL_EXECUTE_BEGIN"];
pub const METHOD_MARKERS: &[&str] = &["METHOD_ENTRY"];
pub const FLOW_MARKERS: &[&str] = &["FLOW_ELEMENT_BEGIN", "FLOW_START_INTERVIEW_BEGIN"];

// Summary header fields on the lines following EXECUTION_STARTED
pub const TOTAL_FIELD_PREFIX: &str = "total:";
pub const ROWS_FIELD_PREFIX: &str = "rows:";

/// How many lines past a marker line the classifier may inspect
pub const LOOKAHEAD_WINDOW: usize = 2;

/// Duration assigned to a unit whose close is never bounded by a later
/// event. A placeholder heuristic inherited from the original tooling,
/// not a measured value.
pub const FALLBACK_DURATION_MS: f64 = 10.0;

/// Nominal duration carried by Method/Flow leaves so timeline views have
/// something to draw. Never enters self-time accounting.
pub const LEAF_NOMINAL_DURATION_MS: f64 = 1.0;

/// Namespace for a code unit label with no `:` separator
pub const NAMESPACE_DEFAULT: &str = "default";

/// Namespace when no label is available at all
pub const NAMESPACE_UNKNOWN: &str = "Unknown";

/// Log timestamps are elapsed nanoseconds; the model works in milliseconds
pub const NANOS_PER_MS: f64 = 1_000_000.0;

/// Maximum label length folded into a synthetic export identifier
pub const ID_LABEL_MAX_LEN: usize = 24;
