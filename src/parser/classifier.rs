//! Line classification for raw execution logs.
//!
//! One line of log text (plus a bounded lookahead window) maps to one
//! `ClassifiedLine`. Classification is substring/marker based: the first
//! recognized marker token in the trimmed line selects the variant, with
//! DML/SOQL leaf markers taking precedence over the generic method/flow
//! markers. Everything here is a pure function of its input lines.

use crate::utils::config::{
    CODE_UNIT_END_MARKER, CODE_UNIT_START_MARKER, DML_MARKERS, EXECUTION_END_MARKER,
    EXECUTION_START_MARKER, FLOW_MARKERS, LOOKAHEAD_WINDOW, METHOD_MARKERS, NAMESPACE_DEFAULT,
    NAMESPACE_UNKNOWN, ROWS_FIELD_PREFIX, SOQL_MARKERS, TOTAL_FIELD_PREFIX,
};

/// Nesting scope a paired start/end marker belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitKind {
    Execution,
    CodeUnit,
}

/// Kind of a single-line, non-nesting operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeafKind {
    Dml,
    Soql,
    Method,
    Flow,
}

/// Result of classifying one raw log line
#[derive(Debug, Clone, PartialEq)]
pub enum ClassifiedLine {
    UnitStart {
        kind: UnitKind,
        label: String,
        namespace: String,
        /// Elapsed nanoseconds extracted from the marker line, if present
        timestamp: Option<u64>,
        /// `total: <f>ms` from the summary header, 0.0 when absent
        duration_hint: f64,
        /// `rows: <n>` from the summary header, 0 when absent
        rows_hint: u32,
    },
    UnitEnd {
        kind: UnitKind,
    },
    Leaf {
        kind: LeafKind,
        label: String,
    },
    Unrecognized,
}

/// Classify the line at `index`, with lookahead access to the lines that
/// follow it for multi-line record formats.
///
/// **Public** - main classification entry point
///
/// A malformed numeric field never turns a recognizable marker into
/// `Unrecognized`; it degrades to the neutral default instead.
pub fn classify_line(lines: &[&str], index: usize) -> ClassifiedLine {
    let Some(raw) = lines.get(index) else {
        return ClassifiedLine::Unrecognized;
    };
    let line = raw.trim();

    if line.contains(EXECUTION_START_MARKER) {
        // Summary header fields sit on the lines after the marker:
        // offset +1 holds the total duration, offset +2 the row count.
        let duration_hint = lookahead(lines, index, 1)
            .and_then(|l| parse_total_ms(l))
            .unwrap_or(0.0);
        let rows_hint = lookahead(lines, index, 2)
            .and_then(|l| parse_rows(l))
            .unwrap_or(0);

        return ClassifiedLine::UnitStart {
            kind: UnitKind::Execution,
            label: extract_label(line, EXECUTION_START_MARKER)
                .unwrap_or_else(|| "Execution".to_string()),
            namespace: NAMESPACE_UNKNOWN.to_string(),
            timestamp: extract_timestamp(line),
            duration_hint,
            rows_hint,
        };
    }

    if line.contains(EXECUTION_END_MARKER) {
        return ClassifiedLine::UnitEnd {
            kind: UnitKind::Execution,
        };
    }

    if line.contains(CODE_UNIT_START_MARKER) {
        let label = extract_label(line, CODE_UNIT_START_MARKER).unwrap_or_default();
        let namespace = derive_namespace(&label);
        return ClassifiedLine::UnitStart {
            kind: UnitKind::CodeUnit,
            label,
            namespace,
            timestamp: extract_timestamp(line),
            duration_hint: 0.0,
            rows_hint: 0,
        };
    }

    if line.contains(CODE_UNIT_END_MARKER) {
        return ClassifiedLine::UnitEnd {
            kind: UnitKind::CodeUnit,
        };
    }

    // Leaf markers, DML/SOQL first
    for (markers, kind, fallback) in [
        (DML_MARKERS, LeafKind::Dml, "DML"),
        (SOQL_MARKERS, LeafKind::Soql, "SOQL"),
        (METHOD_MARKERS, LeafKind::Method, "Method"),
        (FLOW_MARKERS, LeafKind::Flow, "Flow"),
    ] {
        if let Some(marker) = markers.iter().find(|m| line.contains(**m)) {
            return ClassifiedLine::Leaf {
                kind,
                label: extract_label(line, marker).unwrap_or_else(|| fallback.to_string()),
            };
        }
    }

    ClassifiedLine::Unrecognized
}

/// Lazy in-order producer of classified lines over a whole log text.
///
/// **Public** - lets the reconstructor consume classification as an
/// iterator while the classifier keeps its bounded lookahead window.
pub struct LineClassifier<'a> {
    lines: Vec<&'a str>,
    cursor: usize,
}

impl<'a> LineClassifier<'a> {
    pub fn new(text: &'a str) -> Self {
        Self {
            lines: text.lines().collect(),
            cursor: 0,
        }
    }

    /// Number of raw lines in the input
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }
}

impl Iterator for LineClassifier<'_> {
    type Item = ClassifiedLine;

    fn next(&mut self) -> Option<Self::Item> {
        if self.cursor >= self.lines.len() {
            return None;
        }
        let classified = classify_line(&self.lines, self.cursor);
        self.cursor += 1;
        Some(classified)
    }
}

/// Split a code unit label on the first `:` to get its owning namespace
///
/// **Private** - internal helper for classify_line
fn derive_namespace(label: &str) -> String {
    if label.is_empty() {
        return NAMESPACE_UNKNOWN.to_string();
    }
    match label.split_once(':') {
        Some((ns, _)) if !ns.is_empty() => ns.to_string(),
        Some(_) => NAMESPACE_UNKNOWN.to_string(),
        None => NAMESPACE_DEFAULT.to_string(),
    }
}

/// Extract the elapsed-nanoseconds timestamp from a `(123456)` field
///
/// **Private** - internal helper for classify_line
fn extract_timestamp(line: &str) -> Option<u64> {
    let open = line.find('(')?;
    let rest = &line[open + 1..];
    let close = rest.find(')')?;
    rest[..close].trim().parse::<u64>().ok()
}

/// Extract the trailing `|`-separated segment as the record label
///
/// Returns `None` when the line has no field separators or the last
/// segment is the marker itself (a bare marker line).
///
/// **Private** - internal helper for classify_line
fn extract_label(line: &str, marker: &str) -> Option<String> {
    let last = line.rsplit('|').next()?.trim();
    if last.is_empty() || last.contains(marker) {
        return None;
    }
    Some(last.to_string())
}

/// Fetch a lookahead line at a fixed offset past the marker line
///
/// **Private** - internal helper for classify_line
fn lookahead<'a>(lines: &[&'a str], index: usize, offset: usize) -> Option<&'a str> {
    debug_assert!(offset <= LOOKAHEAD_WINDOW);
    lines.get(index + offset).map(|l| l.trim())
}

/// Parse a `total: 5.0ms` summary field
///
/// **Private** - internal helper for classify_line
fn parse_total_ms(line: &str) -> Option<f64> {
    let at = line.find(TOTAL_FIELD_PREFIX)?;
    let value = line[at + TOTAL_FIELD_PREFIX.len()..]
        .trim()
        .trim_end_matches("ms")
        .trim();
    value.parse::<f64>().ok().filter(|v| v.is_finite() && *v >= 0.0)
}

/// Parse a `rows: 3` summary field
///
/// **Private** - internal helper for classify_line
fn parse_rows(line: &str) -> Option<u32> {
    let at = line.find(ROWS_FIELD_PREFIX)?;
    line[at + ROWS_FIELD_PREFIX.len()..].trim().parse::<u32>().ok()
}
