//! Trace reconstruction from classified log lines.
//!
//! A single forward pass over the classified line stream maintains two
//! LIFO stacks - Execution blocks are a coarse, usually single-level
//! scope; CodeUnit blocks nest arbitrarily inside an Execution block or
//! inside each other. Nodes live in an arena (`Trace::events`, discovery
//! order); parent and child links are arena indices, so the finished
//! tree has no reference cycles and serializes directly.
//!
//! Duration resolution: a closed code unit is bounded by the offset of
//! the next event created after its end marker. Units still unresolved
//! at end-of-input get `FALLBACK_DURATION_MS`; units never closed keep
//! whatever they accumulated. Malformed input degrades, it never aborts.

use crate::parser::classifier::{ClassifiedLine, LeafKind, LineClassifier, UnitKind};
use crate::utils::config::{
    FALLBACK_DURATION_MS, LEAF_NOMINAL_DURATION_MS, NAMESPACE_UNKNOWN, NANOS_PER_MS,
};
use log::debug;
use serde::{Deserialize, Serialize};

/// Kind of a reconstructed event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Execution,
    CodeUnit,
    Dml,
    Soql,
    Method,
    Flow,
}

impl From<LeafKind> for EventKind {
    fn from(kind: LeafKind) -> Self {
        match kind {
            LeafKind::Dml => EventKind::Dml,
            LeafKind::Soql => EventKind::Soql,
            LeafKind::Method => EventKind::Method,
            LeafKind::Flow => EventKind::Flow,
        }
    }
}

/// One reconstructed occurrence in the trace.
///
/// Container kinds (Execution, CodeUnit) carry own-subtree totals in the
/// DML/SOQL/row counters; leaf kinds keep them at 0. `children` holds
/// nested units only - leaves appear in the flat event list and point at
/// their enclosing unit through `parent`, which keeps
/// `total_ms == sum(children.total_ms) + self_ms` exact while Method and
/// Flow leaves carry a purely visual nominal duration.
#[derive(Debug, Clone, Serialize)]
pub struct Event {
    pub kind: EventKind,
    pub label: String,
    pub namespace: String,

    /// Elapsed milliseconds since trace start
    pub offset_ms: f64,
    /// Elapsed milliseconds attributed to this event
    pub duration_ms: f64,
    /// Duration of the subtree rooted here
    pub total_ms: f64,
    /// `total_ms` minus the sum of direct children's `total_ms`
    pub self_ms: f64,

    pub dml_count: u32,
    pub soql_count: u32,
    pub row_count: u32,

    /// Arena index of the enclosing unit (back-reference, not ownership)
    pub parent: Option<usize>,
    /// Arena indices of nested units, in discovery order
    pub children: Vec<usize>,
}

/// Whole-trace aggregate statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Statistics {
    pub total_duration_ms: f64,
    pub dml_count: u32,
    pub soql_count: u32,
    pub rows_count: u32,
}

/// Parse result: the arena-backed call tree plus flat views over it
#[derive(Debug, Clone, Serialize)]
pub struct Trace {
    /// All events in discovery order (also the arena)
    pub events: Vec<Event>,
    /// Arena indices of Execution roots
    pub execution_units: Vec<usize>,
    /// Arena indices of every CodeUnit node, flat
    pub code_units: Vec<usize>,
    pub statistics: Statistics,
}

/// Parse a raw log text into a reconstructed trace.
///
/// **Public** - the main entry point; a pure function of the input text.
/// Never fails on malformed input - structural anomalies (unmatched end
/// markers, truncated traces, missing numerics) degrade the affected
/// nodes to defaults instead.
pub fn parse_log(text: &str) -> Trace {
    let classifier = LineClassifier::new(text);
    debug!("Reconstructing trace from {} lines", classifier.line_count());

    let mut ctx = Reconstructor::new();
    for line in classifier {
        ctx.process(line);
    }
    ctx.finish()
}

/// Mutable reconstruction state, constructed fresh per parse call.
///
/// **Private** - never shared across invocations
struct Reconstructor {
    events: Vec<Event>,
    execution_stack: Vec<usize>,
    code_unit_stack: Vec<usize>,
    /// Closed code units waiting for the next event to bound their duration
    pending_close: Vec<usize>,
    execution_units: Vec<usize>,
    code_units: Vec<usize>,
    /// Timestamp of the first unit start; zeroes all later offsets
    start_time: Option<u64>,
    /// Offset of the most recent timestamped line, monotone non-decreasing
    current_offset_ms: f64,
    statistics: Statistics,
}

impl Reconstructor {
    fn new() -> Self {
        Self {
            events: Vec::new(),
            execution_stack: Vec::new(),
            code_unit_stack: Vec::new(),
            pending_close: Vec::new(),
            execution_units: Vec::new(),
            code_units: Vec::new(),
            start_time: None,
            current_offset_ms: 0.0,
            statistics: Statistics::default(),
        }
    }

    /// Apply one classified line, strictly in stream order
    fn process(&mut self, line: ClassifiedLine) {
        match line {
            ClassifiedLine::UnitStart {
                kind: UnitKind::Execution,
                label,
                namespace,
                timestamp,
                duration_hint,
                rows_hint,
            } => self.start_execution(label, namespace, timestamp, duration_hint, rows_hint),

            ClassifiedLine::UnitStart {
                kind: UnitKind::CodeUnit,
                label,
                namespace,
                timestamp,
                ..
            } => self.start_code_unit(label, namespace, timestamp),

            ClassifiedLine::UnitEnd {
                kind: UnitKind::Execution,
            } => {
                // Unmatched end markers are tolerated, not fatal
                if self.execution_stack.pop().is_none() {
                    debug!("Unmatched execution end marker, ignoring");
                }
            }

            ClassifiedLine::UnitEnd {
                kind: UnitKind::CodeUnit,
            } => match self.code_unit_stack.pop() {
                Some(index) => self.pending_close.push(index),
                None => debug!("Unmatched code unit end marker, ignoring"),
            },

            ClassifiedLine::Leaf { kind, label } => self.add_leaf(kind, label),

            ClassifiedLine::Unrecognized => {}
        }
    }

    fn start_execution(
        &mut self,
        label: String,
        namespace: String,
        timestamp: Option<u64>,
        duration_hint: f64,
        rows_hint: u32,
    ) {
        let offset_ms = self.advance_offset(timestamp);
        self.resolve_pending(offset_ms);

        let index = self.events.len();
        self.events.push(Event {
            kind: EventKind::Execution,
            label,
            namespace,
            offset_ms,
            duration_ms: duration_hint,
            total_ms: duration_hint,
            // Children subtract their totals from this as they resolve
            self_ms: duration_hint,
            dml_count: 0,
            soql_count: 0,
            row_count: rows_hint,
            parent: None,
            children: Vec::new(),
        });

        self.statistics.total_duration_ms += duration_hint;
        self.statistics.rows_count += rows_hint;
        self.execution_units.push(index);
        self.execution_stack.push(index);
    }

    fn start_code_unit(&mut self, label: String, namespace: String, timestamp: Option<u64>) {
        let offset_ms = self.advance_offset(timestamp);
        self.resolve_pending(offset_ms);

        let parent = self
            .code_unit_stack
            .last()
            .or(self.execution_stack.last())
            .copied();

        let index = self.events.len();
        self.events.push(Event {
            kind: EventKind::CodeUnit,
            label,
            namespace,
            offset_ms,
            duration_ms: 0.0,
            total_ms: 0.0,
            self_ms: 0.0,
            dml_count: 0,
            soql_count: 0,
            row_count: 0,
            parent,
            children: Vec::new(),
        });

        if let Some(parent_index) = parent {
            self.events[parent_index].children.push(index);
        }
        self.code_units.push(index);
        self.code_unit_stack.push(index);
    }

    fn add_leaf(&mut self, kind: LeafKind, label: String) {
        let offset_ms = self.current_offset_ms;
        self.resolve_pending(offset_ms);

        let innermost = self.code_unit_stack.last().copied();
        let parent = innermost.or(self.execution_stack.last().copied());
        let namespace = innermost
            .map(|index| self.events[index].namespace.clone())
            .unwrap_or_else(|| NAMESPACE_UNKNOWN.to_string());

        // Method/Flow leaves carry a nominal duration for timeline views
        // only; it never enters parent self-time accounting.
        let duration_ms = match kind {
            LeafKind::Dml | LeafKind::Soql => 0.0,
            LeafKind::Method | LeafKind::Flow => LEAF_NOMINAL_DURATION_MS,
        };

        match kind {
            LeafKind::Dml => {
                self.statistics.dml_count += 1;
                self.bump_open_units(|event| event.dml_count += 1);
            }
            LeafKind::Soql => {
                self.statistics.soql_count += 1;
                self.bump_open_units(|event| event.soql_count += 1);
            }
            LeafKind::Method | LeafKind::Flow => {}
        }

        self.events.push(Event {
            kind: kind.into(),
            label,
            namespace,
            offset_ms,
            duration_ms,
            total_ms: duration_ms,
            self_ms: duration_ms,
            dml_count: 0,
            soql_count: 0,
            row_count: 0,
            parent,
            children: Vec::new(),
        });
    }

    /// Credit a leaf operation to every open unit, so container counters
    /// are own-subtree totals rather than innermost-only counts
    fn bump_open_units(&mut self, bump: impl Fn(&mut Event)) {
        for &index in self.code_unit_stack.iter().chain(&self.execution_stack) {
            bump(&mut self.events[index]);
        }
    }

    /// Fold a timestamp into the running offset context.
    ///
    /// The first timestamp seen defines the trace start. Offsets are
    /// clamped monotone non-decreasing even if log timestamps regress.
    fn advance_offset(&mut self, timestamp: Option<u64>) -> f64 {
        if let Some(ts) = timestamp {
            let start = *self.start_time.get_or_insert(ts);
            let offset_ms = ts.saturating_sub(start) as f64 / NANOS_PER_MS;
            self.current_offset_ms = self.current_offset_ms.max(offset_ms);
        }
        self.current_offset_ms
    }

    /// Resolve every closed-but-unbounded code unit against the offset of
    /// the event about to be created
    fn resolve_pending(&mut self, bound_ms: f64) {
        if self.pending_close.is_empty() {
            return;
        }
        let pending = std::mem::take(&mut self.pending_close);
        for index in pending {
            let duration_ms = (bound_ms - self.events[index].offset_ms).max(0.0);
            self.finalize_unit(index, duration_ms);
        }
    }

    /// Fix a closed unit's duration and propagate total-vs-self time.
    ///
    /// The parent's self time is decremented once per closed child; this
    /// achieves total/self attribution without a second pass.
    fn finalize_unit(&mut self, index: usize, duration_ms: f64) {
        debug_assert!(index < self.events.len());
        let event = &mut self.events[index];
        event.duration_ms = duration_ms;
        event.total_ms = duration_ms;
        event.self_ms += duration_ms;
        let parent = event.parent;

        if let Some(parent_index) = parent {
            self.events[parent_index].self_ms -= duration_ms;
        }
    }

    /// Assemble the immutable trace after the last line
    fn finish(mut self) -> Trace {
        // Closed units with no later event to bound them get the named
        // fallback; units never closed keep what they accumulated.
        let pending = std::mem::take(&mut self.pending_close);
        for index in pending {
            self.finalize_unit(index, FALLBACK_DURATION_MS);
        }

        if !self.execution_stack.is_empty() || !self.code_unit_stack.is_empty() {
            debug!(
                "Trace ends with {} execution and {} code unit(s) unterminated",
                self.execution_stack.len(),
                self.code_unit_stack.len()
            );
        }

        // Truncated logs often lack the execution summary header; fall
        // back to the furthest event end so the span is still usable.
        if self.statistics.total_duration_ms == 0.0 {
            self.statistics.total_duration_ms = self
                .events
                .iter()
                .map(|event| event.offset_ms + event.total_ms)
                .fold(0.0, f64::max);
        }

        debug!(
            "Reconstructed {} events ({} executions, {} code units)",
            self.events.len(),
            self.execution_units.len(),
            self.code_units.len()
        );

        Trace {
            events: self.events,
            execution_units: self.execution_units,
            code_units: self.code_units,
            statistics: self.statistics,
        }
    }
}
