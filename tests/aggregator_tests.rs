use apex_trace_studio::aggregator::{
    calculate_hot_units, calculate_namespace_totals, parse_log, EventKind,
};
use pretty_assertions::assert_eq;

#[test]
fn test_single_execution_with_summary_header() {
    let log = "09:15:43.22 (1000)|EXECUTION_STARTED\n\
               total: 5.0ms\n\
               rows: 3\n\
               09:15:43.22 (6001000)|EXECUTION_FINISHED\n";

    let trace = parse_log(log);

    assert_eq!(trace.execution_units.len(), 1);
    let root = &trace.events[trace.execution_units[0]];
    assert_eq!(root.kind, EventKind::Execution);
    assert_eq!(root.offset_ms, 0.0);
    assert_eq!(root.row_count, 3);
    assert_eq!(root.total_ms, 5.0);

    assert_eq!(trace.statistics.total_duration_ms, 5.0);
    assert_eq!(trace.statistics.rows_count, 3);
    assert_eq!(trace.statistics.dml_count, 0);
    assert_eq!(trace.statistics.soql_count, 0);
}

#[test]
fn test_nested_units_roll_up_soql_counts() {
    let log = "(1000000000)|CODE_UNIT_STARTED|[EXTERNAL]|Foo:bar\n\
               (1002000000)|CODE_UNIT_STARTED|[EXTERNAL]|Foo:baz\n\
               (1002500000)|SOQL_EXECUTE_BEGIN|SELECT Id FROM Account\n\
               CODE_UNIT_FINISHED\n\
               CODE_UNIT_FINISHED\n";

    let trace = parse_log(log);

    assert_eq!(trace.code_units.len(), 2);
    let bar = &trace.events[trace.code_units[0]];
    let baz = &trace.events[trace.code_units[1]];

    assert_eq!(bar.label, "Foo:bar");
    assert_eq!(bar.children, vec![trace.code_units[1]]);
    assert_eq!(baz.parent, Some(trace.code_units[0]));

    // Leaf counts propagate to every open unit, not just the innermost
    assert_eq!(baz.soql_count, 1);
    assert_eq!(bar.soql_count, 1);
    assert_eq!(trace.statistics.soql_count, 1);

    // The query leaf inherits the innermost unit's namespace
    let leaf = trace
        .events
        .iter()
        .find(|e| e.kind == EventKind::Soql)
        .expect("soql leaf present");
    assert_eq!(leaf.namespace, "Foo");
    assert_eq!(leaf.parent, Some(trace.code_units[1]));
}

#[test]
fn test_unterminated_code_unit_stays_in_tree() {
    let log = "(1000)|CODE_UNIT_STARTED|Foo:bar\n";

    let trace = parse_log(log);

    assert_eq!(trace.code_units.len(), 1);
    let unit = &trace.events[trace.code_units[0]];
    assert_eq!(unit.duration_ms, 0.0);
    assert_eq!(unit.self_ms, 0.0);
}

#[test]
fn test_orphan_dml_leaves() {
    let log = "DML_BEGIN|Op:Insert|Type:Account\n".repeat(100);

    let trace = parse_log(&log);

    assert_eq!(trace.statistics.dml_count, 100);
    assert!(trace.code_units.is_empty());
    assert_eq!(trace.events.len(), 100);
    for event in &trace.events {
        assert_eq!(event.kind, EventKind::Dml);
        assert_eq!(event.namespace, "Unknown");
        assert_eq!(event.parent, None);
    }
}

#[test]
fn test_sibling_self_time_attribution() {
    // parent spans 0..30ms, first child 5..15, second child 15..30;
    // a trailing unit bounds the closes at 30ms.
    let log = "(1000000000)|CODE_UNIT_STARTED|Top:parent\n\
               (1005000000)|CODE_UNIT_STARTED|Top:first\n\
               CODE_UNIT_FINISHED\n\
               (1015000000)|CODE_UNIT_STARTED|Top:second\n\
               CODE_UNIT_FINISHED\n\
               CODE_UNIT_FINISHED\n\
               (1030000000)|CODE_UNIT_STARTED|Top:after\n\
               CODE_UNIT_FINISHED\n";

    let trace = parse_log(log);

    let parent = &trace.events[trace.code_units[0]];
    let first = &trace.events[trace.code_units[1]];
    let second = &trace.events[trace.code_units[2]];

    assert_eq!(first.total_ms, 10.0);
    assert_eq!(second.total_ms, 15.0);
    assert_eq!(parent.total_ms, 30.0);
    assert_eq!(parent.self_ms, 5.0);
}

#[test]
fn test_self_time_invariant_holds_exactly() {
    let log = "(1000000000)|EXECUTION_STARTED\n\
               total: 40.0ms\n\
               rows: 0\n\
               (1002000000)|CODE_UNIT_STARTED|A:outer\n\
               (1004000000)|CODE_UNIT_STARTED|A:inner\n\
               (1004000000)|SOQL_EXECUTE_BEGIN|SELECT Id\n\
               CODE_UNIT_FINISHED\n\
               (1010000000)|CODE_UNIT_STARTED|B:side\n\
               CODE_UNIT_FINISHED\n\
               CODE_UNIT_FINISHED\n\
               (1020000000)|CODE_UNIT_STARTED|B:tail\n\
               CODE_UNIT_FINISHED\n\
               EXECUTION_FINISHED\n";

    let trace = parse_log(log);

    for event in &trace.events {
        let child_total: f64 = event
            .children
            .iter()
            .map(|&child| trace.events[child].total_ms)
            .sum();
        assert_eq!(
            event.total_ms,
            child_total + event.self_ms,
            "self-time invariant broken for {}",
            event.label
        );
        assert!(event.self_ms <= event.total_ms + 1e-9);
    }
}

#[test]
fn test_events_are_ordered_by_offset() {
    let log = "(1000000000)|EXECUTION_STARTED\n\
               total: 10.0ms\n\
               rows: 1\n\
               (1001000000)|CODE_UNIT_STARTED|Foo:bar\n\
               (1002000000)|DML_BEGIN|Op:Update\n\
               (1003000000)|METHOD_ENTRY|Foo.bar()\n\
               CODE_UNIT_FINISHED\n\
               EXECUTION_FINISHED\n";

    let trace = parse_log(log);

    let offsets: Vec<f64> = trace.events.iter().map(|e| e.offset_ms).collect();
    assert!(offsets.windows(2).all(|w| w[0] <= w[1]), "{:?}", offsets);
}

#[test]
fn test_pairing_invariant_durations_non_negative() {
    let log = "(1000000000)|CODE_UNIT_STARTED|a\n\
               (1000500000)|CODE_UNIT_STARTED|b\n\
               CODE_UNIT_FINISHED\n\
               CODE_UNIT_FINISHED\n\
               (1000600000)|CODE_UNIT_STARTED|c\n\
               CODE_UNIT_FINISHED\n";

    let trace = parse_log(log);
    for event in &trace.events {
        assert!(event.duration_ms >= 0.0);
    }
}

#[test]
fn test_only_end_markers_degrade_to_empty_trace() {
    let log = "EXECUTION_FINISHED\n\
               CODE_UNIT_FINISHED\n\
               CODE_UNIT_FINISHED\n";

    let trace = parse_log(log);

    assert!(trace.events.is_empty());
    assert!(trace.execution_units.is_empty());
    assert!(trace.code_units.is_empty());
    assert_eq!(trace.statistics.total_duration_ms, 0.0);
    assert_eq!(trace.statistics.dml_count, 0);
}

#[test]
fn test_parse_is_idempotent() {
    let log = "(1000000000)|EXECUTION_STARTED\n\
               total: 12.5ms\n\
               rows: 4\n\
               (1001000000)|CODE_UNIT_STARTED|Foo:bar\n\
               (1002000000)|SOQL_EXECUTE_BEGIN|SELECT Id\n\
               CODE_UNIT_FINISHED\n\
               EXECUTION_FINISHED\n";

    let first = serde_json::to_value(parse_log(log)).unwrap();
    let second = serde_json::to_value(parse_log(log)).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_method_leaf_carries_nominal_duration_without_self_time_cost() {
    let log = "(1000000000)|EXECUTION_STARTED\n\
               total: 5.0ms\n\
               rows: 0\n\
               (1001000000)|METHOD_ENTRY|Foo.bar()\n\
               EXECUTION_FINISHED\n";

    let trace = parse_log(log);

    let method = trace
        .events
        .iter()
        .find(|e| e.kind == EventKind::Method)
        .expect("method leaf present");
    assert!(method.total_ms > 0.0);

    // Nominal leaf durations are visualization-only: the execution keeps
    // its full self time.
    let root = &trace.events[trace.execution_units[0]];
    assert_eq!(root.self_ms, 5.0);
}

#[test]
fn test_unclosed_trailing_unit_uses_fallback_duration() {
    let log = "(1000000000)|CODE_UNIT_STARTED|Foo:bar\n\
               CODE_UNIT_FINISHED\n";

    let trace = parse_log(log);

    // Closed, but nothing after it to bound the duration
    let unit = &trace.events[trace.code_units[0]];
    assert_eq!(unit.duration_ms, 10.0);
    assert_eq!(unit.total_ms, 10.0);
}

#[test]
fn test_total_duration_falls_back_to_event_span() {
    let log = "(1000000000)|CODE_UNIT_STARTED|Foo:bar\n\
               (1020000000)|CODE_UNIT_STARTED|Foo:baz\n\
               CODE_UNIT_FINISHED\n\
               CODE_UNIT_FINISHED\n";

    let trace = parse_log(log);

    // No execution header: span is the furthest event end (baz closes at
    // end-of-input and gets the 10ms fallback, 20 + 10).
    assert_eq!(trace.statistics.total_duration_ms, 30.0);
}

#[test]
fn test_calculate_hot_units() {
    let log = "(1000000000)|CODE_UNIT_STARTED|Top:parent\n\
               (1005000000)|CODE_UNIT_STARTED|Top:first\n\
               CODE_UNIT_FINISHED\n\
               (1015000000)|CODE_UNIT_STARTED|Top:second\n\
               CODE_UNIT_FINISHED\n\
               CODE_UNIT_FINISHED\n\
               (1030000000)|CODE_UNIT_STARTED|Top:after\n\
               CODE_UNIT_FINISHED\n";

    let trace = parse_log(log);
    let hot = calculate_hot_units(&trace, 2);

    assert_eq!(hot.len(), 2);
    assert_eq!(hot[0].label, "Top:second");
    assert_eq!(hot[0].self_ms, 15.0);
    assert!(hot[0].percentage > 0.0);
    assert_eq!(hot[1].label, "Top:first");
}

#[test]
fn test_calculate_hot_units_empty_trace() {
    let trace = parse_log("");
    assert!(calculate_hot_units(&trace, 10).is_empty());
}

#[test]
fn test_calculate_namespace_totals() {
    let log = "(1000000000)|CODE_UNIT_STARTED|Alpha:outer\n\
               (1001000000)|SOQL_EXECUTE_BEGIN|SELECT Id\n\
               (1002000000)|CODE_UNIT_STARTED|Beta:inner\n\
               (1003000000)|DML_BEGIN|Op:Insert\n\
               CODE_UNIT_FINISHED\n\
               CODE_UNIT_FINISHED\n";

    let trace = parse_log(log);
    let totals = calculate_namespace_totals(&trace);

    let alpha = totals.iter().find(|t| t.namespace == "Alpha").unwrap();
    assert_eq!(alpha.unit_count, 1);
    assert_eq!(alpha.soql_count, 1);
    assert_eq!(alpha.dml_count, 0);

    let beta = totals.iter().find(|t| t.namespace == "Beta").unwrap();
    assert_eq!(beta.unit_count, 1);
    assert_eq!(beta.dml_count, 1);
}
