//! Analyze command implementation.
//!
//! The analyze command:
//! 1. Reads the raw debug log from disk
//! 2. Reconstructs the call tree
//! 3. Calculates hot unit metrics
//! 4. Writes the JSON profile
//! 5. Optionally prints a text summary

use crate::aggregator::{calculate_hot_units, calculate_namespace_totals, parse_log, Trace};
use crate::commands::models::AnalyzeArgs;
use crate::output::{to_profile, write_profile, TraceProfile};
use anyhow::{bail, Context, Result};
use log::{debug, info};
use std::fs;
use std::time::Instant;

/// Check analyze arguments before doing any work
///
/// **Public** - called from main.rs ahead of execute_analyze
pub fn validate_args(args: &AnalyzeArgs) -> Result<()> {
    if !args.input.exists() {
        bail!("Input log not found: {}", args.input.display());
    }
    if args.top_units == 0 {
        bail!("--top-units must be at least 1");
    }
    Ok(())
}

/// Execute the analyze command
///
/// **Public** - main entry point called from main.rs
///
/// # Errors
/// * Log file read errors
/// * Profile export or file write errors
///
/// Malformed log content is not an error: the reconstructor always
/// produces a best-effort trace.
pub fn execute_analyze(args: AnalyzeArgs) -> Result<()> {
    let started = Instant::now();

    info!("Analyzing log: {}", args.input.display());
    let text = fs::read_to_string(&args.input)
        .with_context(|| format!("Failed to read log file {}", args.input.display()))?;

    info!("Reconstructing call tree...");
    let trace = parse_log(&text);
    debug!(
        "Reconstructed {} events, {} code units, {:.3}ms total",
        trace.events.len(),
        trace.code_units.len(),
        trace.statistics.total_duration_ms
    );

    info!("Calculating top {} hot units...", args.top_units);
    let hot_units = calculate_hot_units(&trace, args.top_units);

    let profile = to_profile(&trace, hot_units).context("Failed to export trace profile")?;

    write_profile(&profile, &args.output_json).context("Failed to write profile JSON")?;
    info!("Profile written to: {}", args.output_json.display());

    if args.print_summary {
        print_trace_summary(&trace, &profile);
    }

    info!(
        "Analysis completed in {:.2}s",
        started.elapsed().as_secs_f64()
    );
    Ok(())
}

/// Print a human-readable trace summary to stdout.
///
/// **Private** - internal helper for execute_analyze
fn print_trace_summary(trace: &Trace, profile: &TraceProfile) {
    let stats = &trace.statistics;

    println!();
    println!("Trace Summary");
    println!("  Total duration: {:.3} ms", stats.total_duration_ms);
    println!("  Events:         {}", trace.events.len());
    println!("  Code units:     {}", trace.code_units.len());
    println!("  DML operations: {}", stats.dml_count);
    println!("  SOQL queries:   {}", stats.soql_count);
    println!("  Rows:           {}", stats.rows_count);

    if !profile.hot_units.is_empty() {
        println!();
        println!("Top units by self time:");
        for unit in &profile.hot_units {
            println!(
                "  {:>8.3} ms  {:>5.1}%  {}",
                unit.self_ms, unit.percentage, unit.label
            );
        }
    }

    let namespaces = calculate_namespace_totals(trace);
    if !namespaces.is_empty() {
        println!();
        println!("By namespace:");
        for ns in namespaces {
            println!(
                "  {:<20} {:>3} unit(s)  {:>8.3} ms self  {} DML  {} SOQL",
                ns.namespace, ns.unit_count, ns.self_ms, ns.dml_count, ns.soql_count
            );
        }
    }
}
