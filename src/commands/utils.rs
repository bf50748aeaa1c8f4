//! Small command implementations shared by the CLI.

use crate::output::read_profile;
use crate::utils::config::SCHEMA_VERSION;
use anyhow::Result;
use std::path::PathBuf;

/// Validate a profile JSON file
///
/// **Public** - command implementation for `validate`
pub fn validate_profile_file(file_path: PathBuf) -> Result<()> {
    println!("Validating profile: {}", file_path.display());

    let profile = read_profile(&file_path)?;

    println!("Valid profile JSON");
    println!("  Version: {}", profile.version);
    println!("  Nodes: {}", profile.nodes.len());
    println!(
        "  Total duration: {:.3} ms",
        profile.statistics.total_duration_ms
    );
    println!("  DML: {}", profile.statistics.dml_count);
    println!("  SOQL: {}", profile.statistics.soql_count);
    println!("  Hot units: {}", profile.hot_units.len());

    Ok(())
}

/// Display schema information
///
/// **Public** - command implementation for `schema`
pub fn display_schema(show_details: bool) {
    println!("Apex Trace Studio Profile Schema");
    println!("Current Version: {}", SCHEMA_VERSION);
    println!();

    if show_details {
        println!("Schema Structure:");
        println!("  version: string          - Schema version (e.g., '1.0.0')");
        println!("  generated_at: string     - ISO 8601 timestamp");
        println!("  statistics: object       - Whole-trace aggregates");
        println!("    total_duration_ms: number");
        println!("    dml_count: number");
        println!("    soql_count: number");
        println!("    rows_count: number");
        println!("  nodes: array             - Every reconstructed event");
        println!("    id: string             - Synthetic identifier");
        println!("    kind: string           - execution|code_unit|dml|soql|method|flow");
        println!("    offset_ms/duration_ms/total_ms/self_ms: number");
        println!("    parent: string?        - Enclosing unit identifier");
        println!("    children: array        - Nested unit identifiers");
        println!("  hot_units: array         - Top code units by self time");
    } else {
        println!("Use --show for detailed schema information");
    }
}

/// Display version information
///
/// **Public** - command implementation for `version`
pub fn display_version() {
    println!("Apex Trace Studio v{}", env!("CARGO_PKG_VERSION"));
    println!("Profile Schema: v{}", SCHEMA_VERSION);
    println!();
    println!("Call-tree reconstruction and profiling for Apex-style execution logs.");
}
