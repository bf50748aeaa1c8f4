use apex_trace_studio::commands::{
    execute_analyze, validate_args, validate_profile_file, AnalyzeArgs,
};
use apex_trace_studio::output::read_profile;

fn write_sample_log(dir: &tempfile::TempDir) -> std::path::PathBuf {
    let path = dir.path().join("debug.log");
    std::fs::write(
        &path,
        "(1000000000)|EXECUTION_STARTED\n\
         total: 15.0ms\n\
         rows: 5\n\
         (1001000000)|CODE_UNIT_STARTED|Foo:bar\n\
         (1002000000)|DML_BEGIN|Op:Insert\n\
         CODE_UNIT_FINISHED\n\
         EXECUTION_FINISHED\n",
    )
    .unwrap();
    path
}

#[test]
fn test_validate_args_valid() {
    let dir = tempfile::tempdir().unwrap();
    let args = AnalyzeArgs {
        input: write_sample_log(&dir),
        ..Default::default()
    };

    assert!(validate_args(&args).is_ok());
}

#[test]
fn test_validate_args_missing_input() {
    let args = AnalyzeArgs {
        input: std::path::PathBuf::from("/nonexistent/debug.log"),
        ..Default::default()
    };

    assert!(validate_args(&args).is_err());
}

#[test]
fn test_validate_args_top_units_zero() {
    let dir = tempfile::tempdir().unwrap();
    let args = AnalyzeArgs {
        input: write_sample_log(&dir),
        top_units: 0,
        ..Default::default()
    };

    assert!(validate_args(&args).is_err());
}

#[test]
fn test_execute_analyze_writes_profile() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("out").join("profile.json");
    let args = AnalyzeArgs {
        input: write_sample_log(&dir),
        output_json: output.clone(),
        top_units: 5,
        print_summary: false,
    };

    execute_analyze(args).unwrap();

    let profile = read_profile(&output).unwrap();
    assert_eq!(profile.statistics.total_duration_ms, 15.0);
    assert_eq!(profile.statistics.rows_count, 5);
    assert_eq!(profile.statistics.dml_count, 1);
    assert!(profile.nodes.len() >= 3);
}

#[test]
fn test_execute_analyze_tolerates_garbage_log() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("garbage.log");
    std::fs::write(&input, "this is not a trace\nat all\n").unwrap();

    let output = dir.path().join("profile.json");
    let args = AnalyzeArgs {
        input,
        output_json: output.clone(),
        top_units: 5,
        print_summary: false,
    };

    // Malformed input degrades, it never fails the command
    execute_analyze(args).unwrap();

    let profile = read_profile(&output).unwrap();
    assert!(profile.nodes.is_empty());
    assert_eq!(profile.statistics.dml_count, 0);
}

#[test]
fn test_validate_profile_file_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("profile.json");
    let args = AnalyzeArgs {
        input: write_sample_log(&dir),
        output_json: output.clone(),
        top_units: 5,
        print_summary: false,
    };
    execute_analyze(args).unwrap();

    assert!(validate_profile_file(output).is_ok());
}

#[test]
fn test_validate_profile_file_missing() {
    assert!(validate_profile_file(std::path::PathBuf::from("/nonexistent/profile.json")).is_err());
}
