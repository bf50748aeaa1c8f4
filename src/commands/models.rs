use std::path::PathBuf;

/// Arguments for the analyze command
///
/// **Public** - used by main.rs to construct from CLI args
#[derive(Debug, Clone)]
pub struct AnalyzeArgs {
    /// Path to the raw debug log
    pub input: PathBuf,

    /// Output path for the JSON profile
    pub output_json: PathBuf,

    /// Number of top hot units to include in the profile
    pub top_units: usize,

    /// Print text summary to stdout
    pub print_summary: bool,
}

impl Default for AnalyzeArgs {
    fn default() -> Self {
        Self {
            input: PathBuf::from("debug.log"),
            output_json: PathBuf::from("artifacts/profile.json"),
            top_units: 20,
            print_summary: false,
        }
    }
}
