//! Apex Trace Studio CLI
//!
//! Reconstructs call trees with per-unit timing and database operation
//! counts from Apex-style execution logs.

use anyhow::Result;
use clap::{Parser, Subcommand};
use env_logger::Env;
use std::path::PathBuf;

use apex_trace_studio::commands::{
    display_schema, display_version, execute_analyze, validate_args, validate_profile_file,
    AnalyzeArgs,
};

/// Apex Trace Studio - call-tree profiling for execution logs
#[derive(Parser, Debug)]
#[command(name = "apex-trace")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Analyze a debug log and write a JSON profile
    Analyze {
        /// Path to the raw debug log
        #[arg(short, long)]
        file: PathBuf,

        /// Output path for the JSON profile
        #[arg(short, long, default_value = "artifacts/profile.json")]
        output: PathBuf,

        /// Number of top hot units to include
        #[arg(long, default_value = "20")]
        top_units: usize,

        /// Print text summary to stdout
        #[arg(long)]
        summary: bool,
    },

    /// Validate a profile JSON file
    Validate {
        /// Path to profile JSON file
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Display schema information
    Schema {
        /// Show full schema details
        #[arg(long)]
        show: bool,
    },

    /// Display version information
    Version,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    match cli.command {
        Commands::Analyze {
            file,
            output,
            top_units,
            summary,
        } => {
            let args = AnalyzeArgs {
                input: file,
                output_json: output,
                top_units,
                print_summary: summary,
            };

            validate_args(&args)?;
            execute_analyze(args)?;
        }

        Commands::Validate { file } => {
            validate_profile_file(file)?;
        }

        Commands::Schema { show } => {
            display_schema(show);
        }

        Commands::Version => {
            display_version();
        }
    }

    Ok(())
}
