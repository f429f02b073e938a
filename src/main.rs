//! GC Trace Studio CLI
//!
//! Reads JVM garbage-collector logs into an event model and reports
//! pause and heap statistics.

use anyhow::Result;
use clap::{Parser, Subcommand};
use env_logger::Env;
use std::path::PathBuf;

use gc_trace_studio::commands::{execute_analyze, validate_args, AnalyzeArgs};
use gc_trace_studio::utils::config::REPORT_SCHEMA_VERSION;

/// GC Trace Studio - GC log analysis
#[derive(Parser, Debug)]
#[command(name = "gc-trace")]
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
    /// Read a ZGC unified logging file (-Xlog:gc*)
    Analyze {
        /// GC log file
        #[arg(short, long)]
        input: PathBuf,

        /// Output path for JSON report (optional)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Print text summary to stdout
        #[arg(long)]
        summary: bool,
    },

    /// Display version information
    Version,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    match cli.command {
        Commands::Analyze {
            input,
            output,
            summary,
        } => {
            let args = AnalyzeArgs {
                input,
                output_json: output,
                print_summary: summary,
            };

            validate_args(&args)?;
            execute_analyze(&args)?;
        }

        Commands::Version => {
            display_version();
        }
    }

    Ok(())
}

/// Display version information
///
/// **Private** - internal command implementation
fn display_version() {
    println!("GC Trace Studio v{}", env!("CARGO_PKG_VERSION"));
    println!("Report Schema: v{}", REPORT_SCHEMA_VERSION);
    println!();
    println!("Readers: IBM J9 verbose GC (library), ZGC unified logging");
}
