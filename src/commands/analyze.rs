//! Analyze command implementation.
//!
//! The analyze command:
//! 1. Reads a unified logging file line by line
//! 2. Feeds every line to the ZGC reader
//! 3. Writes the JSON report and/or prints a text summary

use crate::model::{Category, GcModel};
use crate::output::{write_report, Report};
use crate::parser::UnifiedZgcReader;
use anyhow::{Context, Result};
use log::{debug, info, warn};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::PathBuf;
use std::time::Instant;

/// Arguments for the analyze command
///
/// **Public** - used by main.rs to construct from CLI args
#[derive(Debug, Clone, Default)]
pub struct AnalyzeArgs {
    /// Unified logging GC log to read
    pub input: PathBuf,

    /// Output path for JSON report (optional)
    pub output_json: Option<PathBuf>,

    /// Print text summary to stdout
    pub print_summary: bool,
}

/// Execute the analyze command
///
/// **Public** - main entry point called from main.rs
///
/// # Returns
/// The populated model
///
/// # Errors
/// * Input file cannot be opened or read
/// * Report file cannot be written
pub fn execute_analyze(args: &AnalyzeArgs) -> Result<GcModel> {
    let start_time = Instant::now();

    info!("Reading GC log: {}", args.input.display());

    let file = File::open(&args.input)
        .with_context(|| format!("Failed to open {}", args.input.display()))?;

    let mut model = GcModel::new();
    let mut reader = UnifiedZgcReader::new();
    for line in BufReader::new(file).lines() {
        let line = line.with_context(|| format!("Failed to read {}", args.input.display()))?;
        reader.read_line(&line, &mut model);
    }
    reader.finish(&mut model);

    if !reader.warnings().is_empty() {
        warn!("{} lines could not be fully understood", reader.warnings().len());
    }
    debug!("Pauses: {}", model.pause().summary());

    if let Some(output) = &args.output_json {
        let report = Report::from_model(args.input.display().to_string(), &model);
        write_report(&report, output).context("Failed to write report JSON")?;
        info!("✓ Report written to: {}", output.display());
    }

    if args.print_summary {
        println!("{}", text_summary(&model));
    }

    info!(
        "Read {} events in {:.2}s",
        model.len(),
        start_time.elapsed().as_secs_f64()
    );

    Ok(model)
}

/// Validate analyze arguments
///
/// **Public** - can be called before execute_analyze for early validation
pub fn validate_args(args: &AnalyzeArgs) -> Result<()> {
    if args.input.as_os_str().is_empty() {
        anyhow::bail!("Input path cannot be empty");
    }

    if !args.input.is_file() {
        anyhow::bail!("Input is not a file: {}", args.input.display());
    }

    Ok(())
}

/// Render the model aggregates as text
///
/// **Public** - also used by tests
pub fn text_summary(model: &GcModel) -> String {
    let mut out = String::new();
    out.push_str(&format!("{}\n", "=".repeat(80)));
    out.push_str("GC SUMMARY\n");
    out.push_str(&format!("{}\n", "=".repeat(80)));
    out.push_str(&format!("Events:           {}\n", model.len()));
    out.push_str(&format!("Pauses:           {}\n", model.pause().summary()));
    out.push_str(&format!(
        "Max heap (KB):    {:.0}\n",
        model.heap_allocated_sizes().max()
    ));

    for category in Category::ALL {
        let stats = model.category(category);
        if stats.occurrences() == 0 {
            continue;
        }
        out.push_str(&format!(
            "\n{:?}: {} types, {} events\n",
            category,
            stats.type_count(),
            stats.occurrences()
        ));
        for (name, pauses) in &stats.by_type {
            out.push_str(&format!(
                "  {:<45} n={:<5} total={:.6}s max={:.6}s\n",
                name,
                pauses.n(),
                pauses.sum(),
                pauses.max()
            ));
        }
    }
    out.push_str(&"=".repeat(80));
    out
}
