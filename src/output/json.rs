//! JSON report file for a finished model.

use super::schema::Report;
use crate::utils::error::OutputError;
use log::debug;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Write `report` as pretty-printed JSON, creating missing parent directories
///
/// **Public** - called by the analyze command
///
/// # Errors
/// * `OutputError::WriteFailed` - directory or file could not be written
/// * `OutputError::SerializationFailed` - report could not be serialized
pub fn write_report(report: &Report, path: impl AsRef<Path>) -> Result<(), OutputError> {
    let path = path.as_ref();

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, report)?;
    writer.flush()?;

    debug!(
        "{} events ({} categories) written to {}",
        report.events.len(),
        report.summary.categories.len(),
        path.display()
    );
    Ok(())
}
