//! Output of dataset summaries.
//!
//! Supports the plain text report, JSON, and appending to a CSV history file.

use anyhow::Result;
use tracing::debug;

use crate::report::Summary;
use csv::WriterBuilder;
use std::fs::OpenOptions;
use std::path::Path;

/// Prints the text report to stdout.
pub fn print_text(summary: &Summary) {
    println!("{summary}");
}

/// Prints the summary as pretty-printed JSON to stdout.
pub fn print_json(summary: &Summary) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(summary)?);
    Ok(())
}

/// Appends a [`Summary`] as a row to a CSV file.
///
/// Creates the file with headers if it does not already exist.
pub fn append_record(path: &Path, summary: &Summary) -> Result<()> {
    let file_exists = path.exists();
    debug!(path = %path.display(), file_exists, "Appending CSV record");

    let file = OpenOptions::new().append(true).create(true).open(path)?;

    let mut writer = WriterBuilder::new()
        .has_headers(!file_exists)
        .from_writer(file);

    writer.serialize(summary)?;
    writer.flush()?;

    Ok(())
}
