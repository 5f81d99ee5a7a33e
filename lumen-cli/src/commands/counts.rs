//! Counts command implementation.

use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::debug;

use crate::utils::{build_config, flush_stdout, format_counts, load_and_score};
use crate::{GlobalArgs, OutputFormat};

/// Execute the counts command.
pub fn execute(manifest: PathBuf, format: OutputFormat, global: &GlobalArgs) -> Result<()> {
    let config = build_config(global, &manifest)?;
    let report = load_and_score(&manifest, &config)?;
    let counts = report.table.count_by_range();
    debug!(ranges = counts.len(), files = counts.total(), "Counted ranges");

    match format {
        OutputFormat::Table => print!("{}", format_counts(&counts)),
        OutputFormat::Json => {
            let json =
                serde_json::to_string_pretty(&counts).context("Failed to serialize counts")?;
            println!("{json}");
        }
        OutputFormat::Csv => {
            let mut writer = io::stdout().lock();
            writeln!(writer, "range,count")?;
            for entry in counts.iter() {
                writeln!(writer, "{},{}", entry.range, entry.count)?;
            }
        }
    }

    flush_stdout()
}
