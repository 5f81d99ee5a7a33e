//! Filter command implementation.

use std::path::PathBuf;

use anyhow::{Context, Result};
use lumen_core::{render, ChartLabels};
use tracing::info;

use crate::utils::{build_config, emit_table, flush_stdout, load_and_score};
use crate::GlobalArgs;

/// Execute the filter command.
pub fn execute(
    manifest: PathBuf,
    min: Option<u64>,
    max: Option<u64>,
    output: Option<PathBuf>,
    histogram: Option<PathBuf>,
    global: &GlobalArgs,
) -> Result<()> {
    let config = build_config(global, &manifest)?;
    let report = load_and_score(&manifest, &config)?;

    let filtered = report.table.filter(min, max);
    info!(?min, ?max, kept = filtered.len(), of = report.table.len(), "Filtered table");

    if let Some(path) = &histogram {
        render(
            &filtered.count_by_range(),
            path,
            &ChartLabels::filtered_brightness(),
        )
        .context("Failed to render filtered histogram")?;
    }

    emit_table(&filtered, output.as_deref())?;
    flush_stdout()
}
