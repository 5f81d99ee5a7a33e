//! Sort command implementation.

use std::path::PathBuf;

use anyhow::Result;
use lumen_core::SortOrder;
use tracing::info;

use crate::utils::{build_config, emit_table, flush_stdout, load_and_score};
use crate::GlobalArgs;

/// Execute the sort command.
pub fn execute(
    manifest: PathBuf,
    descending: bool,
    output: Option<PathBuf>,
    global: &GlobalArgs,
) -> Result<()> {
    let config = build_config(global, &manifest)?;
    let report = load_and_score(&manifest, &config)?;

    let order = if descending {
        SortOrder::Descending
    } else {
        SortOrder::Ascending
    };
    let sorted = report.table.sort(order);
    info!(?order, rows = sorted.len(), "Sorted table");

    emit_table(&sorted, output.as_deref())?;
    flush_stdout()
}
