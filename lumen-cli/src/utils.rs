//! Common utility functions shared across CLI commands.

use std::io::{self, Write};
use std::path::Path;

use anyhow::{Context, Result};
use colored::Colorize;
use lumen_core::{
    compute_ranges, load_manifest, AggregationTable, BinSize, PipelineConfig, RangeCounts,
    RangeReport, RasterScorer, ResolveStrategy,
};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::{GlobalArgs, ResolveArg};

/// Widest bar drawn in terminal count tables.
const BAR_WIDTH: usize = 40;

/// Install the stderr log subscriber. `RUST_LOG` takes precedence.
pub fn init_tracing(verbose: bool, quiet: bool) {
    let default_filter = if verbose {
        "lumen=debug,lumen_core=debug"
    } else if quiet {
        "error"
    } else {
        "warn"
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

/// Layer CLI flags over environment configuration.
pub fn build_config(global: &GlobalArgs, manifest: &Path) -> Result<PipelineConfig> {
    let mut config = PipelineConfig::from_env().context("Failed to read configuration")?;

    if let Some(size) = global.bin_size {
        config.bin_size = BinSize::new(size).context("Invalid --bin-size")?;
    }
    if let Some(strategy) = global.resolve_against {
        config.resolve_against = match strategy {
            ResolveArg::Cwd => ResolveStrategy::Cwd,
            ResolveArg::BaseDir => ResolveStrategy::BaseDir,
            ResolveArg::ManifestDir => ResolveStrategy::ManifestDir,
        };
    }
    if let Some(dir) = &global.base_dir {
        config.base_dir = dir.clone();
    }
    if global.parallel {
        config.parallel = true;
    }

    let config = config.with_manifest(manifest);
    debug!(?config, "Resolved configuration");
    Ok(config)
}

/// Load a manifest and score every row from disk.
pub fn load_and_score(manifest: &Path, config: &PipelineConfig) -> Result<RangeReport> {
    let records = load_manifest(manifest)
        .with_context(|| format!("Failed to load manifest: {}", manifest.display()))?;
    Ok(compute_ranges(records, config, &RasterScorer::new()))
}

/// Write a table as CSV to `output`, or to stdout when `output` is `None`.
pub fn emit_table(table: &AggregationTable, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => table
            .write_csv(path)
            .with_context(|| format!("Failed to write table: {}", path.display())),
        None => {
            let stdout = io::stdout();
            table
                .write_csv_to(stdout.lock())
                .context("Failed to write table to stdout")
        }
    }
}

/// Aligned range/count table with proportional bars.
pub fn format_counts(counts: &RangeCounts) -> String {
    let label_width = counts
        .iter()
        .map(|entry| entry.range.to_string().len())
        .max()
        .unwrap_or(0)
        .max("Range".len());
    let max_count = counts.max_count().max(1);

    let mut out = format!("{:<label_width$}  {:>6}\n", "Range", "Files");
    for entry in counts.iter() {
        let bar = "█".repeat((entry.count * BAR_WIDTH).div_ceil(max_count));
        out.push_str(&format!(
            "{:<label_width$}  {:>6}  {}\n",
            entry.range.to_string(),
            entry.count,
            bar
        ));
    }
    out
}

/// Print dropped rows with their reasons, dimmed.
pub fn print_dropped(report: &RangeReport) {
    if report.dropped.is_empty() {
        return;
    }
    println!(
        "   {} {} of {} images could not be scored",
        "Dropped:".dimmed(),
        report.dropped.len(),
        report.total()
    );
    for dropped in &report.dropped {
        println!(
            "     {} {}",
            format!("row {}:", dropped.index + 1).dimmed(),
            dropped.error.to_string().yellow()
        );
    }
}

/// Flush stdout so piped consumers see complete output before exit.
pub fn flush_stdout() -> Result<()> {
    io::stdout().flush().context("Failed to flush stdout")
}
