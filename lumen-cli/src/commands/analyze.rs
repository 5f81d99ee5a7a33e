//! Analyze command implementation.
//!
//! The full run: load the manifest, score and bin every image, render the
//! histogram, persist the annotated manifest, then render a second histogram
//! over a filtered window.

use std::path::PathBuf;

use anyhow::{Context, Result};
use colored::Colorize;
use lumen_core::{render, ChartLabels, SortOrder};
use tracing::info;

use crate::utils::{build_config, format_counts, load_and_score, print_dropped};
use crate::{GlobalArgs, SortArg};

/// Paths and window for one analyze run.
pub struct AnalyzeOptions {
    pub annotation: PathBuf,
    pub processed_annotation: PathBuf,
    pub histogram: PathBuf,
    pub filtered_histogram: PathBuf,
    pub filter_min: u64,
    pub filter_max: u64,
    pub sort: Option<SortArg>,
}

/// Execute the analyze command.
pub fn execute(options: AnalyzeOptions, global: &GlobalArgs) -> Result<()> {
    let config = build_config(global, &options.annotation)?;
    let report = load_and_score(&options.annotation, &config)?;
    let table = &report.table;

    let counts = table.count_by_range();
    render(&counts, &options.histogram, &ChartLabels::brightness())
        .context("Failed to render brightness histogram")?;

    let persisted = match options.sort {
        Some(SortArg::Asc) => table.sort(SortOrder::Ascending),
        Some(SortArg::Desc) => table.sort(SortOrder::Descending),
        None => table.clone(),
    };
    persisted
        .write_csv(&options.processed_annotation)
        .context("Failed to write annotated manifest")?;

    let filtered = table.filter(Some(options.filter_min), Some(options.filter_max));
    render(
        &filtered.count_by_range(),
        &options.filtered_histogram,
        &ChartLabels::filtered_brightness(),
    )
    .context("Failed to render filtered histogram")?;

    info!(
        retained = table.len(),
        dropped = report.dropped.len(),
        filtered = filtered.len(),
        "Analysis complete"
    );

    if !global.quiet {
        println!();
        println!("{}", "Processing completed successfully.".green().bold());
        println!();
        println!(
            "   {} {} ({} rows)",
            "Manifest:".dimmed(),
            options.annotation.display(),
            report.total()
        );
        println!("   {} {}", "Bin size:".dimmed(), config.bin_size);
        println!("   {} {}", "Scored:".dimmed(), table.len());
        print_dropped(&report);
        println!(
            "   {} {}",
            "Annotated table:".dimmed(),
            options.processed_annotation.display()
        );
        println!(
            "   {} {}",
            "Histogram:".dimmed(),
            options.histogram.display()
        );
        println!(
            "   {} {} ({} files with range start in {}..={})",
            "Filtered histogram:".dimmed(),
            options.filtered_histogram.display(),
            filtered.len(),
            options.filter_min,
            options.filter_max
        );
        println!();
        print!("{}", format_counts(&counts));
    }

    Ok(())
}
