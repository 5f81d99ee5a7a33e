//! Lumen Core - Brightness binning and aggregation for image manifests
//!
//! This crate turns a manifest of image paths into an annotated table where
//! each image is assigned a fixed-width brightness range, and derives range
//! histograms from that table.
//!
//! # Pipeline
//!
//! - **Manifest loading**: headerless two-column CSV of absolute/relative paths
//! - **Scoring**: mean channel value of each decoded image, failures isolated per row
//! - **Binning**: 1-indexed ranges such as `1-100`, `101-200`, ...
//! - **Aggregation**: sort, filter and count over the immutable table
//! - **Rendering**: labeled bar chart of range counts
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use lumen_core::{compute_ranges, load_manifest, PipelineConfig, RasterScorer, SortOrder};
//!
//! # fn example() -> lumen_core::Result<()> {
//! let manifest = Path::new("annotation.csv");
//! let config = PipelineConfig::from_env()?.with_manifest(manifest);
//!
//! let report = compute_ranges(load_manifest(manifest)?, &config, &RasterScorer::new());
//! println!("dropped {} unreadable images", report.dropped.len());
//!
//! let table = report.table;
//! let darkest_first = table.sort(SortOrder::Ascending);
//! let mid_tones = table.filter(Some(101), Some(200));
//! for entry in mid_tones.count_by_range().iter() {
//!     println!("{}: {}", entry.range, entry.count);
//! }
//! darkest_first.write_csv(Path::new("processed_annotation.csv"))?;
//! # Ok(())
//! # }
//! ```

pub mod binning;
pub mod config;
pub mod cursor;
pub mod error;
#[cfg(feature = "render")]
pub mod histogram;
pub mod manifest;
pub mod scorer;
pub mod table;

// Re-export main types for convenience
pub use binning::{assign, BinRange};
pub use config::{BinSize, PipelineConfig, ResolveStrategy, DEFAULT_BIN_SIZE};
pub use cursor::{fit_within, resolve_for_viewer, ManifestCursor};
pub use error::{LumenError, Result, ScoreError};
pub use manifest::{load_manifest, read_manifest, ManifestRecord};
pub use scorer::{score_record, BrightnessScore, BrightnessScorer, FixedScorer, RasterScorer};
pub use table::{
    compute_ranges, AggregationTable, DroppedRecord, RangeCount, RangeCounts, RangeReport,
    ScoredRecord, SortOrder,
};

#[cfg(feature = "render")]
pub use histogram::{render, ChartLabels};
