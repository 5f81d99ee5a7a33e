//! Aggregation table: manifest rows annotated with their brightness range.
//!
//! The table is produced once by [`compute_ranges`] and never mutated.
//! [`AggregationTable::sort`] and [`AggregationTable::filter`] return new
//! tables, and [`AggregationTable::count_by_range`] derives counts on demand.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::Write;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::binning::{assign, BinRange};
use crate::config::PipelineConfig;
use crate::error::{LumenError, Result, ScoreError};
use crate::manifest::ManifestRecord;
use crate::scorer::{score_record, BrightnessScorer};

/// Header of the persisted annotated manifest.
pub const TABLE_HEADER: [&str; 3] = ["absolute_path", "relative_path", "bin_range"];

/// A manifest row that was successfully scored and binned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoredRecord {
    pub absolute_path: String,
    pub relative_path: String,
    pub bin_range: BinRange,
}

impl ScoredRecord {
    pub fn new(record: ManifestRecord, bin_range: BinRange) -> Self {
        Self {
            absolute_path: record.absolute_path,
            relative_path: record.relative_path,
            bin_range,
        }
    }

    pub fn bin_start(&self) -> u64 {
        self.bin_range.start()
    }
}

/// A manifest row that was dropped because it could not be scored.
#[derive(Debug)]
pub struct DroppedRecord {
    /// Zero-based position in the manifest
    pub index: usize,
    pub record: ManifestRecord,
    pub error: ScoreError,
}

/// Result of one scoring pass.
#[derive(Debug)]
pub struct RangeReport {
    pub table: AggregationTable,
    /// Failures, in manifest order
    pub dropped: Vec<DroppedRecord>,
}

impl RangeReport {
    /// Number of manifest rows that went into the pass.
    pub fn total(&self) -> usize {
        self.table.len() + self.dropped.len()
    }
}

/// Direction for [`AggregationTable::sort`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

/// Score and bin every record.
///
/// Records whose score is unavailable or cannot be binned are dropped from
/// the table and reported in [`RangeReport::dropped`]. Retained records keep
/// their manifest order, including when scoring runs in parallel.
pub fn compute_ranges<S>(
    records: Vec<ManifestRecord>,
    config: &PipelineConfig,
    scorer: &S,
) -> RangeReport
where
    S: BrightnessScorer + ?Sized,
{
    let outcomes = score_all(&records, config, scorer);

    let mut rows = Vec::with_capacity(records.len());
    let mut dropped = Vec::new();

    for (index, (record, outcome)) in records.into_iter().zip(outcomes).enumerate() {
        match outcome {
            Ok(bin_range) => rows.push(ScoredRecord::new(record, bin_range)),
            Err(error) => {
                warn!(
                    index,
                    relative_path = %record.relative_path,
                    error = %error,
                    "Dropping record"
                );
                dropped.push(DroppedRecord {
                    index,
                    record,
                    error,
                });
            }
        }
    }

    info!(
        retained = rows.len(),
        dropped = dropped.len(),
        bin_size = %config.bin_size,
        resolve_against = %config.resolve_against,
        "Computed brightness ranges"
    );

    RangeReport {
        table: AggregationTable { records: rows },
        dropped,
    }
}

fn score_one<S>(
    record: &ManifestRecord,
    config: &PipelineConfig,
    scorer: &S,
) -> std::result::Result<BinRange, ScoreError>
where
    S: BrightnessScorer + ?Sized,
{
    let score = score_record(record, config, scorer)?;
    let range = assign(score.value(), config.bin_size)?;
    debug!(
        relative_path = %record.relative_path,
        score = score.value(),
        range = %range,
        "Scored record"
    );
    Ok(range)
}

#[cfg(feature = "parallel")]
fn score_all<S>(
    records: &[ManifestRecord],
    config: &PipelineConfig,
    scorer: &S,
) -> Vec<std::result::Result<BinRange, ScoreError>>
where
    S: BrightnessScorer + ?Sized,
{
    use rayon::prelude::*;

    if config.parallel {
        // Indexed collect keeps manifest order.
        records
            .par_iter()
            .map(|record| score_one(record, config, scorer))
            .collect()
    } else {
        records
            .iter()
            .map(|record| score_one(record, config, scorer))
            .collect()
    }
}

#[cfg(not(feature = "parallel"))]
fn score_all<S>(
    records: &[ManifestRecord],
    config: &PipelineConfig,
    scorer: &S,
) -> Vec<std::result::Result<BinRange, ScoreError>>
where
    S: BrightnessScorer + ?Sized,
{
    records
        .iter()
        .map(|record| score_one(record, config, scorer))
        .collect()
}

/// Ordered collection of scored records. Every row carries a range.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AggregationTable {
    records: Vec<ScoredRecord>,
}

impl AggregationTable {
    pub fn from_records(records: Vec<ScoredRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[ScoredRecord] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ScoredRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Rows ordered by range start. Equal starts keep manifest order.
    pub fn sort(&self, order: SortOrder) -> Self {
        let mut records = self.records.clone();
        // `sort_by_key` is stable, so ties stay in their original order.
        match order {
            SortOrder::Ascending => records.sort_by_key(ScoredRecord::bin_start),
            SortOrder::Descending => {
                records.sort_by_key(|r| std::cmp::Reverse(r.bin_start()))
            }
        }
        Self { records }
    }

    /// Rows whose range start lies in the inclusive `[min, max]` window.
    ///
    /// Bounds compare against the range start only, so `101-200` passes a
    /// `max = 150` filter.
    pub fn filter(&self, min: Option<u64>, max: Option<u64>) -> Self {
        let records = self
            .records
            .iter()
            .filter(|r| r.bin_range.starts_within(min, max))
            .cloned()
            .collect();
        Self { records }
    }

    /// Occurrences per range, ascending by range start.
    pub fn count_by_range(&self) -> RangeCounts {
        self.records.iter().map(|r| r.bin_range).collect()
    }

    /// Write the annotated table as CSV with a header row.
    pub fn write_csv(&self, path: &Path) -> Result<()> {
        let persist_error = |source: csv::Error| LumenError::PersistError {
            path: path.to_path_buf(),
            source,
        };

        let file = File::create(path).map_err(|e| persist_error(e.into()))?;
        self.write_csv_to(file).map_err(persist_error)?;

        info!(path = %path.display(), rows = self.len(), "Wrote annotated manifest");
        Ok(())
    }

    /// Write the annotated table as CSV to any writer.
    pub fn write_csv_to<W: Write>(&self, writer: W) -> std::result::Result<(), csv::Error> {
        let mut csv_writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(writer);

        // Explicit header so an empty table still produces one.
        csv_writer.write_record(TABLE_HEADER)?;
        for record in &self.records {
            csv_writer.serialize(record)?;
        }
        csv_writer.flush()?;
        Ok(())
    }
}

impl<'a> IntoIterator for &'a AggregationTable {
    type Item = &'a ScoredRecord;
    type IntoIter = std::slice::Iter<'a, ScoredRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

/// One entry of [`RangeCounts`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RangeCount {
    pub range: BinRange,
    pub count: usize,
}

/// Occurrence count per range, ordered by numeric range start.
///
/// Always derived from a table, never stored alongside it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RangeCounts {
    counts: BTreeMap<BinRange, usize>,
}

impl RangeCounts {
    pub fn get(&self, range: &BinRange) -> usize {
        self.counts.get(range).copied().unwrap_or(0)
    }

    /// Entries ascending by range start.
    pub fn iter(&self) -> impl Iterator<Item = RangeCount> + '_ {
        self.counts
            .iter()
            .map(|(&range, &count)| RangeCount { range, count })
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Sum of all counts.
    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }

    /// Largest single count, zero when empty.
    pub fn max_count(&self) -> usize {
        self.counts.values().copied().max().unwrap_or(0)
    }

    /// Counts as an ordered `[{range, count}]` list.
    pub fn to_vec(&self) -> Vec<RangeCount> {
        self.iter().collect()
    }
}

impl FromIterator<BinRange> for RangeCounts {
    fn from_iter<I: IntoIterator<Item = BinRange>>(iter: I) -> Self {
        let mut counts = BTreeMap::new();
        for range in iter {
            *counts.entry(range).or_insert(0) += 1;
        }
        Self { counts }
    }
}

impl Serialize for RangeCounts {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_seq(self.iter())
    }
}
