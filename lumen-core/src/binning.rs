//! Fixed-width brightness ranges.
//!
//! Ranges are 1-indexed and contiguous: with a bin size of 100 they are
//! `1-100`, `101-200`, `201-300` and so on. A score is truncated to an integer
//! before binning, so `0` and `99.9` both land in `1-100` while `100` lands in
//! `101-200`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::config::BinSize;
use crate::error::{LumenError, Result, ScoreError};

/// Closed interval `[start, end]`, serialized as `"{start}-{end}"`.
///
/// Ordering is numeric by `start` (then `end`), never lexical on the label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BinRange {
    start: u64,
    end: u64,
}

impl BinRange {
    /// Build a range from its bounds. `end` must not precede `start`.
    pub fn new(start: u64, end: u64) -> Result<Self> {
        if end < start {
            return Err(LumenError::InvalidRangeLabel(format!(
                "range end {end} precedes start {start}"
            )));
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> u64 {
        self.start
    }

    pub fn end(&self) -> u64 {
        self.end
    }

    pub fn width(&self) -> u64 {
        self.end - self.start + 1
    }

    /// Whether `start` is inside the inclusive window. Missing bounds are open.
    pub fn starts_within(&self, min: Option<u64>, max: Option<u64>) -> bool {
        min.is_none_or(|min| self.start >= min) && max.is_none_or(|max| self.start <= max)
    }
}

impl fmt::Display for BinRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

impl FromStr for BinRange {
    type Err = LumenError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || LumenError::InvalidRangeLabel(format!("'{s}' is not of the form start-end"));

        let (start, end) = s.trim().split_once('-').ok_or_else(invalid)?;
        let start: u64 = start.parse().map_err(|_| invalid())?;
        let end: u64 = end.parse().map_err(|_| invalid())?;
        Self::new(start, end)
    }
}

impl Serialize for BinRange {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for BinRange {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let label = String::deserialize(deserializer)?;
        label.parse().map_err(serde::de::Error::custom)
    }
}

/// Map a brightness score to its range.
///
/// The score is truncated toward zero, integer-divided by the bin size,
/// multiplied back and offset by one. Negative, NaN and infinite scores
/// cannot be binned.
pub fn assign(score: f64, bin_size: BinSize) -> std::result::Result<BinRange, ScoreError> {
    if score.is_nan() {
        return Err(ScoreError::Unassignable {
            score,
            reason: "score is NaN",
        });
    }
    if score.is_infinite() {
        return Err(ScoreError::Unassignable {
            score,
            reason: "score is infinite",
        });
    }
    if score < 0.0 {
        return Err(ScoreError::Unassignable {
            score,
            reason: "score is negative",
        });
    }
    if score >= u64::MAX as f64 {
        return Err(ScoreError::Unassignable {
            score,
            reason: "score exceeds the representable range",
        });
    }

    let size = bin_size.get();
    let truncated = score.trunc() as u64;
    let start = (truncated / size) * size + 1;
    let end = start
        .checked_add(size - 1)
        .ok_or(ScoreError::Unassignable {
            score,
            reason: "range end overflows",
        })?;

    Ok(BinRange { start, end })
}
