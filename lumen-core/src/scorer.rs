//! Brightness scoring for single images.
//!
//! A brightness score is the mean of every channel value over every pixel of
//! the image decoded as 8-bit RGB. Because each pixel contributes exactly
//! three values, this equals the mean over pixels of each pixel's channel
//! mean. No rounding happens here; binning truncates later.
//!
//! Scoring never aborts a batch. Every failure comes back as a
//! [`ScoreError`] for the caller to drop.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use image::{ImageError, ImageReader, RgbImage};
use serde::Serialize;

use crate::config::PipelineConfig;
use crate::error::ScoreError;
use crate::manifest::ManifestRecord;

/// Scalar brightness of one image. Always finite and non-negative when
/// produced by [`RasterScorer`].
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize)]
pub struct BrightnessScore(f64);

impl BrightnessScore {
    pub fn new(value: f64) -> Self {
        Self(value)
    }

    pub fn value(self) -> f64 {
        self.0
    }
}

/// Source of brightness scores.
///
/// Implementations must be thread-safe (`Send + Sync`) so batches can be
/// scored on the rayon pool.
pub trait BrightnessScorer: Send + Sync {
    /// Score the image at `path`.
    fn score(&self, path: &Path) -> Result<BrightnessScore, ScoreError>;
}

/// Scorer that decodes image files from disk.
#[derive(Debug, Clone, Copy, Default)]
pub struct RasterScorer;

impl RasterScorer {
    pub fn new() -> Self {
        Self
    }
}

impl BrightnessScorer for RasterScorer {
    fn score(&self, path: &Path) -> Result<BrightnessScore, ScoreError> {
        // Sniff the format from content so misnamed files still decode.
        let image = ImageReader::open(path)
            .and_then(ImageReader::with_guessed_format)
            .map_err(ImageError::IoError)
            .and_then(ImageReader::decode)
            .map_err(|source| ScoreError::Decode {
                path: path.to_path_buf(),
                source,
            })?;

        mean_brightness(&image.to_rgb8()).ok_or_else(|| ScoreError::EmptyImage {
            path: path.to_path_buf(),
        })
    }
}

/// Resolve `record`'s relative path under `config` and score it.
pub fn score_record<S>(
    record: &ManifestRecord,
    config: &PipelineConfig,
    scorer: &S,
) -> Result<BrightnessScore, ScoreError>
where
    S: BrightnessScorer + ?Sized,
{
    scorer.score(&config.resolve(&record.relative_path))
}

/// Mean of all channel values of an RGB raster, or `None` for an empty one.
pub fn mean_brightness(image: &RgbImage) -> Option<BrightnessScore> {
    let samples = image.as_raw();
    if samples.is_empty() {
        return None;
    }

    let sum: u64 = samples.iter().map(|&v| u64::from(v)).sum();
    Some(BrightnessScore(sum as f64 / samples.len() as f64))
}

/// Deterministic scorer backed by a lookup table.
///
/// Paths without an entry fail with [`ScoreError::Missing`], which lets
/// tests exercise the drop path without touching the filesystem.
#[derive(Debug, Clone, Default)]
pub struct FixedScorer {
    scores: HashMap<PathBuf, f64>,
}

impl FixedScorer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `score` for `path`, replacing any earlier entry.
    pub fn with(mut self, path: impl Into<PathBuf>, score: f64) -> Self {
        self.scores.insert(path.into(), score);
        self
    }
}

impl<P: Into<PathBuf>> FromIterator<(P, f64)> for FixedScorer {
    fn from_iter<I: IntoIterator<Item = (P, f64)>>(iter: I) -> Self {
        Self {
            scores: iter.into_iter().map(|(p, s)| (p.into(), s)).collect(),
        }
    }
}

impl BrightnessScorer for FixedScorer {
    fn score(&self, path: &Path) -> Result<BrightnessScore, ScoreError> {
        self.scores
            .get(path)
            .copied()
            .map(BrightnessScore)
            .ok_or_else(|| ScoreError::Missing {
                path: path.to_path_buf(),
            })
    }
}
