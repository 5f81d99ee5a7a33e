//! Sequential access to a manifest for viewers.
//!
//! A cursor hands out one path at a time in manifest order. Opening loads
//! the rows and rewinds; reopening after exhaustion starts from the first
//! row again. A single consumer is assumed.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::Result;
use crate::manifest::{load_manifest, manifest_dir, ManifestRecord};

/// Forward-only, restartable-on-open cursor over a manifest.
#[derive(Debug)]
pub struct ManifestCursor {
    manifest_path: PathBuf,
    rows: Option<Vec<ManifestRecord>>,
    position: usize,
}

impl ManifestCursor {
    pub fn new(manifest_path: impl Into<PathBuf>) -> Self {
        Self {
            manifest_path: manifest_path.into(),
            rows: None,
            position: 0,
        }
    }

    /// Open the cursor over an already-loaded row list.
    pub fn from_records(manifest_path: impl Into<PathBuf>, rows: Vec<ManifestRecord>) -> Self {
        Self {
            manifest_path: manifest_path.into(),
            rows: Some(rows),
            position: 0,
        }
    }

    pub fn manifest_path(&self) -> &Path {
        &self.manifest_path
    }

    /// Load the rows (first call only) and rewind to the first row.
    pub fn open(&mut self) -> Result<()> {
        if self.rows.is_none() {
            self.rows = Some(load_manifest(&self.manifest_path)?);
        }
        self.position = 0;
        debug!(path = %self.manifest_path.display(), rows = self.len(), "Opened manifest cursor");
        Ok(())
    }

    pub fn is_open(&self) -> bool {
        self.rows.is_some()
    }

    /// Release the loaded rows. `next_path` returns `None` until reopened.
    pub fn close(&mut self) {
        self.rows = None;
        self.position = 0;
    }

    /// Next unread path (the manifest's first column), or `None` when the
    /// rows are exhausted or the cursor is closed.
    pub fn next_path(&mut self) -> Option<PathBuf> {
        let record = self.rows.as_ref()?.get(self.position)?;
        self.position += 1;
        Some(PathBuf::from(&record.absolute_path))
    }

    /// Rows not yet handed out.
    pub fn remaining(&self) -> usize {
        self.len().saturating_sub(self.position)
    }

    pub fn len(&self) -> usize {
        self.rows.as_ref().map_or(0, Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Resolve a path handed out by this cursor for display.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        resolve_for_viewer(path, &self.manifest_path)
    }
}

impl Iterator for ManifestCursor {
    type Item = PathBuf;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_path()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.remaining();
        (remaining, Some(remaining))
    }
}

/// Relative paths are taken relative to the manifest's directory.
pub fn resolve_for_viewer(path: &Path, manifest_path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        manifest_dir(manifest_path).join(path)
    }
}

/// Largest size with the image's aspect ratio that fits inside `region`.
///
/// Images already inside the region keep their size. Zero-sized inputs
/// yield `(0, 0)`.
pub fn fit_within(image: (u32, u32), region: (u32, u32)) -> (u32, u32) {
    let (width, height) = image;
    let (max_width, max_height) = region;
    if width == 0 || height == 0 || max_width == 0 || max_height == 0 {
        return (0, 0);
    }
    if width <= max_width && height <= max_height {
        return (width, height);
    }

    let scale = f64::min(
        max_width as f64 / width as f64,
        max_height as f64 / height as f64,
    );
    let fitted_width = ((width as f64 * scale).round() as u32).clamp(1, max_width);
    let fitted_height = ((height as f64 * scale).round() as u32).clamp(1, max_height);
    (fitted_width, fitted_height)
}
