//! Manifest loading.
//!
//! A manifest is a headerless, two-column CSV of `(absolute_path,
//! relative_path)` pairs. Row order is preserved and is the identity of a
//! record for the rest of the pipeline.

use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{LumenError, Result};

/// Number of fields every manifest row must carry.
pub const MANIFEST_COLUMNS: usize = 2;

/// One manifest row. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestRecord {
    pub absolute_path: String,
    pub relative_path: String,
}

impl ManifestRecord {
    pub fn new(absolute_path: impl Into<String>, relative_path: impl Into<String>) -> Self {
        Self {
            absolute_path: absolute_path.into(),
            relative_path: relative_path.into(),
        }
    }
}

/// Load a manifest from disk.
pub fn load_manifest(path: &Path) -> Result<Vec<ManifestRecord>> {
    let file = File::open(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => LumenError::ManifestNotFound {
            path: path.to_path_buf(),
        },
        _ => LumenError::ManifestUnreadable {
            path: path.to_path_buf(),
            source: e,
        },
    })?;

    let records = read_manifest(file, path)?;
    info!(path = %path.display(), rows = records.len(), "Loaded manifest");
    Ok(records)
}

/// Parse manifest rows from any reader. `origin` is only used in errors.
pub fn read_manifest<R: Read>(reader: R, origin: &Path) -> Result<Vec<ManifestRecord>> {
    let malformed = |reason: String| LumenError::ManifestMalformed {
        path: origin.to_path_buf(),
        reason,
    };

    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    let mut records = Vec::new();
    for (row, result) in csv_reader.records().enumerate() {
        let raw = result.map_err(|e| match e.into_kind() {
            csv::ErrorKind::Io(io_err) => LumenError::ManifestUnreadable {
                path: origin.to_path_buf(),
                source: io_err,
            },
            kind => malformed(format!("row {}: {:?}", row + 1, kind)),
        })?;

        if raw.len() != MANIFEST_COLUMNS {
            return Err(malformed(format!(
                "row {} has {} fields, expected {}",
                row + 1,
                raw.len(),
                MANIFEST_COLUMNS
            )));
        }

        let record = ManifestRecord::new(&raw[0], &raw[1]);
        debug!(
            row,
            absolute_path = %record.absolute_path,
            relative_path = %record.relative_path,
            "Manifest row"
        );
        records.push(record);
    }

    if records.is_empty() {
        return Err(malformed("manifest contains no rows".into()));
    }

    Ok(records)
}

/// Directory a manifest lives in, used to anchor relative image paths.
pub fn manifest_dir(path: &Path) -> PathBuf {
    path.parent().map(Path::to_path_buf).unwrap_or_default()
}
