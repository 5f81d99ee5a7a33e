use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum LumenError {
    #[error("Manifest not found: {}", path.display())]
    ManifestNotFound { path: PathBuf },

    #[error("Malformed manifest {}: {reason}", path.display())]
    ManifestMalformed { path: PathBuf, reason: String },

    #[error("Failed to read manifest {}: {source}", path.display())]
    ManifestUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid bin size: {0}")]
    InvalidBinSize(String),

    #[error("Invalid range label: {0}")]
    InvalidRangeLabel(String),

    #[error("Failed to render histogram to {}: {message}", path.display())]
    RenderError { path: PathBuf, message: String },

    #[error("Failed to write table to {}: {source}", path.display())]
    PersistError {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, LumenError>;

/// Per-record failure. Contained at the item level and never escalated.
#[derive(Error, Debug)]
pub enum ScoreError {
    #[error("Failed to decode {}: {source}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("Image has no pixels: {}", path.display())]
    EmptyImage { path: PathBuf },

    #[error("Score {score} cannot be binned: {reason}")]
    Unassignable { score: f64, reason: &'static str },

    #[error("No score registered for {}", path.display())]
    Missing { path: PathBuf },
}
