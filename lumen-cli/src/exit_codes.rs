//! Exit codes following sysexits.h conventions.
//!
//! These codes provide semantic meaning for different failure modes,
//! enabling scripts and CI systems to handle errors appropriately.

use lumen_core::LumenError;

/// Successful execution.
#[allow(dead_code)]
pub const SUCCESS: i32 = 0;

/// General error (catch-all).
pub const GENERAL_ERROR: i32 = 1;

/// Command line usage error (invalid bin size, bad configuration).
/// Maps to EX_USAGE from sysexits.h.
pub const USAGE_ERROR: i32 = 64;

/// Data format error (malformed manifest, bad range label).
/// Maps to EX_DATAERR from sysexits.h.
pub const DATA_ERROR: i32 = 65;

/// Cannot open input file.
/// Maps to EX_NOINPUT from sysexits.h.
pub const INPUT_ERROR: i32 = 66;

/// I/O error (cannot write table or histogram).
/// Maps to EX_IOERR from sysexits.h.
pub const IO_ERROR: i32 = 74;

/// Represents an exit code with optional error context.
pub struct ExitCode {
    pub code: i32,
    pub message: Option<String>,
}

impl ExitCode {
    pub fn from_anyhow(err: &anyhow::Error) -> Self {
        let message = format!("{err:#}");

        // Classify by the first pipeline error found in the chain
        let code = err
            .chain()
            .find_map(|cause| cause.downcast_ref::<LumenError>())
            .map(classify)
            .unwrap_or_else(|| {
                if err.chain().any(|cause| cause.is::<std::io::Error>()) {
                    IO_ERROR
                } else {
                    GENERAL_ERROR
                }
            });

        Self {
            code,
            message: Some(message),
        }
    }
}

fn classify(err: &LumenError) -> i32 {
    match err {
        LumenError::ManifestNotFound { .. } | LumenError::ManifestUnreadable { .. } => INPUT_ERROR,
        LumenError::ManifestMalformed { .. } | LumenError::InvalidRangeLabel(_) => DATA_ERROR,
        LumenError::InvalidBinSize(_) | LumenError::InvalidConfig(_) => USAGE_ERROR,
        LumenError::RenderError { .. } | LumenError::PersistError { .. } => IO_ERROR,
    }
}
