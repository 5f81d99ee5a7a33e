//! Pipeline configuration.
//!
//! Values come from defaults, then environment variables, then whatever the
//! caller layers on top (the CLI applies its flags last).

use std::fmt;
use std::num::NonZeroU64;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::{LumenError, Result};
use crate::manifest::manifest_dir;

/// Default width of a brightness range.
pub const DEFAULT_BIN_SIZE: u64 = 100;

const DEFAULT_BIN_SIZE_NONZERO: NonZeroU64 = match NonZeroU64::new(DEFAULT_BIN_SIZE) {
    Some(size) => size,
    None => unreachable!(),
};

/// Validated, strictly positive bin width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BinSize(NonZeroU64);

impl BinSize {
    pub fn new(size: u64) -> Result<Self> {
        NonZeroU64::new(size)
            .map(Self)
            .ok_or_else(|| LumenError::InvalidBinSize("bin size must be greater than zero".into()))
    }

    pub fn get(self) -> u64 {
        self.0.get()
    }
}

impl Default for BinSize {
    fn default() -> Self {
        Self(DEFAULT_BIN_SIZE_NONZERO)
    }
}

impl fmt::Display for BinSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for BinSize {
    type Err = LumenError;

    fn from_str(s: &str) -> Result<Self> {
        let size: u64 = s
            .trim()
            .parse()
            .map_err(|_| LumenError::InvalidBinSize(format!("'{s}' is not a positive integer")))?;
        Self::new(size)
    }
}

/// Where an image's relative path is resolved before decoding.
///
/// `Cwd` uses the manifest's relative path exactly as written, so it is
/// resolved against the process working directory. The base directory is
/// ignored in that mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResolveStrategy {
    #[default]
    Cwd,
    BaseDir,
    ManifestDir,
}

impl ResolveStrategy {
    /// Resolve `relative` for decoding. Absolute inputs pass through untouched.
    pub fn resolve(self, relative: &str, base_dir: &Path, manifest_dir: Option<&Path>) -> PathBuf {
        let relative = Path::new(relative);
        match self {
            Self::Cwd => relative.to_path_buf(),
            Self::BaseDir => base_dir.join(relative),
            Self::ManifestDir => match manifest_dir {
                Some(dir) => dir.join(relative),
                None => relative.to_path_buf(),
            },
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Cwd => "cwd",
            Self::BaseDir => "base-dir",
            Self::ManifestDir => "manifest-dir",
        }
    }
}

impl fmt::Display for ResolveStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResolveStrategy {
    type Err = LumenError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().replace('_', "-").as_str() {
            "cwd" => Ok(Self::Cwd),
            "base-dir" => Ok(Self::BaseDir),
            "manifest-dir" => Ok(Self::ManifestDir),
            other => Err(LumenError::InvalidConfig(format!(
                "unknown resolve strategy '{other}' (expected cwd, base-dir or manifest-dir)"
            ))),
        }
    }
}

/// Settings for one pipeline run.
#[derive(Debug, Clone, Default)]
pub struct PipelineConfig {
    /// Width of each brightness range (default: 100)
    pub bin_size: BinSize,
    /// How relative image paths are located (default: cwd)
    pub resolve_against: ResolveStrategy,
    /// Directory used by `ResolveStrategy::BaseDir` (default: empty)
    pub base_dir: PathBuf,
    /// Directory containing the manifest, used by `ResolveStrategy::ManifestDir`
    pub manifest_dir: Option<PathBuf>,
    /// Score records on the rayon pool (default: false)
    pub parallel: bool,
}

impl PipelineConfig {
    /// Load configuration from environment variables.
    ///
    /// Absent variables fall back to defaults; present but unparseable ones
    /// are rejected rather than silently ignored.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an injectable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(size) = lookup("LUMEN_BIN_SIZE") {
            config.bin_size = size.parse()?;
        }

        if let Some(strategy) = lookup("LUMEN_RESOLVE_AGAINST") {
            config.resolve_against = strategy.parse()?;
        }

        if let Some(dir) = lookup("LUMEN_BASE_DIR") {
            config.base_dir = PathBuf::from(dir);
        }

        if let Some(flag) = lookup("LUMEN_PARALLEL") {
            config.parallel = match flag.trim().to_lowercase().as_str() {
                "1" | "true" | "yes" => true,
                "0" | "false" | "no" | "" => false,
                other => {
                    return Err(LumenError::InvalidConfig(format!(
                        "LUMEN_PARALLEL must be true or false, got '{other}'"
                    )))
                }
            };
        }

        Ok(config)
    }

    /// Record the manifest location so `ManifestDir` resolution has an anchor.
    pub fn with_manifest(mut self, manifest_path: &Path) -> Self {
        self.manifest_dir = Some(manifest_dir(manifest_path));
        self
    }

    /// Path that will be handed to the decoder for `relative`.
    pub fn resolve(&self, relative: &str) -> PathBuf {
        self.resolve_against
            .resolve(relative, &self.base_dir, self.manifest_dir.as_deref())
    }
}
