//! Browse command implementation.
//!
//! Walks a manifest through a [`ManifestCursor`] one path at a time, the way
//! an image viewer pulls images, and reports what a viewer would display.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use colored::Colorize;
use lumen_core::{fit_within, ManifestCursor};
use tracing::{debug, warn};

use crate::GlobalArgs;

/// What the viewer would do with one manifest entry.
#[derive(Debug, PartialEq, Eq)]
enum Entry {
    Displayed {
        original: (u32, u32),
        fitted: (u32, u32),
    },
    Missing,
    Unreadable(String),
}

fn inspect(path: &Path, region: (u32, u32)) -> Entry {
    if !path.exists() {
        return Entry::Missing;
    }
    match image::image_dimensions(path) {
        Ok(original) => Entry::Displayed {
            original,
            fitted: fit_within(original, region),
        },
        Err(e) => Entry::Unreadable(e.to_string()),
    }
}

/// Execute the browse command.
pub fn execute(
    manifest: PathBuf,
    region: (u32, u32),
    limit: Option<usize>,
    global: &GlobalArgs,
) -> Result<()> {
    let mut cursor = ManifestCursor::new(&manifest);
    cursor
        .open()
        .with_context(|| format!("Failed to load manifest: {}", manifest.display()))?;

    let mut shown = 0usize;
    let mut missing = 0usize;

    while let Some(path) = cursor.next_path() {
        if limit.is_some_and(|limit| shown + missing >= limit) {
            break;
        }

        let resolved = cursor.resolve(&path);
        let entry = inspect(&resolved, region);
        debug!(path = %resolved.display(), ?entry, "Browsed entry");

        match &entry {
            Entry::Displayed { original, fitted } => {
                shown += 1;
                if !global.quiet {
                    println!(
                        "{} {}x{} -> {}x{}",
                        resolved.display(),
                        original.0,
                        original.1,
                        fitted.0,
                        fitted.1
                    );
                }
            }
            Entry::Missing => {
                missing += 1;
                warn!(path = %resolved.display(), "Image not found");
                if !global.quiet {
                    println!("{} {}", resolved.display(), "not found".yellow());
                }
            }
            Entry::Unreadable(reason) => {
                missing += 1;
                warn!(path = %resolved.display(), %reason, "Image could not be loaded");
                if !global.quiet {
                    println!("{} {}", resolved.display(), "could not be loaded".yellow());
                }
            }
        }
    }

    cursor.close();

    if !global.quiet {
        println!();
        println!(
            "{} {} displayed, {} skipped",
            "End of dataset.".bold(),
            shown,
            missing
        );
    }

    Ok(())
}
