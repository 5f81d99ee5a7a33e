//! CLI integration tests for lumen-cli.
//!
//! These tests run the actual binary against generated images and check
//! outputs, exit codes, and file artifacts.

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use image::{ImageBuffer, Rgb, RgbImage};
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Get a Command for the lumen binary.
fn lumen() -> Command {
    let mut cmd: Command = cargo_bin_cmd!("lumen").into();
    for var in [
        "LUMEN_BIN_SIZE",
        "LUMEN_RESOLVE_AGAINST",
        "LUMEN_BASE_DIR",
        "LUMEN_PARALLEL",
        "RUST_LOG",
    ] {
        cmd.env_remove(var);
    }
    cmd
}

fn solid(level: u8) -> RgbImage {
    ImageBuffer::from_pixel(8, 8, Rgb([level, level, level]))
}

/// Dataset with one image per (name, level) pair plus a manifest using
/// paths relative to the dataset directory.
fn dataset(temp: &TempDir, images: &[(&str, u8)], extra_rows: &[&str]) -> PathBuf {
    let mut body = String::new();
    for (name, level) in images {
        let path = temp.path().join(name);
        solid(*level).save(&path).unwrap();
        body.push_str(&format!("{},{}\n", path.display(), name));
    }
    for name in extra_rows {
        body.push_str(&format!("{},{}\n", temp.path().join(name).display(), name));
    }
    let manifest = temp.path().join("annotation.csv");
    fs::write(&manifest, body).unwrap();
    manifest
}

fn arg(path: &Path) -> &str {
    path.to_str().unwrap()
}

// ============================================================================
// Help and Version Tests
// ============================================================================

#[test]
fn test_help_displays_usage() {
    lumen()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Image brightness binning and histograms",
        ))
        .stdout(predicate::str::contains("analyze"))
        .stdout(predicate::str::contains("sort"))
        .stdout(predicate::str::contains("filter"))
        .stdout(predicate::str::contains("counts"))
        .stdout(predicate::str::contains("browse"));
}

#[test]
fn test_version_displays_version() {
    lumen()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("lumen"));
}

#[test]
fn test_help_shows_exit_codes() {
    lumen()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Exit codes:"))
        .stdout(predicate::str::contains("65"))
        .stdout(predicate::str::contains("66"));
}

#[test]
fn test_analyze_help_shows_options() {
    lumen()
        .args(["analyze", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--annotation"))
        .stdout(predicate::str::contains("--processed-annotation"))
        .stdout(predicate::str::contains("--filtered-histogram"))
        .stdout(predicate::str::contains("--base-dir"));
}

// ============================================================================
// Exit Code Tests
// ============================================================================

#[test]
fn test_missing_manifest_returns_input_error() {
    let temp = TempDir::new().unwrap();

    // Exit code 66 = EX_NOINPUT
    lumen()
        .current_dir(temp.path())
        .args(["analyze", "--annotation", "nonexistent.csv"])
        .assert()
        .code(66)
        .stderr(predicate::str::contains("Manifest not found"));
}

#[test]
fn test_malformed_manifest_returns_data_error() {
    let temp = TempDir::new().unwrap();
    let manifest = temp.path().join("bad.csv");
    fs::write(&manifest, "a.png,a.png\nb.png,b.png,extra\n").unwrap();

    // Exit code 65 = EX_DATAERR
    lumen()
        .args(["counts", arg(&manifest)])
        .assert()
        .code(65)
        .stderr(predicate::str::contains("Malformed manifest"));
}

#[test]
fn test_zero_bin_size_returns_usage_error() {
    let temp = TempDir::new().unwrap();
    let manifest = dataset(&temp, &[("a.png", 10)], &[]);

    // Exit code 64 = EX_USAGE
    lumen()
        .args(["counts", "--bin-size", "0", arg(&manifest)])
        .assert()
        .code(64)
        .stderr(predicate::str::contains("Invalid bin size"));
}

#[test]
fn test_invalid_env_config_returns_usage_error() {
    let temp = TempDir::new().unwrap();
    let manifest = dataset(&temp, &[("a.png", 10)], &[]);

    lumen()
        .env("LUMEN_RESOLVE_AGAINST", "somewhere")
        .args(["counts", arg(&manifest)])
        .assert()
        .code(64);
}

#[test]
fn test_unwritable_histogram_returns_io_error() {
    let temp = TempDir::new().unwrap();
    let manifest = dataset(&temp, &[("a.png", 10)], &[]);

    // Exit code 74 = EX_IOERR
    lumen()
        .current_dir(temp.path())
        .args([
            "analyze",
            "--annotation",
            arg(&manifest),
            "--histogram",
            "no/such/dir/hist.png",
        ])
        .assert()
        .code(74)
        .stderr(predicate::str::contains("Failed to render brightness histogram"));
}

// ============================================================================
// Analyze Tests
// ============================================================================

#[test]
fn test_analyze_produces_all_artifacts() {
    let temp = TempDir::new().unwrap();
    let manifest = dataset(
        &temp,
        &[("dark.png", 20), ("mid.png", 150), ("bright.png", 240)],
        &["missing.png"],
    );

    // Relative paths resolve from the working directory by default.
    lumen()
        .current_dir(temp.path())
        .args(["analyze", "--annotation", arg(&manifest)])
        .assert()
        .success()
        .stdout(predicate::str::contains("Processing completed successfully"))
        .stdout(predicate::str::contains("1 of 4 images could not be scored"))
        .stdout(predicate::str::contains("101-200"));

    let table = fs::read_to_string(temp.path().join("processed_annotation.csv")).unwrap();
    let lines: Vec<&str> = table.lines().collect();
    assert_eq!(lines[0], "absolute_path,relative_path,bin_range");
    assert_eq!(lines.len(), 4, "Missing image should be dropped");
    assert!(lines[1].ends_with("dark.png,1-100"));
    assert!(lines[2].ends_with("mid.png,101-200"));
    assert!(lines[3].ends_with("bright.png,201-300"));

    assert!(temp.path().join("brightness_histogram.png").exists());
    assert!(temp
        .path()
        .join("filtered_brightness_histogram.png")
        .exists());
}

#[test]
fn test_analyze_quiet_prints_nothing() {
    let temp = TempDir::new().unwrap();
    let manifest = dataset(&temp, &[("a.png", 10)], &[]);

    lumen()
        .current_dir(temp.path())
        .args(["--quiet", "analyze", "--annotation", arg(&manifest)])
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}

#[test]
fn test_analyze_accepts_original_flag_spellings() {
    let temp = TempDir::new().unwrap();
    let manifest = dataset(&temp, &[("a.png", 10)], &[]);
    let out = temp.path().join("out.csv");

    lumen()
        .current_dir(temp.path())
        .args([
            "analyze",
            "-a",
            arg(&manifest),
            "--processed_annotation",
            arg(&out),
            "--brightness_histogram",
            "h.png",
            "--filtered_brightness_histogram",
            "f.png",
            "--base_dir",
            ".",
        ])
        .assert()
        .success();

    assert!(out.exists());
    assert!(temp.path().join("h.png").exists());
    assert!(temp.path().join("f.png").exists());
}

#[test]
fn test_cwd_resolution_ignores_base_dir() {
    let temp = TempDir::new().unwrap();
    let images = temp.path().join("images");
    fs::create_dir(&images).unwrap();
    solid(50).save(images.join("x.png")).unwrap();
    let manifest = temp.path().join("annotation.csv");
    fs::write(&manifest, "/elsewhere/x.png,x.png\n").unwrap();

    // Default resolution uses the relative path as written; --base-dir is unused.
    lumen()
        .current_dir(temp.path())
        .args(["counts", "--format", "csv", "--base-dir", "images", arg(&manifest)])
        .assert()
        .success()
        .stdout("range,count\n");

    lumen()
        .current_dir(temp.path())
        .args([
            "counts",
            "--format",
            "csv",
            "--base-dir",
            "images",
            "--resolve-against",
            "base-dir",
            arg(&manifest),
        ])
        .assert()
        .success()
        .stdout("range,count\n1-100,1\n");
}

// ============================================================================
// Sort, Filter and Counts Tests
// ============================================================================

#[test]
fn test_sort_orders_by_range_start() {
    let temp = TempDir::new().unwrap();
    let manifest = dataset(
        &temp,
        &[("c.png", 230), ("a.png", 10), ("b1.png", 120), ("b2.png", 180)],
        &[],
    );

    let output = lumen()
        .args(["--resolve-against", "manifest-dir", "sort", arg(&manifest)])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let text = String::from_utf8(output).unwrap();
    let names: Vec<&str> = text
        .lines()
        .skip(1)
        .map(|line| line.split(',').nth(1).unwrap())
        .collect();
    assert_eq!(names, vec!["a.png", "b1.png", "b2.png", "c.png"]);

    let output = lumen()
        .args([
            "--resolve-against",
            "manifest-dir",
            "sort",
            "--descending",
            arg(&manifest),
        ])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let text = String::from_utf8(output).unwrap();
    let names: Vec<&str> = text
        .lines()
        .skip(1)
        .map(|line| line.split(',').nth(1).unwrap())
        .collect();
    assert_eq!(names, vec!["c.png", "b1.png", "b2.png", "a.png"]);
}

#[test]
fn test_filter_window_and_histogram() {
    let temp = TempDir::new().unwrap();
    let manifest = dataset(
        &temp,
        &[("a.png", 10), ("b.png", 120), ("c.png", 230), ("d.png", 199)],
        &[],
    );
    let out = temp.path().join("filtered.csv");
    let hist = temp.path().join("filtered.png");

    lumen()
        .args([
            "--resolve-against",
            "manifest-dir",
            "filter",
            "--min",
            "101",
            "--max",
            "200",
            "--output",
            arg(&out),
            "--histogram",
            arg(&hist),
            arg(&manifest),
        ])
        .assert()
        .success();

    let table = fs::read_to_string(&out).unwrap();
    let ranges: Vec<&str> = table
        .lines()
        .skip(1)
        .map(|line| line.rsplit(',').next().unwrap())
        .collect();
    assert_eq!(ranges, vec!["101-200", "101-200"]);
    assert!(hist.exists());
}

#[test]
fn test_counts_json_is_ordered_numerically() {
    let temp = TempDir::new().unwrap();
    let manifest = dataset(
        &temp,
        &[("a.png", 250), ("b.png", 5), ("c.png", 105), ("d.png", 15)],
        &[],
    );

    let output = lumen()
        .args([
            "--resolve-against",
            "manifest-dir",
            "counts",
            "--format",
            "json",
            arg(&manifest),
        ])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let counts: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(
        counts,
        serde_json::json!([
            {"range": "1-100", "count": 2},
            {"range": "101-200", "count": 1},
            {"range": "201-300", "count": 1}
        ])
    );
}

#[test]
fn test_bin_size_from_env_and_flag() {
    let temp = TempDir::new().unwrap();
    let manifest = dataset(&temp, &[("a.png", 60), ("b.png", 130)], &[]);

    lumen()
        .env("LUMEN_BIN_SIZE", "50")
        .env("LUMEN_RESOLVE_AGAINST", "manifest-dir")
        .args(["counts", "--format", "csv", arg(&manifest)])
        .assert()
        .success()
        .stdout("range,count\n51-100,1\n101-150,1\n");

    // The flag wins over the environment.
    lumen()
        .env("LUMEN_BIN_SIZE", "50")
        .env("LUMEN_RESOLVE_AGAINST", "manifest-dir")
        .args(["counts", "--bin-size", "200", "--format", "csv", arg(&manifest)])
        .assert()
        .success()
        .stdout("range,count\n1-200,2\n");
}

// ============================================================================
// Browse Tests
// ============================================================================

#[test]
fn test_browse_reports_each_entry() {
    let temp = TempDir::new().unwrap();
    RgbImage::from_pixel(1600, 1200, Rgb([9, 9, 9]))
        .save(temp.path().join("big.png"))
        .unwrap();
    let manifest = temp.path().join("annotation.csv");
    fs::write(&manifest, "big.png,big.png\nghost.png,ghost.png\n").unwrap();

    lumen()
        .args(["browse", arg(&manifest)])
        .assert()
        .success()
        .stdout(predicate::str::contains("1600x1200 -> 800x600"))
        .stdout(predicate::str::contains("not found"))
        .stdout(predicate::str::contains("1 displayed, 1 skipped"));
}

#[test]
fn test_browse_limit() {
    let temp = TempDir::new().unwrap();
    let manifest = dataset(&temp, &[("a.png", 1), ("b.png", 2), ("c.png", 3)], &[]);

    lumen()
        .args(["browse", "--limit", "2", arg(&manifest)])
        .assert()
        .success()
        .stdout(predicate::str::contains("2 displayed, 0 skipped"));
}
