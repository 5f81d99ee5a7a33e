//! Bar-chart rendering of range counts.
//!
//! One bar per range, ordered by range start, bar height equal to the
//! count. Output is a PNG (or any format the bitmap backend infers from the
//! destination extension).

use std::error::Error;
use std::path::Path;
use std::sync::OnceLock;

use plotters::prelude::*;
use plotters::style::{register_font, FontStyle};
use tracing::{debug, info};

use crate::error::{LumenError, Result};
use crate::table::RangeCounts;

/// Rendered image size in pixels.
pub const CHART_SIZE: (u32, u32) = (1000, 600);

/// Font used for every chart label. Embedded so rendering never depends on
/// fonts installed on the host.
const SANS_SERIF_TTF: &[u8] = include_bytes!("../assets/DejaVuSans.ttf");

/// Register the embedded font under the `sans-serif` family, once per process.
fn ensure_font() -> std::result::Result<(), String> {
    static REGISTERED: OnceLock<std::result::Result<(), String>> = OnceLock::new();
    REGISTERED
        .get_or_init(|| {
            debug!("Registering embedded sans-serif font");
            register_font("sans-serif", FontStyle::Normal, SANS_SERIF_TTF)
                .map_err(|_| "embedded font is invalid".to_string())
        })
        .clone()
}

/// Title and axis captions for a histogram.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartLabels {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
}

impl ChartLabels {
    pub fn new(
        title: impl Into<String>,
        x_label: impl Into<String>,
        y_label: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            x_label: x_label.into(),
            y_label: y_label.into(),
        }
    }

    /// Captions for the histogram over the whole table.
    pub fn brightness() -> Self {
        Self::new(
            "Image brightness distribution",
            "Brightness range",
            "Number of files",
        )
    }

    /// Captions for the histogram over a filtered table.
    pub fn filtered_brightness() -> Self {
        Self::new(
            "Image brightness distribution after filtering",
            "Brightness range (filtered)",
            "Number of files",
        )
    }
}

impl Default for ChartLabels {
    fn default() -> Self {
        Self::brightness()
    }
}

/// Render `counts` as a labeled bar chart at `destination`.
///
/// An empty `counts` still produces a chart with axes and no bars.
pub fn render(counts: &RangeCounts, destination: &Path, labels: &ChartLabels) -> Result<()> {
    draw(counts, destination, labels).map_err(|e| LumenError::RenderError {
        path: destination.to_path_buf(),
        message: e.to_string(),
    })?;

    info!(
        path = %destination.display(),
        bars = counts.len(),
        files = counts.total(),
        "Rendered histogram"
    );
    Ok(())
}

fn draw(
    counts: &RangeCounts,
    destination: &Path,
    labels: &ChartLabels,
) -> std::result::Result<(), Box<dyn Error>> {
    let entries = counts.to_vec();
    let names: Vec<String> = entries.iter().map(|c| c.range.to_string()).collect();

    // Keep at least one slot so the axis range is never empty.
    let slots = entries.len().max(1) as u32;
    let y_max = (counts.max_count() as u32).max(1);
    let y_top = y_max + (y_max / 10).max(1);

    ensure_font()?;

    let root = BitMapBackend::new(destination, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(&labels.title, ("sans-serif", 24))
        .margin(15)
        .x_label_area_size(60)
        .y_label_area_size(60)
        .build_cartesian_2d((0u32..slots).into_segmented(), 0u32..y_top)?;

    let x_formatter = |value: &SegmentValue<u32>| match value {
        SegmentValue::CenterOf(index) => names.get(*index as usize).cloned().unwrap_or_default(),
        _ => String::new(),
    };

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_desc(labels.x_label.as_str())
        .y_desc(labels.y_label.as_str())
        .x_labels(slots as usize)
        .y_labels(y_top.min(10) as usize)
        .x_label_formatter(&x_formatter)
        .draw()?;

    chart.draw_series(
        Histogram::vertical(&chart)
            .style(BLUE.mix(0.6).filled())
            .margin(8)
            .data(
                entries
                    .iter()
                    .enumerate()
                    .map(|(index, entry)| (index as u32, entry.count as u32)),
            ),
    )?;

    root.present()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binning::BinRange;

    fn counts(labels: &[&str]) -> RangeCounts {
        labels
            .iter()
            .map(|s| s.parse::<BinRange>().unwrap())
            .collect()
    }

    #[test]
    fn test_default_labels() {
        let labels = ChartLabels::default();
        assert_eq!(labels.x_label, "Brightness range");
        assert_eq!(labels.y_label, "Number of files");
        assert_ne!(ChartLabels::filtered_brightness(), labels);
    }

    #[test]
    fn test_render_writes_png() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("hist.png");

        render(
            &counts(&["1-100", "101-200", "101-200", "201-300"]),
            &out,
            &ChartLabels::default(),
        )
        .unwrap();

        let image = image::open(&out).unwrap();
        assert_eq!((image.width(), image.height()), CHART_SIZE);
    }

    #[test]
    fn test_render_empty_counts() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("empty.png");
        render(&RangeCounts::default(), &out, &ChartLabels::filtered_brightness()).unwrap();
        assert!(out.exists());
    }

    #[test]
    fn test_render_unwritable_destination() {
        let err = render(
            &counts(&["1-100"]),
            Path::new("/nonexistent-dir/out/hist.png"),
            &ChartLabels::default(),
        )
        .unwrap_err();
        assert!(matches!(err, LumenError::RenderError { .. }));
    }
}
