use crate::{
    env::Env,
    tasks::{
        color::{get_color_from_label, FONT_SIZE, MARKER_SIZE, STROKE_WIDTH},
        dataset::Measurements,
        fit::ReferenceFit,
    },
};
use anyhow::Result;
use log::{error, info};
use plotters::{prelude::*, series::DashedLineSeries};
use std::{
    fs,
    ops::Range,
    path::{Path, PathBuf},
};

pub const TITLE: &str = "Search Time vs. log2(Dataset Size) for AVL Tree";
pub const X_DESC: &str = "log2(Dataset Size)";
pub const Y_DESC: &str = "Elapsed Time (seconds)";
pub const OBSERVED_LABEL: &str = "Observed Search Times (AVL Tree)";
pub const REFERENCE_LABEL: &str = "Reference O(log n) Curve";

#[derive(Clone, Debug)]
pub struct PlotConfig {
    pub width: u32,
    pub height: u32,
    pub grid: bool,
}

impl Default for PlotConfig {
    fn default() -> Self {
        Self {
            width: 1000,
            height: 600,
            grid: true,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Series {
    pub label: String,
    pub points: Vec<(f64, f64)>,
}

/// Everything the chart needs, resolved before touching the drawing backend.
#[derive(Clone, Debug)]
pub struct ChartDesc {
    pub title: String,
    pub x_desc: String,
    pub y_desc: String,
    pub observed: Series,
    pub reference: Series,
    pub x_range: Range<f64>,
    pub y_range: Range<f64>,
    pub grid: bool,
    pub size: (u32, u32),
}

impl ChartDesc {
    pub fn for_fit(measurements: &Measurements, fit: &ReferenceFit, config: &PlotConfig) -> Self {
        let observed = Series {
            label: OBSERVED_LABEL.to_string(),
            points: fit
                .log_dataset_sizes
                .iter()
                .copied()
                .zip(measurements.elapsed_times().iter().copied())
                .collect(),
        };
        let reference = Series {
            label: REFERENCE_LABEL.to_string(),
            points: fit
                .log_dataset_sizes
                .iter()
                .copied()
                .zip(fit.reference_curve.iter().copied())
                .collect(),
        };

        let x_range = padded_range(&fit.log_dataset_sizes);
        let y_max = observed
            .points
            .iter()
            .chain(reference.points.iter())
            .map(|(_, y)| *y)
            .fold(0.0_f64, f64::max);
        let y_range = if y_max > 0.0 {
            0.0..y_max * 1.1
        } else {
            0.0..1.0
        };

        Self {
            title: TITLE.to_string(),
            x_desc: X_DESC.to_string(),
            y_desc: Y_DESC.to_string(),
            observed,
            reference,
            x_range,
            y_range,
            grid: config.grid,
            size: (config.width, config.height),
        }
    }
}

// Pad the x axis by 5% on each side so end markers are not clipped
fn padded_range(values: &[f64]) -> Range<f64> {
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    let padding = if max > min { (max - min) * 0.05 } else { 0.5 };
    (min - padding)..(max + padding)
}

pub fn default_plot_path() -> PathBuf {
    let mut plot_path = Env::output_root();
    plot_path.push("recorded");
    plot_path.push("plots");
    plot_path.push("avl_search.svg");
    plot_path
}

pub fn render(desc: &ChartDesc, plot_path: &Path) -> Result<()> {
    if let Some(parent) = plot_path.parent() {
        fs::create_dir_all(parent).map_err(|e| {
            let reason = format!(
                "error creating plot directory (path={}, error={e:?})",
                parent.display()
            );
            error!("{reason}");
            anyhow::anyhow!(reason)
        })?;
    }

    let observed_color = get_color_from_label("observed")?;
    let reference_color = get_color_from_label("reference")?;
    let grid_color = get_color_from_label("grid")?;

    let root = SVGBackend::new(plot_path, desc.size).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(&desc.title, ("sans-serif", FONT_SIZE).into_font())
        .margin(20)
        .x_label_area_size(50)
        .y_label_area_size(90)
        .build_cartesian_2d(desc.x_range.clone(), desc.y_range.clone())?;

    let x_label_formatter = |x: &f64| format!("{x:.1}");
    let y_label_formatter = |y: &f64| format!("{y:.1e}");

    let mut mesh = chart.configure_mesh();
    mesh.x_desc(desc.x_desc.as_str())
        .y_desc(desc.y_desc.as_str())
        .x_label_style(("sans-serif", FONT_SIZE - 6).into_font())
        .y_label_style(("sans-serif", FONT_SIZE - 6).into_font())
        .x_label_formatter(&x_label_formatter)
        .y_label_formatter(&y_label_formatter);
    if desc.grid {
        mesh.bold_line_style(grid_color).light_line_style(WHITE);
    } else {
        mesh.disable_mesh();
    }
    mesh.draw()?;

    // Observed: solid line with circle markers
    chart
        .draw_series(LineSeries::new(
            desc.observed.points.iter().copied(),
            observed_color.stroke_width(STROKE_WIDTH),
        ))?
        .label(desc.observed.label.as_str())
        .legend(move |(x, y)| {
            PathElement::new(
                vec![(x, y), (x + 20, y)],
                observed_color.stroke_width(STROKE_WIDTH),
            )
        });
    chart.draw_series(
        desc.observed
            .points
            .iter()
            .map(|point| Circle::new(*point, MARKER_SIZE, observed_color.filled())),
    )?;

    // Reference: red dashed line
    chart
        .draw_series(DashedLineSeries::new(
            desc.reference.points.iter().copied(),
            10,
            6,
            reference_color.stroke_width(STROKE_WIDTH),
        ))?
        .label(desc.reference.label.as_str())
        .legend(move |(x, y)| {
            PathElement::new(
                vec![(x, y), (x + 20, y)],
                reference_color.stroke_width(STROKE_WIDTH),
            )
        });

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperLeft)
        .label_font(("sans-serif", FONT_SIZE - 4).into_font())
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;

    root.present()?;
    info!("generated plot at: {}", plot_path.display());

    Ok(())
}

/// Fit the reference curve to `measurements` and render both curves to
/// `plot_path`.
pub fn plot(
    measurements: &Measurements,
    config: &PlotConfig,
    plot_path: &Path,
) -> Result<ReferenceFit> {
    let fit = ReferenceFit::compute(measurements)?;
    let desc = ChartDesc::for_fit(measurements, &fit, config);
    render(&desc, plot_path)?;

    Ok(fit)
}
