//! Figure rendering with plotters
//!
//! The output path's extension picks the backend: `.svg` renders vector
//! output, anything else goes through the bitmap backend (PNG by default).
//! Figure sizes are given in inches and scaled by the requested DPI; font
//! sizes are given in points and scale the same way.

use crate::cli::PlotKind;
use crate::error::{Result, VetoError};
use crate::histogram::{finite_extent, Histogram};
use crate::population::{PopulationKind, PopulationSample};
use crate::simulation::SimulationReport;
use crate::stress::StressReport;
use plotters::coord::Shift;
use plotters::element::DashedPathElement;
use plotters::prelude::*;
use plotters_backend::DrawingErrorKind;
use std::path::{Path, PathBuf};

/// Highest accepted resolution
pub const MAX_DPI: u32 = 1200;

/// Default output path of the baseline simulation figure
pub const DEFAULT_SIMULATION_OUT: &str = "figure3_parallax_veto.png";

/// Default output path of the stress-test figure
pub const DEFAULT_STRESS_OUT: &str = "figure4_spurious_tracklets_hist.png";

/// Baseline figure size (inches)
pub const SIMULATION_FIGURE_INCHES: (f64, f64) = (10.0, 6.0);

/// Stress-test figure size (inches)
pub const STRESS_FIGURE_INCHES: (f64, f64) = (10.0, 5.5);

/// Bins in the stress-test histogram
pub const STRESS_HISTOGRAM_BINS: usize = 80;

/// Bins in the baseline displacement histogram
pub const SIMULATION_HISTOGRAM_BINS: usize = 120;

const BACKGROUND_COLOR: RGBColor = RGBColor(31, 119, 180);
const TNO_COLOR: RGBColor = RGBColor(255, 127, 14);
const SIGNAL_COLOR: RGBColor = RGBColor(44, 160, 44);
const WINDOW_COLOR: RGBColor = RGBColor(214, 39, 40);

const FONT: &str = "sans-serif";

type DrawResult<T, DB> =
    std::result::Result<T, DrawingAreaErrorKind<<DB as DrawingBackend>::ErrorType>>;

type DashedSegment = DashedPathElement<std::vec::IntoIter<(f64, f64)>, u32>;

/// Where and how large to write a figure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FigureOptions {
    pub out: PathBuf,
    pub dpi: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BackendKind {
    Bitmap,
    Svg,
}

impl FigureOptions {
    /// Validate options
    pub fn validate(&self) -> Result<()> {
        if self.dpi == 0 || self.dpi > MAX_DPI {
            return Err(VetoError::invalid(format!(
                "dpi must be in 1..={MAX_DPI}, got {}",
                self.dpi
            )));
        }
        if self.out.as_os_str().is_empty() {
            return Err(VetoError::invalid("output path must not be empty"));
        }
        Ok(())
    }

    /// Pixel dimensions of a figure of `inches` at this DPI
    pub fn pixel_size(&self, inches: (f64, f64)) -> (u32, u32) {
        let px = |len: f64| ((len * f64::from(self.dpi)).round() as u32).max(1);
        (px(inches.0), px(inches.1))
    }

    fn backend(&self) -> BackendKind {
        match self.out.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("svg") => BackendKind::Svg,
            _ => BackendKind::Bitmap,
        }
    }
}

/// Point-to-pixel scaling for one figure
#[derive(Debug, Clone, Copy)]
struct Scale {
    dpi: f64,
}

impl Scale {
    fn px(&self, points: f64) -> u32 {
        ((points * self.dpi / 72.0).round() as u32).max(1)
    }

    fn px_i32(&self, points: f64) -> i32 {
        self.px(points) as i32
    }
}

/// Open the backend for `options` and run `$draw(&root, ...)` on it
macro_rules! render_with_backend {
    ($options:expr, $inches:expr, $draw:ident ( $($arg:expr),* )) => {{
        let options: &FigureOptions = $options;
        options.validate()?;
        let size = options.pixel_size($inches);
        let scale = Scale {
            dpi: f64::from(options.dpi),
        };
        let outcome = match options.backend() {
            BackendKind::Svg => {
                let root = SVGBackend::new(&options.out, size).into_drawing_area();
                $draw(&root, scale, $($arg),*).map_err(|e| figure_error(&options.out, e))
            }
            BackendKind::Bitmap => {
                let root = BitMapBackend::new(&options.out, size).into_drawing_area();
                $draw(&root, scale, $($arg),*).map_err(|e| figure_error(&options.out, e))
            }
        };
        if outcome.is_ok() {
            tracing::info!(
                path = %options.out.display(),
                width = size.0,
                height = size.1,
                "figure written"
            );
        }
        outcome
    }};
}

/// Write the stress-test histogram with the veto window marked
pub fn render_stress_figure(report: &StressReport, options: &FigureOptions) -> Result<()> {
    render_with_backend!(options, STRESS_FIGURE_INCHES, draw_stress(report))
}

/// Write the baseline simulation figure
pub fn render_simulation_figure(
    report: &SimulationReport,
    kind: PlotKind,
    options: &FigureOptions,
) -> Result<()> {
    match kind {
        PlotKind::Histogram => render_with_backend!(
            options,
            SIMULATION_FIGURE_INCHES,
            draw_simulation_histogram(report)
        ),
        PlotKind::Scatter => render_with_backend!(
            options,
            SIMULATION_FIGURE_INCHES,
            draw_simulation_scatter(report)
        ),
    }
}

/// Only backend write failures are file access problems
fn figure_error<E>(path: &Path, err: DrawingAreaErrorKind<E>) -> VetoError
where
    E: std::error::Error + Send + Sync,
{
    match err {
        DrawingAreaErrorKind::BackendError(DrawingErrorKind::DrawingError(e)) => {
            VetoError::io(path, e)
        }
        other => VetoError::render(path, other),
    }
}

/// Window threshold line between two chart points, dashed in pixel space
fn dashed_segment(from: (f64, f64), to: (f64, f64), scale: Scale) -> DashedSegment {
    DashedPathElement::new(
        vec![from, to],
        scale.px(6.0),
        scale.px(3.5),
        WINDOW_COLOR.stroke_width(scale.px(2.0)),
    )
}

fn histogram_bars(hist: &Histogram, color: RGBColor, alpha: f64) -> Vec<Rectangle<(f64, f64)>> {
    hist.bins()
        .filter(|(_, _, count)| *count > 0)
        .map(|(left, right, count)| {
            Rectangle::new([(left, 0.0), (right, count as f64)], color.mix(alpha).filled())
        })
        .collect()
}

/// Plot-area corner an annotation box is pinned to
#[derive(Debug, Clone, Copy)]
enum Corner {
    TopLeft,
    BottomLeft,
}

/// Boxed multi-line annotation inside the plotting `area`
fn draw_annotation<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    area: (std::ops::Range<i32>, std::ops::Range<i32>),
    corner: Corner,
    lines: &[String],
    scale: Scale,
) -> DrawResult<(), DB> {
    let font_px = scale.px(11.0);
    let pad = scale.px_i32(6.0);
    let line_h = (f64::from(font_px) * 1.3).round() as i32;
    let widest = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0);
    let box_w = (widest as f64 * f64::from(font_px) * 0.55).round() as i32 + 2 * pad;
    let box_h = line_h * lines.len() as i32 + 2 * pad;

    let x0 = area.0.start + pad;
    let y0 = match corner {
        Corner::TopLeft => area.1.start + pad,
        Corner::BottomLeft => area.1.end - pad - box_h,
    };
    root.draw(&Rectangle::new(
        [(x0, y0), (x0 + box_w, y0 + box_h)],
        WHITE.mix(0.85).filled(),
    ))?;
    root.draw(&Rectangle::new(
        [(x0, y0), (x0 + box_w, y0 + box_h)],
        BLACK.mix(0.4).stroke_width(1),
    ))?;
    for (i, line) in lines.iter().enumerate() {
        root.draw(&Text::new(
            line.clone(),
            (x0 + pad, y0 + pad + line_h * i as i32),
            (FONT, font_px).into_font(),
        ))?;
    }
    Ok(())
}

fn draw_stress<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    scale: Scale,
    report: &StressReport,
) -> DrawResult<(), DB> {
    let s = &report.summary;
    let hist = Histogram::linear(
        &report.displacements,
        s.disp_min,
        s.disp_max,
        STRESS_HISTOGRAM_BINS,
    )
    .unwrap_or_else(|_| Histogram::empty(s.disp_min, s.disp_max));
    let y_max = (hist.max_count() as f64 * 1.1).max(1.0);

    root.fill(&WHITE)?;
    let mut chart = ChartBuilder::on(root)
        .caption(
            "Dirty-Data Stress Test: Spurious Tracklets vs Shell-Window Veto",
            (FONT, scale.px(14.0)),
        )
        .margin(scale.px(8.0))
        .x_label_area_size(scale.px(36.0))
        .y_label_area_size(scale.px(48.0))
        .build_cartesian_2d(s.disp_min..s.disp_max, 0.0..y_max)?;

    chart
        .configure_mesh()
        .light_line_style(BLACK.mix(0.05))
        .bold_line_style(BLACK.mix(0.2))
        .x_desc(format!(
            "Total sky-plane displacement over {} days (arcsec)",
            s.baseline_days
        ))
        .y_desc("Count")
        .label_style((FONT, scale.px(10.0)))
        .axis_desc_style((FONT, scale.px(11.0)))
        .draw()?;

    chart.draw_series(histogram_bars(&hist, BACKGROUND_COLOR, 0.9))?;

    // Edges off the axis would map far outside the pixel range
    for edge in [s.window.limit_min, s.window.limit_max] {
        if (s.disp_min..=s.disp_max).contains(&edge) {
            chart.draw_series(std::iter::once(dashed_segment(
                (edge, 0.0),
                (edge, y_max),
                scale,
            )))?;
        }
    }

    let lines = vec![
        format!("N = {}", s.n_artifacts),
        format!(
            "Window = [{:.2}, {:.2}] arcsec",
            s.window.limit_min, s.window.limit_max
        ),
        format!("Passed = {} (f_bg={:.4})", s.n_passed, s.f_bg),
        format!("Rejection = {:.2}%", s.rejection_rate * 100.0),
    ];
    let area = chart.plotting_area().get_pixel_range();
    draw_annotation(root, area, Corner::TopLeft, &lines, scale)?;

    root.present()?;
    Ok(())
}

fn population_color(kind: PopulationKind) -> RGBColor {
    match kind {
        PopulationKind::MainBelt | PopulationKind::Spurious => BACKGROUND_COLOR,
        PopulationKind::OrdinaryTno => TNO_COLOR,
        PopulationKind::Signal => SIGNAL_COLOR,
    }
}

/// Positive extent of `values`, padded by `pad` in log10 space
fn log_extent(values: impl Iterator<Item = f64>, pad: f64) -> (f64, f64) {
    let positive: Vec<f64> = values.filter(|v| *v > 0.0).collect();
    let (lo, hi) = finite_extent(&positive).unwrap_or((1.0, 10.0));
    let (lo, hi) = if lo < hi { (lo, hi) } else { (lo / 2.0, hi * 2.0) };
    (lo / 10f64.powf(pad), hi * 10f64.powf(pad))
}

fn window_rates(report: &SimulationReport) -> Vec<String> {
    let s = &report.summary;
    vec![
        format!("Recovery Rate: {:.1}%", s.recovery_rate * 100.0),
        format!("Rejection Rate: {:.1}%", s.rejection_rate * 100.0),
    ]
}

fn draw_simulation_histogram<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    scale: Scale,
    report: &SimulationReport,
) -> DrawResult<(), DB> {
    let s = &report.summary;
    let all = report
        .populations
        .iter()
        .flat_map(|p| p.displacements.iter().copied())
        .chain([s.window.limit_min, s.window.limit_max]);
    let (x_lo, x_hi) = log_extent(all, 0.05);

    let log_hist = |values: &[f64]| {
        Histogram::log_spaced(values, x_lo, x_hi, SIMULATION_HISTOGRAM_BINS)
            .unwrap_or_else(|_| Histogram::empty(x_lo, x_hi))
    };
    let background = log_hist(&report.background_displacements());
    let signal = log_hist(&report.signal_displacements());
    let y_max = (background.max_count().max(signal.max_count()) as f64 * 1.1).max(1.0);

    root.fill(&WHITE)?;
    let mut chart = ChartBuilder::on(root)
        .caption(
            format!(
                "Efficacy of Parallax-Based Veto Filter ({:.0} AU Shell)",
                s.target_dist
            ),
            (FONT, scale.px(14.0)),
        )
        .margin(scale.px(8.0))
        .x_label_area_size(scale.px(36.0))
        .y_label_area_size(scale.px(48.0))
        .build_cartesian_2d((x_lo..x_hi).log_scale(), 0.0..y_max)?;

    chart
        .configure_mesh()
        .light_line_style(BLACK.mix(0.05))
        .bold_line_style(BLACK.mix(0.2))
        .x_desc(format!(
            "Sky-Plane Motion over {} days (arcsec)",
            s.baseline_days
        ))
        .y_desc("Count")
        .label_style((FONT, scale.px(10.0)))
        .axis_desc_style((FONT, scale.px(11.0)))
        .draw()?;

    let legend_px = scale.px_i32(5.0);
    chart
        .draw_series(histogram_bars(&background, BACKGROUND_COLOR, 0.6))?
        .label("Background (Main Belt + TNOs)")
        .legend(move |(x, y)| {
            Rectangle::new(
                [(x, y - legend_px), (x + 2 * legend_px, y + legend_px)],
                BACKGROUND_COLOR.filled(),
            )
        });
    chart
        .draw_series(histogram_bars(&signal, SIGNAL_COLOR, 0.8))?
        .label(PopulationKind::Signal.label())
        .legend(move |(x, y)| {
            Rectangle::new(
                [(x, y - legend_px), (x + 2 * legend_px, y + legend_px)],
                SIGNAL_COLOR.filled(),
            )
        });

    let width = scale.px(2.0);
    chart
        .draw_series(std::iter::once(dashed_segment(
            (s.window.limit_min, 0.0),
            (s.window.limit_min, y_max),
            scale,
        )))?
        .label("Filter Thresholds")
        .legend(move |(x, y)| {
            PathElement::new(
                vec![(x, y), (x + 2 * legend_px, y)],
                WINDOW_COLOR.stroke_width(width),
            )
        });
    chart.draw_series(std::iter::once(dashed_segment(
        (s.window.limit_max, 0.0),
        (s.window.limit_max, y_max),
        scale,
    )))?;

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperRight)
        .background_style(WHITE.mix(0.85))
        .border_style(BLACK.mix(0.4))
        .label_font((FONT, scale.px(10.0)))
        .draw()?;

    let area = chart.plotting_area().get_pixel_range();
    draw_annotation(root, area, Corner::TopLeft, &window_rates(report), scale)?;

    root.present()?;
    Ok(())
}

fn scatter_points(sample: &PopulationSample, radius: u32) -> Vec<Circle<(f64, f64), u32>> {
    let alpha = if sample.kind.is_signal() { 0.8 } else { 0.5 };
    let color = population_color(sample.kind);
    sample
        .distances
        .iter()
        .zip(&sample.displacements)
        .filter(|(d, m)| **d > 0.0 && **m > 0.0)
        .map(|(&d, &m)| Circle::new((d, m), radius, color.mix(alpha).filled()))
        .collect()
}

fn draw_simulation_scatter<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    scale: Scale,
    report: &SimulationReport,
) -> DrawResult<(), DB> {
    let s = &report.summary;
    let (x_lo, x_hi) = log_extent(
        report.populations.iter().flat_map(|p| p.distances.iter().copied()),
        0.1,
    );
    let (y_lo, y_hi) = log_extent(
        report
            .populations
            .iter()
            .flat_map(|p| p.displacements.iter().copied())
            .chain([s.window.limit_min, s.window.limit_max]),
        0.1,
    );

    root.fill(&WHITE)?;
    let mut chart = ChartBuilder::on(root)
        .caption(
            format!(
                "Efficacy of Parallax-Based Veto Filter ({:.0} AU Shell)",
                s.target_dist
            ),
            (FONT, scale.px(14.0)),
        )
        .margin(scale.px(8.0))
        .x_label_area_size(scale.px(36.0))
        .y_label_area_size(scale.px(48.0))
        .build_cartesian_2d((x_lo..x_hi).log_scale(), (y_lo..y_hi).log_scale())?;

    chart
        .configure_mesh()
        .light_line_style(BLACK.mix(0.05))
        .bold_line_style(BLACK.mix(0.2))
        .x_desc("Heliocentric Distance (AU)")
        .y_desc(format!(
            "Sky-Plane Motion over {} days (arcsec)",
            s.baseline_days
        ))
        .label_style((FONT, scale.px(10.0)))
        .axis_desc_style((FONT, scale.px(11.0)))
        .draw()?;

    let legend_px = scale.px_i32(4.0);
    for sample in &report.populations {
        let radius = if sample.kind.is_signal() {
            scale.px(2.0)
        } else {
            scale.px(1.4)
        };
        let color = population_color(sample.kind);
        chart
            .draw_series(scatter_points(sample, radius))?
            .label(sample.kind.label())
            .legend(move |(x, y)| Circle::new((x + legend_px, y), legend_px as u32, color.filled()));
    }

    let width = scale.px(2.0);
    chart
        .draw_series(std::iter::once(dashed_segment(
            (x_lo, s.window.limit_max),
            (x_hi, s.window.limit_max),
            scale,
        )))?
        .label("Filter Thresholds")
        .legend(move |(x, y)| {
            PathElement::new(
                vec![(x, y), (x + 2 * legend_px, y)],
                WINDOW_COLOR.stroke_width(width),
            )
        });
    chart.draw_series(std::iter::once(dashed_segment(
        (x_lo, s.window.limit_min),
        (x_hi, s.window.limit_min),
        scale,
    )))?;

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperRight)
        .background_style(WHITE.mix(0.85))
        .border_style(BLACK.mix(0.4))
        .label_font((FONT, scale.px(10.0)))
        .draw()?;

    // Bottom-left stays clear of the dense main-belt cloud
    let area = chart.plotting_area().get_pixel_range();
    draw_annotation(root, area, Corner::BottomLeft, &window_rates(report), scale)?;

    root.present()?;
    Ok(())
}
