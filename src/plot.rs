use std::fmt;
use std::path::Path;

use anyhow::{Context, Result, bail};
use plotters::coord::Shift;
use plotters::coord::ranged1d::{AsRangedCoord, Ranged, ValueFormatter};
use plotters::coord::types::RangedCoordf64;
use plotters::prelude::*;

// ---------------------------------------------------------------------------
// Figure description – what to draw, independent of the backend
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineStyle {
    Solid,
    Dashed,
    DashDotted,
}

/// One plotted line.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub label: String,
    pub points: Vec<(f64, f64)>,
    pub color: RGBColor,
    pub style: LineStyle,
}

/// How x tick values are printed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TickLabels {
    Plain,
    /// Values are minutes since `base` minutes past midnight, printed `HH:MM`.
    TimeOfDay { base: f64 },
}

impl TickLabels {
    pub fn format(&self, v: f64) -> String {
        match *self {
            TickLabels::Plain => format!("{v}"),
            TickLabels::TimeOfDay { base } => {
                let total = (v + base).round().rem_euclid(24.0 * 60.0) as u32;
                format!("{:02}:{:02}", total / 60, total % 60)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Axis {
    pub title: String,
    /// Fixed range; derived from the data when `None`.
    pub range: Option<(f64, f64)>,
    /// Tick spacing from the start of the range; plotters picks when `None`.
    pub step: Option<f64>,
}

impl Axis {
    pub fn new(title: &str) -> Self {
        Axis {
            title: title.to_string(),
            range: None,
            step: None,
        }
    }

    pub fn with_range(mut self, lo: f64, hi: f64) -> Self {
        self.range = Some((lo, hi));
        self
    }

    /// Ticks every `step`. Non-positive steps are ignored.
    pub fn with_step(mut self, step: f64) -> Self {
        self.step = (step > 0.0 && step.is_finite()).then_some(step);
        self
    }

    /// The fixed range, or the data extent padded so flat lines stay visible.
    fn resolve(&self, values: impl Iterator<Item = f64>) -> (f64, f64) {
        if let Some(range) = self.range {
            return range;
        }
        let (lo, hi) = values
            .filter(|v| v.is_finite())
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
                (lo.min(v), hi.max(v))
            });
        if !lo.is_finite() {
            return (0.0, 1.0);
        }
        if hi - lo < f64::EPSILON {
            return (lo - 0.5, hi + 0.5);
        }
        (lo, hi)
    }
}

/// A y axis with the series drawn against it.
#[derive(Debug, Clone, PartialEq)]
pub struct Panel {
    pub y: Axis,
    pub series: Vec<Series>,
}

/// A figure: one shared x axis, panels stacked top to bottom.
#[derive(Debug, Clone, PartialEq)]
pub struct Figure {
    pub x: Axis,
    pub x_ticks: TickLabels,
    pub panels: Vec<Panel>,
    pub legend: bool,
    /// Pixel size of the whole figure.
    pub size: (u32, u32),
}

/// Pixels per centimetre of the rendered figures (96 dpi).
pub const PX_PER_CM: f64 = 96.0 / 2.54;

/// Physical size of a rendered figure.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FigureSize {
    pub width_cm: f64,
    pub height_cm: f64,
}

impl FigureSize {
    pub fn from_pixels((w, h): (u32, u32)) -> Self {
        FigureSize {
            width_cm: w as f64 / PX_PER_CM,
            height_cm: h as f64 / PX_PER_CM,
        }
    }
}

impl fmt::Display for FigureSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "figure height = {:.1} cm", self.height_cm)?;
        write!(f, "figure width = {:.1} cm", self.width_cm)
    }
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

/// Render `figure` to `path`, SVG or PNG by extension. Parent directories
/// are created.
pub fn render(figure: &Figure, path: &Path) -> Result<FigureSize> {
    if figure.panels.is_empty() {
        bail!("figure for {} has no panels", path.display());
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }

    let drawn = match path.extension().and_then(|e| e.to_str()) {
        Some("svg") => {
            let root = SVGBackend::new(path, figure.size).into_drawing_area();
            draw_figure(root, figure)
        }
        Some("png") => {
            let root = BitMapBackend::new(path, figure.size).into_drawing_area();
            draw_figure(root, figure)
        }
        _ => bail!("{}: figures are written as .svg or .png", path.display()),
    };
    drawn.with_context(|| format!("plotting {}", path.display()))?;

    log::info!("wrote {}", path.display());
    Ok(FigureSize::from_pixels(figure.size))
}

fn draw_figure<DB>(root: DrawingArea<DB, Shift>, figure: &Figure) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    root.fill(&WHITE)?;

    let (lo, hi) = figure.x.resolve(
        figure
            .panels
            .iter()
            .flat_map(|p| &p.series)
            .flat_map(|s| s.points.iter().map(|&(x, _)| x)),
    );

    let areas = root.split_evenly((figure.panels.len(), 1));
    let last = areas.len() - 1;
    for (i, (area, panel)) in areas.iter().zip(&figure.panels).enumerate() {
        let is_last = i == last;
        match figure.x.step {
            Some(step) => {
                let x_spec = (lo..hi).step(step);
                draw_panel(area, x_spec, figure, panel, is_last)?
            }
            None => draw_panel(area, lo..hi, figure, panel, is_last)?,
        }
    }

    root.present()?;
    Ok(())
}

/// Multiples of `step` from `lo` up to and including `hi`.
fn key_points(lo: f64, hi: f64, step: f64) -> Vec<f64> {
    let n = ((hi - lo) / step + 1e-9).floor() as usize;
    (0..=n).map(|k| lo + k as f64 * step).collect()
}

fn draw_panel<DB, X>(
    area: &DrawingArea<DB, Shift>,
    x_spec: X,
    figure: &Figure,
    panel: &Panel,
    is_last: bool,
) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
    X: AsRangedCoord<Value = f64>,
    X::CoordDescType: Ranged<ValueType = f64> + ValueFormatter<f64>,
{
    let (y_lo, y_hi) = panel
        .y
        .resolve(panel.series.iter().flat_map(|s| s.points.iter().map(|&(_, y)| y)));
    let tick_fmt = |v: &f64| figure.x_ticks.format(*v);

    let mut chart = ChartBuilder::on(area)
        .margin(10)
        .set_label_area_size(LabelAreaPosition::Left, 70)
        .set_label_area_size(LabelAreaPosition::Bottom, if is_last { 45 } else { 20 })
        .build_cartesian_2d(x_spec, y_lo..y_hi)?;

    let mut mesh = chart.configure_mesh();
    mesh.y_desc(panel.y.title.as_str())
        .x_label_formatter(&tick_fmt)
        .light_line_style(BLACK.mix(0.05));
    if is_last {
        mesh.x_desc(figure.x.title.as_str());
    }
    mesh.draw()?;

    for series in &panel.series {
        draw_series(&mut chart, series)?;
    }

    if figure.legend {
        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperRight)
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()?;
    }
    Ok(())
}

fn draw_series<DB, X>(
    chart: &mut ChartContext<'_, DB, Cartesian2d<X, RangedCoordf64>>,
    series: &Series,
) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
    X: Ranged<ValueType = f64>,
{
    let color = series.color;
    let style = color.stroke_width(2);
    let points = series.points.clone();

    let anno = match series.style {
        LineStyle::Solid => chart.draw_series(LineSeries::new(points, style))?,
        LineStyle::Dashed => chart.draw_series(DashedLineSeries::new(points, 10, 6, style))?,
        LineStyle::DashDotted => chart.draw_series(DashedLineSeries::new(points, 3, 6, style))?,
    };
    anno.label(series.label.as_str())
        .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2)));
    Ok(())
}
