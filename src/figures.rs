//! Figure recipes: load once, derive one independent dataset per series,
//! hand the lines to [`crate::plot`].

use anyhow::{Context, Result};
use plotters::style::RGBColor;

use crate::color::ColorMap;
use crate::config::{EnvFigure, GasFigure};
use crate::data::filter::select;
use crate::data::loader::{file_list, load_dataset, load_state_tables};
use crate::data::model::SeriesDataset;
use crate::plot::{self, Axis, Figure, FigureSize, LineStyle, Panel, Series, TickLabels};

const SECONDS_PER_HOUR: f64 = 3600.0;
const SECONDS_PER_MINUTE: f64 = 60.0;

/// Local standard time at the start of the simulation, in minutes.
const ENV_START_MINUTES: f64 = 6.0 * 60.0;
const ENV_TICK_MINUTES: f64 = 3.0 * 60.0;

// ---------------------------------------------------------------------------
// Gas concentrations
// ---------------------------------------------------------------------------

/// One line per species, time in hours.
pub fn gas_figure(gas: &SeriesDataset, species: &[String]) -> Result<Figure> {
    let colors = ColorMap::new(species);
    let series = species
        .iter()
        .map(|name| -> Result<Series> {
            let points = gas
                .reduce(&[select("species", name)])?
                .scale_dim("time", 1.0 / SECONDS_PER_HOUR)?
                .center_list()?;
            Ok(Series {
                label: name.clone(),
                points,
                color: colors.color_for(name),
                style: LineStyle::Solid,
            })
        })
        .collect::<Result<Vec<_>>>()
        .context("building gas series")?;

    Ok(Figure {
        x: Axis::new("time (hour)"),
        x_ticks: TickLabels::Plain,
        panels: vec![Panel {
            y: Axis::new("gas concentration (ppb)"),
            series,
        }],
        legend: true,
        size: (640, 420),
    })
}

pub fn plot_gas(job: &GasFigure) -> Result<FigureSize> {
    let files = file_list(&job.dir, &job.prefix, &job.suffix)?;
    log::info!(
        "gas figure: {} state files in {}",
        files.len(),
        job.dir.display()
    );
    let gas = load_state_tables(&files, "gas_state", "species")?;
    let figure = gas_figure(&gas, &job.species)?;
    plot::render(&figure, &job.output)
}

// ---------------------------------------------------------------------------
// Temperature / relative humidity / mixing height
// ---------------------------------------------------------------------------

struct EnvPanel {
    var: &'static str,
    title: &'static str,
    label: &'static str,
    factor: f64,
    range: (f64, f64),
    style: LineStyle,
}

const ENV_PANELS: [EnvPanel; 3] = [
    EnvPanel {
        var: "temp",
        title: "temperature (K)",
        label: "temperature",
        factor: 1.0,
        range: (285.0, 300.0),
        style: LineStyle::Solid,
    },
    EnvPanel {
        var: "rel_humid",
        title: "relative humidity (%)",
        label: "relative humidity",
        factor: 100.0,
        range: (50.0, 100.0),
        style: LineStyle::Dashed,
    },
    EnvPanel {
        var: "height",
        title: "mixing height (m)",
        label: "mixing height",
        factor: 1.0,
        range: (0.0, 500.0),
        style: LineStyle::DashDotted,
    },
];

/// Three stacked panels over one day, time in minutes printed as local time.
pub fn env_figure(env: &SeriesDataset) -> Result<Figure> {
    let env = env.scale_dim("time", 1.0 / SECONDS_PER_MINUTE)?;
    let black = RGBColor(0, 0, 0);

    let panels = ENV_PANELS
        .iter()
        .map(|p| -> Result<Panel> {
            let points = env
                .reduce(&[select("env", p.var)])?
                .scale(p.factor)
                .center_list()?;
            Ok(Panel {
                y: Axis::new(p.title).with_range(p.range.0, p.range.1),
                series: vec![Series {
                    label: p.label.to_string(),
                    points,
                    color: black,
                    style: p.style,
                }],
            })
        })
        .collect::<Result<Vec<_>>>()
        .context("building env series")?;

    Ok(Figure {
        x: Axis::new("local standard time (hours:minutes)")
            .with_range(0.0, 1440.0)
            .with_step(ENV_TICK_MINUTES),
        x_ticks: TickLabels::TimeOfDay {
            base: ENV_START_MINUTES,
        },
        panels,
        legend: false,
        size: (640, 480),
    })
}

pub fn plot_env(job: &EnvFigure) -> Result<FigureSize> {
    let env = load_dataset(&job.input, &job.variable)?;
    let figure = env_figure(&env)?;
    plot::render(&figure, &job.output)
}
