use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};

use plume_plot::config::{CONFIG_PATH, Config};
use plume_plot::{figures, walker};

fn main() -> Result<()> {
    env_logger::init();

    let config = Config::load(Path::new(CONFIG_PATH))?;
    log::info!(
        "{} runs, {} data files under {}",
        config.runs.len(),
        config.leaf_count(),
        config.data_base_dir.display()
    );

    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    let bounds = walker::find_bounds(&config, &mut out)?;
    writeln!(out, "{} {}", fmt_bound(bounds.min), fmt_bound(bounds.max))
        .context("writing bounds")?;

    if let Some(job) = &config.gas_figure {
        let size = figures::plot_gas(job)?;
        writeln!(out, "{size}").context("writing figure size")?;
    }
    if let Some(job) = &config.env_figure {
        let size = figures::plot_env(job)?;
        writeln!(out, "{size}").context("writing figure size")?;
    }
    Ok(())
}

fn fmt_bound(v: Option<f64>) -> String {
    v.map_or_else(|| "None".to_string(), |v| v.to_string())
}
