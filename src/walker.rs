use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use ndarray::Array2;

use crate::config::Config;
use crate::data::grid::{Bounds, MaskedGrid};
use crate::data::loader::load_grid;

// ---------------------------------------------------------------------------
// Leaf – one Run/Loop/Index triple and the file it maps to
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Leaf<'a> {
    pub run: &'a str,
    pub loop_num: u32,
    pub index_num: u32,
    /// `<type>_<loop:04>_<index:08>`
    pub data_name: String,
    pub path: PathBuf,
}

pub fn data_name(data_type: &str, loop_num: u32, index_num: u32) -> String {
    format!("{data_type}_{loop_num:04}_{index_num:08}")
}

/// Every leaf of the batch, runs first, then loops, then indices, each in
/// configuration order.
pub fn leaves(config: &Config) -> impl Iterator<Item = Leaf<'_>> {
    config.runs.iter().flat_map(move |run| {
        let data_dir = config.data_base_dir.join(&run.name);
        run.loops.iter().flat_map(move |lp| {
            let data_dir = data_dir.clone();
            lp.indices.iter().map(move |index| {
                let data_name = data_name(&config.data_type, lp.num, index.num);
                Leaf {
                    run: &run.name,
                    loop_num: lp.num,
                    index_num: index.num,
                    path: data_dir.join(format!("{data_name}.txt")),
                    data_name,
                }
            })
        })
    })
}

// ---------------------------------------------------------------------------
// Walk
// ---------------------------------------------------------------------------

/// Load every leaf payload in order and fold it into `state`.
///
/// A `<run> <data name>` progress line goes to `progress` before each load.
/// The first failure (missing file, unparsable grid, fold error) stops the
/// walk.
pub fn walk<S, F>(config: &Config, progress: &mut dyn Write, init: S, mut fold: F) -> Result<S>
where
    F: FnMut(S, &Leaf<'_>, Array2<f64>) -> Result<S>,
{
    let mut state = init;
    for leaf in leaves(config) {
        writeln!(progress, "{} {}", leaf.run, leaf.data_name).context("writing progress")?;
        let payload = load_grid(&leaf.path)?;
        log::debug!(
            "{}: {}x{} payload",
            leaf.path.display(),
            payload.nrows(),
            payload.ncols()
        );
        state = fold(state, &leaf, payload)?;
    }
    Ok(state)
}

/// Global min/max over all payloads, ignoring entries `<= 0`.
///
/// Payloads with no positive entry are skipped with a warning; if every
/// payload is skipped the result stays unset.
pub fn find_bounds(config: &Config, progress: &mut dyn Write) -> Result<Bounds> {
    walk(config, progress, Bounds::default(), |mut bounds, leaf, payload| {
        if !bounds.observe(&MaskedGrid::positive(payload)) {
            log::warn!("{}: every value is <= 0, skipped", leaf.path.display());
        }
        Ok(bounds)
    })
}
