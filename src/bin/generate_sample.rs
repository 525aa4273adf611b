//! Writes a small demo tree under `sample/`: 2D grids for two runs, gas state
//! tables, an env-state dataset and a `plume.toml` tying them together.
//! Run `plume-plot` from inside `sample/` afterwards.

use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use plume_plot::data::loader::save_json;
use plume_plot::data::model::{Dim, SeriesDataset};
use plume_plot::walker::data_name;

const OUT_DIR: &str = "sample";
const DATA_TYPE: &str = "2d_bc";
const RUNS: [(&str, &[u32]); 2] = [("with_coag", &[1, 2]), ("no_coag", &[1])];
const INDICES: u32 = 4;
const GAS_SPECIES: [&str; 4] = ["O3", "HNO3", "NO", "NO2"];

/// Deterministic noise source (SplitMix64).
struct SimpleRng {
    state: u64,
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        SimpleRng { state: seed }
    }

    /// Uniform in `[0, 1)`.
    fn next_f64(&mut self) -> f64 {
        self.state = self.state.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.state;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^= z >> 31;
        (z >> 11) as f64 / (1u64 << 53) as f64
    }
}

/// A 2D black-carbon field: a Gaussian plume with noise, about a fifth of the
/// cells empty (zero or slightly negative from round-off in the model).
fn bc_grid(rng: &mut SimpleRng, scale: f64) -> String {
    let (nx, ny) = (24, 16);
    let mut text = String::new();
    for j in 0..ny {
        let row: Vec<String> = (0..nx)
            .map(|i| {
                let dx = (i as f64 - nx as f64 / 3.0) / 6.0;
                let dy = (j as f64 - ny as f64 / 2.0) / 4.0;
                let plume = scale * (-(dx * dx + dy * dy)).exp();
                let value = if rng.next_f64() < 0.2 {
                    -1e-12 * rng.next_f64()
                } else {
                    plume * (0.8 + 0.4 * rng.next_f64())
                };
                format!("{value:.6e}")
            })
            .collect();
        text.push_str(&row.join(" "));
        text.push('\n');
    }
    text
}

fn write_grids(root: &Path, rng: &mut SimpleRng, toml: &mut String) -> Result<usize> {
    let mut count = 0;
    for (run, loops) in RUNS {
        let dir = root.join("data").join(run);
        fs::create_dir_all(&dir).with_context(|| format!("creating {}", dir.display()))?;
        writeln!(toml, "\n[[runs]]\nname = \"{run}\"")?;
        for &loop_num in loops {
            writeln!(toml, "[[runs.loops]]\nnum = {loop_num}")?;
            for index in 1..=INDICES {
                writeln!(toml, "[[runs.loops.indices]]\nnum = {index}")?;
                let scale = 1e-9 * (1.0 + index as f64) * loop_num as f64;
                let path = dir.join(format!("{}.txt", data_name(DATA_TYPE, loop_num, index)));
                fs::write(&path, bc_grid(rng, scale))
                    .with_context(|| format!("writing {}", path.display()))?;
                count += 1;
            }
        }
    }
    Ok(count)
}

/// One table per six hours of a 24 h run, one row every 10 minutes.
fn write_gas_tables(root: &Path, rng: &mut SimpleRng) -> Result<usize> {
    let dir = root.join("out");
    fs::create_dir_all(&dir)?;
    for part in 0..4 {
        let mut text = format!("time,{}\n", GAS_SPECIES.join(","));
        for step in 0..36 {
            let t = (part * 36 + step) as f64 * 600.0;
            let hour = t / 3600.0;
            let sun = (std::f64::consts::PI * (hour / 14.0)).sin().max(0.0);
            let o3 = 30.0 + 60.0 * sun + rng.next_f64();
            let hno3 = 0.5 + 2.0 * hour / 24.0 + 0.1 * rng.next_f64();
            let no = 5.0 * (-hour / 3.0).exp() + 0.05 * rng.next_f64();
            let no2 = 20.0 * (1.0 - sun) + 0.2 * rng.next_f64();
            writeln!(text, "{t},{o3:.4},{hno3:.4},{no:.4},{no2:.4}")?;
        }
        let path = dir.join(format!("urban_plume_state_{:04}_gas.csv", part + 1));
        fs::write(&path, text).with_context(|| format!("writing {}", path.display()))?;
    }
    Ok(4)
}

fn write_env_state(root: &Path, rng: &mut SimpleRng) -> Result<()> {
    let env = ["temp", "rel_humid", "pressure", "height"];
    let times: Vec<f64> = (0..=144).map(|i| i as f64 * 600.0).collect();
    let mut values = Vec::with_capacity(times.len() * env.len());
    for &t in &times {
        let hour = t / 3600.0;
        let day = (std::f64::consts::PI * (hour / 12.0)).sin();
        values.push(290.0 + 6.0 * day + 0.1 * rng.next_f64());
        values.push((0.8 - 0.2 * day).clamp(0.5, 1.0));
        values.push(1e5);
        values.push(400.0 - 300.0 * (hour / 24.0));
    }
    let dataset = SeriesDataset::new(
        "env_state",
        vec![
            Dim::values("time", times).with_unit("s"),
            Dim::labels("env", env),
        ],
        values,
    )?;
    save_json(&root.join("out").join("env_state.json"), &dataset)
}

fn main() -> Result<()> {
    env_logger::init();
    let root = Path::new(OUT_DIR);
    let mut rng = SimpleRng::new(42);

    let mut toml = format!("data_base_dir = \"data\"\ndata_type = \"{DATA_TYPE}\"\n");
    let grids = write_grids(root, &mut rng, &mut toml)?;
    let tables = write_gas_tables(root, &mut rng)?;
    write_env_state(root, &mut rng)?;

    let species: Vec<String> = GAS_SPECIES.iter().map(|s| format!("\"{s}\"")).collect();
    write!(
        toml,
        "\n[gas_figure]\ndir = \"out\"\nprefix = \"urban_plume_state\"\nsuffix = \"gas.csv\"\n\
         species = [{}]\noutput = \"out/gas.svg\"\n\
         \n[env_figure]\ninput = \"out/env_state.json\"\noutput = \"figs/temp_height.svg\"\n",
        species.join(", ")
    )?;
    fs::write(root.join("plume.toml"), toml).context("writing plume.toml")?;

    println!("Wrote {grids} grids, {tables} gas tables and an env dataset to {OUT_DIR}/");
    Ok(())
}
