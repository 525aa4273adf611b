use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use ndarray::Array2;
use serde::{Deserialize, Serialize};

use super::model::{Dim, SeriesDataset};

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load a multi-variable dataset from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.json` – a serialised [`DatasetRecord`]
/// * `.csv` / `.dat` – a `time,<name>...` table, see [`load_state_tables`];
///   the labelled dimension is `variable` without its `_state` suffix
///   (`env_state` → `env`)
/// * `.nc` – NetCDF variable `variable` (needs the `netcdf` feature)
pub fn load_dataset(path: &Path, variable: &str) -> Result<SeriesDataset> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let dataset = match ext.as_str() {
        "json" => load_json(path),
        "csv" | "dat" => {
            let label_dim = variable.strip_suffix("_state").unwrap_or(variable);
            load_state_tables(&[path.to_path_buf()], variable, label_dim)
        }
        "nc" => load_netcdf(path, variable),
        other => bail!("Unsupported file extension: .{other}"),
    }?;
    log::debug!("loaded {}", dataset.summary());
    Ok(dataset)
}

/// All files in `dir` whose names start with `prefix` and end with `suffix`,
/// sorted by name.
pub fn file_list(dir: &Path, prefix: &str, suffix: &str) -> Result<Vec<PathBuf>> {
    let entries = std::fs::read_dir(dir)
        .with_context(|| format!("listing directory {}", dir.display()))?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.with_context(|| format!("listing directory {}", dir.display()))?;
        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            continue;
        };
        if name.len() >= prefix.len() + suffix.len()
            && name.starts_with(prefix)
            && name.ends_with(suffix)
        {
            files.push(entry.path());
        }
    }
    files.sort();
    Ok(files)
}

// ---------------------------------------------------------------------------
// Grid loader
// ---------------------------------------------------------------------------

/// Read a whitespace-separated numeric grid.
///
/// Blank lines and `#` comments are skipped; every row must have the same
/// number of columns. A single row loads as a `1 × n` grid.
pub fn load_grid(path: &Path) -> Result<Array2<f64>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading grid file {}", path.display()))?;
    parse_grid(&text).with_context(|| format!("parsing grid file {}", path.display()))
}

pub fn parse_grid(text: &str) -> Result<Array2<f64>> {
    let mut values = Vec::new();
    let mut n_cols = None;
    let mut n_rows = 0;

    for (line_no, line) in text.lines().enumerate() {
        let line = line.split('#').next().unwrap_or("").trim();
        if line.is_empty() {
            continue;
        }
        let row = line
            .split_whitespace()
            .enumerate()
            .map(|(j, tok)| {
                tok.parse::<f64>().with_context(|| {
                    format!("line {}, column {}: '{tok}' is not a number", line_no + 1, j + 1)
                })
            })
            .collect::<Result<Vec<f64>>>()?;

        match n_cols {
            None => n_cols = Some(row.len()),
            Some(n) if n != row.len() => bail!(
                "line {}: expected {n} columns, found {}",
                line_no + 1,
                row.len()
            ),
            Some(_) => {}
        }
        values.extend(row);
        n_rows += 1;
    }

    let Some(n_cols) = n_cols else {
        bail!("grid contains no data");
    };
    Ok(Array2::from_shape_vec((n_rows, n_cols), values)?)
}

// ---------------------------------------------------------------------------
// State table loader
// ---------------------------------------------------------------------------

/// Read one or more state tables into a `time × <label_dim>` dataset named
/// `name`.
///
/// CSV layout: a header row `time,<name>,<name>...` followed by one row per
/// output time. All files must share the header; rows are concatenated and
/// sorted by time.
pub fn load_state_tables(
    paths: &[PathBuf],
    name: &str,
    label_dim: &str,
) -> Result<SeriesDataset> {
    if paths.is_empty() {
        bail!("no state files to read");
    }

    let mut labels: Option<Vec<String>> = None;
    let mut rows: Vec<(f64, Vec<f64>)> = Vec::new();

    for path in paths {
        let mut reader = csv::ReaderBuilder::new()
            .comment(Some(b'#'))
            .trim(csv::Trim::All)
            .from_path(path)
            .with_context(|| format!("opening state file {}", path.display()))?;
        let headers: Vec<String> = reader
            .headers()
            .with_context(|| format!("reading headers of {}", path.display()))?
            .iter()
            .map(|h| h.to_string())
            .collect();

        if headers.first().map(String::as_str) != Some("time") {
            bail!("{}: first column must be 'time'", path.display());
        }
        let file_labels = headers[1..].to_vec();
        match &labels {
            None => labels = Some(file_labels),
            Some(known) if *known != file_labels => bail!(
                "{}: columns {file_labels:?} differ from {known:?}",
                path.display()
            ),
            Some(_) => {}
        }

        for (row_no, record) in reader.records().enumerate() {
            let record = record.with_context(|| format!("{} row {row_no}", path.display()))?;
            let mut cells = record.iter().enumerate().map(|(j, cell)| {
                cell.parse::<f64>().with_context(|| {
                    format!(
                        "{} row {row_no}, column '{}': '{cell}' is not a number",
                        path.display(),
                        headers[j]
                    )
                })
            });
            let time = cells.next().context("empty row")??;
            let values = cells.collect::<Result<Vec<f64>>>()?;
            rows.push((time, values));
        }
    }

    rows.sort_by(|a, b| a.0.total_cmp(&b.0));
    let labels = labels.unwrap_or_default();
    let times: Vec<f64> = rows.iter().map(|(t, _)| *t).collect();
    let values: Vec<f64> = rows.into_iter().flat_map(|(_, v)| v).collect();

    let dataset = SeriesDataset::new(
        name,
        vec![
            Dim::values("time", times).with_unit("s"),
            Dim::labels(label_dim, labels),
        ],
        values,
    )?;
    Ok(dataset)
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// On-disk JSON form of a [`SeriesDataset`]:
///
/// ```json
/// {
///   "name": "env_state",
///   "dims": [
///     { "name": "time", "values": [0.0, 60.0], "unit": "s" },
///     { "name": "env", "labels": ["temp", "rel_humid", "height"] }
///   ],
///   "values": [290.0, 0.95, 400.0, 291.0, 0.9, 420.0]
/// }
/// ```
///
/// `values` is row-major over `dims`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetRecord {
    pub name: String,
    pub dims: Vec<Dim>,
    pub values: Vec<f64>,
}

impl From<&SeriesDataset> for DatasetRecord {
    fn from(ds: &SeriesDataset) -> Self {
        DatasetRecord {
            name: ds.name.clone(),
            dims: ds.dims().to_vec(),
            values: ds.values().iter().copied().collect(),
        }
    }
}

impl TryFrom<DatasetRecord> for SeriesDataset {
    type Error = super::model::DatasetError;

    fn try_from(rec: DatasetRecord) -> Result<Self, Self::Error> {
        SeriesDataset::new(&rec.name, rec.dims, rec.values)
    }
}

fn load_json(path: &Path) -> Result<SeriesDataset> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let record: DatasetRecord = serde_json::from_str(&text).context("parsing JSON")?;
    let dataset = SeriesDataset::try_from(record)
        .with_context(|| format!("invalid dataset in {}", path.display()))?;
    Ok(dataset)
}

/// Write a dataset as JSON.
pub fn save_json(path: &Path, dataset: &SeriesDataset) -> Result<()> {
    let text = serde_json::to_string_pretty(&DatasetRecord::from(dataset))?;
    std::fs::write(path, text).with_context(|| format!("writing {}", path.display()))
}

// ---------------------------------------------------------------------------
// NetCDF loader
// ---------------------------------------------------------------------------

#[cfg(feature = "netcdf")]
fn load_netcdf(path: &Path, variable: &str) -> Result<SeriesDataset> {
    super::nc::load_variable(path, variable)
}

#[cfg(not(feature = "netcdf"))]
fn load_netcdf(path: &Path, _variable: &str) -> Result<SeriesDataset> {
    bail!(
        "{}: NetCDF input needs the `netcdf` feature",
        path.display()
    )
}
