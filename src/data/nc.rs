//! NetCDF input. The file schema belongs to the simulation; this only maps one
//! variable and its dimensions onto a [`SeriesDataset`].

use std::path::Path;

use anyhow::{Context, Result};
use ::netcdf::AttributeValue;

use super::model::{Dim, SeriesDataset};

/// Read `variable` and build one [`Dim`] per NetCDF dimension.
///
/// A dimension takes its coordinates from the variable of the same name.
/// When that variable carries a `names` attribute (comma-separated), the
/// dimension is labelled instead, e.g. `env` = `temp,rel_humid,pressure,height`.
/// Dimensions without a coordinate variable are numbered from zero.
pub fn load_variable(path: &Path, variable: &str) -> Result<SeriesDataset> {
    let file = ::netcdf::open(path).with_context(|| format!("opening {}", path.display()))?;
    let var = file
        .variable(variable)
        .with_context(|| format!("{}: no variable '{variable}'", path.display()))?;

    let mut dims = Vec::new();
    for nc_dim in var.dimensions() {
        let name = nc_dim.name();
        let len = nc_dim.len();
        let dim = match file.variable(&name) {
            Some(coord_var) => {
                let labels = match coord_var.attribute("names") {
                    Some(attr) => match attr.value()? {
                        AttributeValue::Str(s) => Some(split_names(&s)),
                        _ => None,
                    },
                    None => None,
                };
                let unit = match coord_var.attribute("unit") {
                    Some(attr) => match attr.value()? {
                        AttributeValue::Str(s) => Some(s),
                        _ => None,
                    },
                    None => None,
                };
                let mut dim = match labels {
                    Some(labels) => Dim::labels(&name, labels),
                    None => Dim::values(
                        &name,
                        coord_var
                            .get_values::<f64, _>(..)
                            .with_context(|| format!("reading coordinate '{name}'"))?,
                    ),
                };
                dim.unit = unit;
                dim
            }
            None => Dim::values(&name, (0..len).map(|i| i as f64).collect()),
        };
        anyhow::ensure!(
            dim.len() == len,
            "dimension '{name}' has {len} entries but {} coordinates",
            dim.len()
        );
        dims.push(dim);
    }

    let values = var
        .get_values::<f64, _>(..)
        .with_context(|| format!("reading variable '{variable}'"))?;
    Ok(SeriesDataset::new(variable, dims, values)?)
}

fn split_names(s: &str) -> Vec<String> {
    s.split(',')
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_attribute_splits_on_commas() {
        assert_eq!(
            split_names("temp, rel_humid,pressure,height,"),
            ["temp", "rel_humid", "pressure", "height"]
        );
    }
}
