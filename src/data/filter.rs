use ndarray::Axis;

use super::model::{Coords, DatasetError, SeriesDataset};

// ---------------------------------------------------------------------------
// Selector – a (dimension, value) predicate
// ---------------------------------------------------------------------------

/// What to keep along one dimension.
#[derive(Debug, Clone, PartialEq)]
pub enum Selection {
    /// Entry of a labelled dimension with exactly this name.
    Label(String),
    /// Entry of a numeric dimension whose coordinate is nearest this value.
    Nearest(f64),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Selector {
    pub dim: String,
    pub selection: Selection,
}

/// Keep the `label` entry of dimension `dim`.
pub fn select(dim: &str, label: &str) -> Selector {
    Selector {
        dim: dim.to_string(),
        selection: Selection::Label(label.to_string()),
    }
}

/// Keep the entry of dimension `dim` nearest to `value`.
pub fn select_nearest(dim: &str, value: f64) -> Selector {
    Selector {
        dim: dim.to_string(),
        selection: Selection::Nearest(value),
    }
}

// ---------------------------------------------------------------------------
// Reduction and scaling – all return new datasets
// ---------------------------------------------------------------------------

impl SeriesDataset {
    /// Keep only the entries matching every selector, dropping each selected
    /// dimension. Selectors apply in order.
    pub fn reduce(&self, selectors: &[Selector]) -> Result<SeriesDataset, DatasetError> {
        let (name, mut dims, mut values) = self.clone().into_parts();
        for selector in selectors {
            let pos = dims
                .iter()
                .position(|d| d.name == selector.dim)
                .ok_or_else(|| DatasetError::UnknownDim(selector.dim.clone()))?;
            let idx = match_index(&dims[pos].coords, &selector.dim, &selector.selection)?;
            values = values.index_axis(Axis(pos), idx).to_owned();
            dims.remove(pos);
        }
        Ok(SeriesDataset::from_parts(name, dims, values))
    }

    /// Multiply the coordinates of a numeric dimension by `factor`.
    pub fn scale_dim(&self, dim: &str, factor: f64) -> Result<SeriesDataset, DatasetError> {
        let pos = self.dim_position(dim)?;
        let (name, mut dims, values) = self.clone().into_parts();
        match &mut dims[pos].coords {
            Coords::Values(coords) => coords.iter_mut().for_each(|c| *c *= factor),
            Coords::Labels(_) => return Err(DatasetError::NotNumeric(dim.to_string())),
        }
        Ok(SeriesDataset::from_parts(name, dims, values))
    }

    /// Multiply every value by `factor`.
    pub fn scale(&self, factor: f64) -> SeriesDataset {
        let (name, dims, values) = self.clone().into_parts();
        SeriesDataset::from_parts(name, dims, values * factor)
    }

    /// `(coordinate, value)` pairs of a dataset reduced to a single numeric
    /// dimension, ready to plot as one line.
    pub fn center_list(&self) -> Result<Vec<(f64, f64)>, DatasetError> {
        let [dim] = self.dims() else {
            return Err(DatasetError::NotOneDimensional(self.dims().len()));
        };
        let Coords::Values(coords) = &dim.coords else {
            return Err(DatasetError::NotNumeric(dim.name.clone()));
        };
        Ok(coords
            .iter()
            .copied()
            .zip(self.values().iter().copied())
            .collect())
    }
}

fn match_index(coords: &Coords, dim: &str, selection: &Selection) -> Result<usize, DatasetError> {
    match (coords, selection) {
        (Coords::Labels(labels), Selection::Label(label)) => labels
            .iter()
            .position(|l| l == label)
            .ok_or_else(|| DatasetError::UnknownLabel {
                dim: dim.to_string(),
                label: label.clone(),
            }),
        (Coords::Values(values), Selection::Nearest(target)) => values
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| (*a - target).abs().total_cmp(&(*b - target).abs()))
            .map(|(i, _)| i)
            .ok_or_else(|| DatasetError::EmptyDim(dim.to_string())),
        (Coords::Values(_), Selection::Label(_)) => {
            Err(DatasetError::NotLabelled(dim.to_string()))
        }
        (Coords::Labels(_), Selection::Nearest(_)) => {
            Err(DatasetError::NotNumeric(dim.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Dim;

    /// time(3) × env(3), values row-major.
    fn env_state() -> SeriesDataset {
        SeriesDataset::new(
            "env_state",
            vec![
                Dim::values("time", vec![0.0, 60.0, 120.0]),
                Dim::labels("env", ["temp", "rel_humid", "height"]),
            ],
            vec![
                290.0, 0.95, 400.0, //
                291.0, 0.90, 420.0, //
                292.0, 0.85, 440.0,
            ],
        )
        .unwrap()
    }

    #[test]
    fn reduce_selects_label_and_drops_dim() {
        let temp = env_state().reduce(&[select("env", "temp")]).unwrap();
        assert_eq!(temp.dims().len(), 1);
        assert_eq!(temp.dims()[0].name, "time");
        assert_eq!(
            temp.center_list().unwrap(),
            vec![(0.0, 290.0), (60.0, 291.0), (120.0, 292.0)]
        );
    }

    #[test]
    fn reduce_leaves_sibling_copy_intact() {
        let base = env_state();
        let sibling = base.clone();
        let rh = base.reduce(&[select("env", "rel_humid")]).unwrap().scale(100.0);

        assert_eq!(rh.values().len(), 3);
        assert_eq!(sibling, env_state());
        assert_eq!(base, env_state());
        assert_eq!(sibling.dim("env").unwrap().len(), 3);
    }

    #[test]
    fn reduce_nearest_on_numeric_dim() {
        let at_one_minute = env_state().reduce(&[select_nearest("time", 70.0)]).unwrap();
        assert_eq!(at_one_minute.dims()[0].name, "env");
        let values: Vec<f64> = at_one_minute.values().iter().copied().collect();
        assert_eq!(values, vec![291.0, 0.90, 420.0]);
    }

    #[test]
    fn reduce_rejects_unknown_dim_and_label() {
        let ds = env_state();
        assert_eq!(
            ds.reduce(&[select("species", "O3")]).unwrap_err(),
            DatasetError::UnknownDim("species".into())
        );
        assert_eq!(
            ds.reduce(&[select("env", "pressure")]).unwrap_err(),
            DatasetError::UnknownLabel {
                dim: "env".into(),
                label: "pressure".into()
            }
        );
        assert_eq!(
            ds.reduce(&[select("time", "noon")]).unwrap_err(),
            DatasetError::NotLabelled("time".into())
        );
    }

    #[test]
    fn scale_dim_is_invertible() {
        let ds = env_state();
        let back = ds.scale_dim("time", 1.0 / 60.0).unwrap().scale_dim("time", 60.0).unwrap();
        let (Coords::Values(orig), Coords::Values(round)) =
            (&ds.dims()[0].coords, &back.dims()[0].coords)
        else {
            panic!("time must stay numeric");
        };
        for (a, b) in orig.iter().zip(round) {
            assert!((a - b).abs() <= 4.0 * f64::EPSILON * a.abs().max(1.0));
        }
    }

    #[test]
    fn scale_dim_rejects_labels() {
        assert_eq!(
            env_state().scale_dim("env", 2.0).unwrap_err(),
            DatasetError::NotNumeric("env".into())
        );
    }

    #[test]
    fn scale_multiplies_values_only() {
        let scaled = env_state().scale(2.0);
        assert_eq!(scaled.dims(), env_state().dims());
        assert_eq!(scaled.values()[ndarray::IxDyn(&[1, 2])], 840.0);
    }

    #[test]
    fn center_list_needs_one_numeric_dim() {
        assert_eq!(
            env_state().center_list().unwrap_err(),
            DatasetError::NotOneDimensional(2)
        );
        let by_env = env_state().reduce(&[select_nearest("time", 0.0)]).unwrap();
        assert_eq!(
            by_env.center_list().unwrap_err(),
            DatasetError::NotNumeric("env".into())
        );
    }
}
