use std::fmt;

use ndarray::{ArrayD, IxDyn};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Coords – the coordinate values along one dimension
// ---------------------------------------------------------------------------

/// Coordinates of a dimension: either numeric grid values (time, diameter)
/// or names (species, environment variables).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Coords {
    Values(Vec<f64>),
    Labels(Vec<String>),
}

impl Coords {
    pub fn len(&self) -> usize {
        match self {
            Coords::Values(v) => v.len(),
            Coords::Labels(l) => l.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Coords::Values(_))
    }
}

// ---------------------------------------------------------------------------
// Dim – one named axis of a dataset
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dim {
    pub name: String,
    #[serde(flatten)]
    pub coords: Coords,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

impl Dim {
    pub fn values(name: &str, values: Vec<f64>) -> Self {
        Dim {
            name: name.to_string(),
            coords: Coords::Values(values),
            unit: None,
        }
    }

    pub fn labels<S: Into<String>>(name: &str, labels: impl IntoIterator<Item = S>) -> Self {
        Dim {
            name: name.to_string(),
            coords: Coords::Labels(labels.into_iter().map(Into::into).collect()),
            unit: None,
        }
    }

    pub fn with_unit(mut self, unit: &str) -> Self {
        self.unit = Some(unit.to_string());
        self
    }

    pub fn len(&self) -> usize {
        self.coords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coords.is_empty()
    }
}

impl fmt::Display for Dim {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = if self.coords.is_numeric() { "values" } else { "labels" };
        write!(f, "{} ({} {kind})", self.name, self.len())?;
        if let Some(unit) = &self.unit {
            write!(f, " [{unit}]")?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// DatasetError
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DatasetError {
    #[error("dataset shape {expected:?} needs {} values, got {got}", .expected.iter().product::<usize>())]
    ShapeMismatch { expected: Vec<usize>, got: usize },
    #[error("duplicate dimension '{0}'")]
    DuplicateDim(String),
    #[error("no dimension named '{0}'")]
    UnknownDim(String),
    #[error("dimension '{dim}' has no entry '{label}'")]
    UnknownLabel { dim: String, label: String },
    #[error("dimension '{0}' is labelled, not numeric")]
    NotNumeric(String),
    #[error("dimension '{0}' is numeric, not labelled")]
    NotLabelled(String),
    #[error("dimension '{0}' is empty")]
    EmptyDim(String),
    #[error("expected a single numeric dimension, dataset has {0}")]
    NotOneDimensional(usize),
}

// ---------------------------------------------------------------------------
// SeriesDataset – a loaded multi-variable dataset
// ---------------------------------------------------------------------------

/// A named, multi-dimensional block of values, one axis per [`Dim`].
///
/// Every transformation in [`super::filter`] returns a fresh dataset, so a
/// single loaded dataset can feed any number of independently reduced series.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesDataset {
    pub name: String,
    dims: Vec<Dim>,
    values: ArrayD<f64>,
}

impl SeriesDataset {
    /// Build a dataset from its dimensions and row-major values.
    pub fn new(name: &str, dims: Vec<Dim>, values: Vec<f64>) -> Result<Self, DatasetError> {
        for (i, dim) in dims.iter().enumerate() {
            if dims[..i].iter().any(|d| d.name == dim.name) {
                return Err(DatasetError::DuplicateDim(dim.name.clone()));
            }
        }
        let shape: Vec<usize> = dims.iter().map(Dim::len).collect();
        let got = values.len();
        let values = ArrayD::from_shape_vec(IxDyn(&shape), values)
            .map_err(|_| DatasetError::ShapeMismatch { expected: shape, got })?;
        Ok(SeriesDataset {
            name: name.to_string(),
            dims,
            values,
        })
    }

    pub(crate) fn from_parts(name: String, dims: Vec<Dim>, values: ArrayD<f64>) -> Self {
        debug_assert_eq!(dims.len(), values.ndim());
        SeriesDataset { name, dims, values }
    }

    pub fn dims(&self) -> &[Dim] {
        &self.dims
    }

    pub fn values(&self) -> &ArrayD<f64> {
        &self.values
    }

    pub fn dim(&self, name: &str) -> Option<&Dim> {
        self.dims.iter().find(|d| d.name == name)
    }

    pub(crate) fn dim_position(&self, name: &str) -> Result<usize, DatasetError> {
        self.dims
            .iter()
            .position(|d| d.name == name)
            .ok_or_else(|| DatasetError::UnknownDim(name.to_string()))
    }

    pub(crate) fn into_parts(self) -> (String, Vec<Dim>, ArrayD<f64>) {
        (self.name, self.dims, self.values)
    }

    /// Number of values.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Dimension summary on one line, for debug logging.
    pub fn summary(&self) -> String {
        let mut out = format!("{}:", self.name);
        for dim in &self.dims {
            out.push_str(&format!(" {dim};"));
        }
        out
    }
}
