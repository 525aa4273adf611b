use ndarray::Array2;

// ---------------------------------------------------------------------------
// MaskedGrid – one payload with its exclusion mask
// ---------------------------------------------------------------------------

/// A 2D payload plus a mask marking entries that carry no data.
///
/// Masked entries stay in `values`; they are only skipped by the reductions.
#[derive(Debug, Clone, PartialEq)]
pub struct MaskedGrid {
    pub values: Array2<f64>,
    /// `true` where the entry is excluded.
    pub mask: Array2<bool>,
}

impl MaskedGrid {
    /// Mask every entry `<= 0`. Zero and negative values mean "no data" in
    /// the simulation output. NaN and infinities are masked too.
    pub fn positive(values: Array2<f64>) -> Self {
        let mask = values.mapv(|v| !v.is_finite() || v <= 0.0);
        MaskedGrid { values, mask }
    }

    fn valid(&self) -> impl Iterator<Item = f64> + '_ {
        self.values
            .iter()
            .zip(self.mask.iter())
            .filter(|(_, &masked)| !masked)
            .map(|(&v, _)| v)
    }

    pub fn valid_count(&self) -> usize {
        self.mask.iter().filter(|&&m| !m).count()
    }

    /// Smallest unmasked value, `None` when everything is masked.
    pub fn min(&self) -> Option<f64> {
        self.valid().reduce(f64::min)
    }

    /// Largest unmasked value, `None` when everything is masked.
    pub fn max(&self) -> Option<f64> {
        self.valid().reduce(f64::max)
    }
}

// ---------------------------------------------------------------------------
// Bounds – running min/max over many payloads
// ---------------------------------------------------------------------------

/// Global min/max, unset until the first payload with valid data.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Bounds {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl Bounds {
    /// Fold one payload in. Returns `false` (and leaves the bounds untouched)
    /// when the payload is entirely masked.
    pub fn observe(&mut self, grid: &MaskedGrid) -> bool {
        let (Some(lo), Some(hi)) = (grid.min(), grid.max()) else {
            return false;
        };
        self.min = Some(self.min.map_or(lo, |m| m.min(lo)));
        self.max = Some(self.max.map_or(hi, |m| m.max(hi)));
        true
    }

    pub fn is_set(&self) -> bool {
        self.min.is_some() && self.max.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn non_positive_values_do_not_count() {
        let grid = MaskedGrid::positive(array![[1.0, -1.0], [3.0, 0.0]]);
        assert_eq!(grid.min(), Some(1.0));
        assert_eq!(grid.max(), Some(3.0));
        assert_eq!(grid.valid_count(), 2);
        // masked entries are kept, not dropped
        assert_eq!(grid.values[[0, 1]], -1.0);
    }

    #[test]
    fn all_positive_is_exact() {
        let grid = MaskedGrid::positive(array![[2.0, 3.0], [4.0, 5.0]]);
        assert_eq!((grid.min(), grid.max()), (Some(2.0), Some(5.0)));
    }

    #[test]
    fn fully_masked_grid_has_no_extrema() {
        let grid = MaskedGrid::positive(array![[0.0, -2.0]]);
        assert_eq!(grid.min(), None);
        assert_eq!(grid.max(), None);

        let mut bounds = Bounds::default();
        assert!(!bounds.observe(&grid));
        assert_eq!(bounds, Bounds::default());
    }

    #[test]
    fn non_finite_values_are_masked() {
        let grid = MaskedGrid::positive(array![[f64::NAN, 2.0], [f64::INFINITY, 0.5]]);
        assert_eq!(grid.valid_count(), 2);
        assert_eq!((grid.min(), grid.max()), (Some(0.5), Some(2.0)));

        let mut bounds = Bounds::default();
        assert!(!bounds.observe(&MaskedGrid::positive(array![[f64::NAN, f64::NAN]])));
        assert!(!bounds.is_set());
    }

    #[test]
    fn bounds_first_then_running() {
        let mut bounds = Bounds::default();
        assert!(bounds.observe(&MaskedGrid::positive(array![[2.0, 3.0], [4.0, 5.0]])));
        assert_eq!(bounds, Bounds { min: Some(2.0), max: Some(5.0) });
        assert!(bounds.observe(&MaskedGrid::positive(array![[0.0, -1.0], [6.0, 1.0]])));
        assert_eq!(bounds, Bounds { min: Some(1.0), max: Some(6.0) });
        assert!(bounds.is_set());
    }
}
