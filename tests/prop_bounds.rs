//! Property tests for masked grids and the running bounds.

use ndarray::Array2;
use plume_plot::data::grid::{Bounds, MaskedGrid};
use plume_plot::data::model::{Dim, SeriesDataset};
use proptest::prelude::*;

fn grid_strategy() -> impl Strategy<Value = Array2<f64>> {
    (1usize..6, 1usize..6).prop_flat_map(|(r, c)| {
        prop::collection::vec(-100.0f64..100.0, r * c)
            .prop_map(move |v| Array2::from_shape_vec((r, c), v).unwrap())
    })
}

fn fold(grids: &[Array2<f64>]) -> Bounds {
    let mut bounds = Bounds::default();
    for g in grids {
        bounds.observe(&MaskedGrid::positive(g.clone()));
    }
    bounds
}

proptest! {
    /// Non-positive entries never reach the bounds.
    #[test]
    fn bounds_ignore_non_positive(grids in prop::collection::vec(grid_strategy(), 1..6)) {
        let bounds = fold(&grids);
        let positive: Vec<f64> = grids
            .iter()
            .flat_map(|g| g.iter().copied())
            .filter(|&v| v > 0.0)
            .collect();

        if positive.is_empty() {
            prop_assert_eq!(bounds, Bounds::default());
        } else {
            let lo = positive.iter().copied().fold(f64::INFINITY, f64::min);
            let hi = positive.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            prop_assert_eq!(bounds, Bounds { min: Some(lo), max: Some(hi) });
        }
    }

    /// Any permutation of the payloads gives the same bounds.
    #[test]
    fn bounds_are_order_independent(
        grids in prop::collection::vec(grid_strategy(), 1..6),
        rotate in 0usize..6,
    ) {
        let mut shuffled = grids.clone();
        shuffled.reverse();
        let len = shuffled.len();
        shuffled.rotate_left(rotate % len);
        prop_assert_eq!(fold(&grids), fold(&shuffled));
    }

    /// With only positive entries masking changes nothing.
    #[test]
    fn positive_grid_bounds_are_exact(
        v in prop::collection::vec(1e-6f64..1e6, 1..40),
    ) {
        let n = v.len();
        let grid = MaskedGrid::positive(Array2::from_shape_vec((1, n), v.clone()).unwrap());
        prop_assert_eq!(grid.valid_count(), n);
        prop_assert_eq!(grid.min(), v.iter().copied().reduce(f64::min));
        prop_assert_eq!(grid.max(), v.iter().copied().reduce(f64::max));
    }

    /// Scaling a numeric dimension by 1/k then k comes back within rounding.
    #[test]
    fn scale_dim_round_trips(
        times in prop::collection::vec(0.0f64..1e6, 1..20),
        k in 1.0f64..1e4,
    ) {
        let n = times.len();
        let ds = SeriesDataset::new(
            "env_state",
            vec![Dim::values("time", times.clone())],
            vec![1.0; n],
        ).unwrap();
        let back = ds.scale_dim("time", 1.0 / k).unwrap().scale_dim("time", k).unwrap();
        let points = back.center_list().unwrap();
        for ((t, _), orig) in points.iter().zip(&times) {
            prop_assert!((t - orig).abs() <= 4.0 * f64::EPSILON * orig.abs().max(1.0));
        }
    }
}
