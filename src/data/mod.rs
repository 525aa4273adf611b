/// Data layer: payload grids, series datasets, loading and reduction.
///
/// Architecture:
/// ```text
///  .txt grids          .csv / .json / .nc
///        │                     │
///        ▼                     ▼
///   ┌──────────┐         ┌──────────┐
///   │  loader   │         │  loader   │  parse file → SeriesDataset
///   └──────────┘         └──────────┘
///        │                     │
///        ▼                     ▼
///   ┌────────────┐       ┌──────────────┐
///   │ MaskedGrid  │       │ SeriesDataset │  dims + values
///   └────────────┘       └──────────────┘
///        │                     │
///        ▼                     ▼
///   ┌──────────┐         ┌──────────┐
///   │  Bounds   │         │  filter   │  select / scale → new dataset
///   └──────────┘         └──────────┘
/// ```

pub mod filter;
pub mod grid;
pub mod loader;
pub mod model;
#[cfg(feature = "netcdf")]
mod nc;
