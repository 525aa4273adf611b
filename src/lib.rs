//! Batch bounds and figures for aerosol plume simulation output.
//!
//! A [`config::Config`] describes runs, loops and indices; [`walker`] turns
//! it into one grid file per index and folds the payloads, [`figures`] turn
//! loaded datasets into plots.

pub mod color;
pub mod config;
pub mod data;
pub mod figures;
pub mod plot;
pub mod walker;
