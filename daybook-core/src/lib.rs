//! daybook-core
//!
//! Calendar-aware containers and operations for sparse, day-indexed numeric
//! series.
//!
//! - `calendar`: period boundaries and month/day stepping over plain dates.
//! - `granularity`: the daily/weekly/monthly/quarterly/yearly partitions.
//! - `series`: the [`TimeSeries`] container, one record per day.
//! - `timeseries`: batching, merging, inference, interpolation, and
//!   decomposition built on top of the container.
//! - `types`: records, configuration values, and the error type, re-exported
//!   from `daybook-types`.
//!
//! Logging
//! -------
//! Enabling the `tracing` feature instruments the batch, merge, resample, and
//! inference entry points with `tracing` spans and debug events. The crate
//! never installs a subscriber.
//!
#![warn(missing_docs)]

/// Calendar arithmetic: period boundaries, day counts, and stepping.
pub mod calendar;
/// Calendar granularities and their period arithmetic.
pub mod granularity;
/// The [`TimeSeries`] container.
pub mod series;
/// Calendar-driven operations over series.
pub mod timeseries;
pub mod types;

pub use granularity::Granularity;
pub use series::TimeSeries;
pub use timeseries::batch::{
    Window, Windows, aggregate, aggregate_with, pick_a_day, pick_a_weekday, split, windows,
};
pub use timeseries::decompose::{
    Additive, Decomposer, Decomposition, add_trend_seasonality, moving_average,
};
pub use timeseries::infer::infer_granularity;
pub use timeseries::interpolate::{Interpolation, Interpolator};
pub use timeseries::merge::{
    intersection, intersection_dates, list_intersection, list_of_dates, list_union,
    merge_all_disjoint, merge_disjoint, union, union_dates,
};
pub use types::*;
