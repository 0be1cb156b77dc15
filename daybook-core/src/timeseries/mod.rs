//! Calendar-driven operations over [`TimeSeries`](crate::TimeSeries) values.
//!
//! Modules include:
//! - `batch`: split, aggregate, and sample a series period by period
//! - `merge`: union and intersection of series with caller-supplied conflict resolution
//! - `infer`: detect the sampling granularity of a series
//! - `interpolate`: gap filling for a single field
//! - `decompose`: trend and seasonality extraction
/// Period windows, splitting, aggregation, and day picking.
pub mod batch;
/// Trend and seasonality decomposition helpers.
pub mod decompose;
/// Granularity inference.
pub mod infer;
/// Interpolation kernels used to fill missing field values.
pub mod interpolate;
/// Set operations across multiple series.
pub mod merge;
/// Delimiter search and per-field reduction helpers.
pub mod util;
