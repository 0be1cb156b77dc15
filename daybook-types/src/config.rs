//! Configuration types shared by the batching and processing helpers.

use serde::{Deserialize, Serialize};

use crate::DaybookError;

/// Which day of a window an aggregated record is dated on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[non_exhaustive]
pub enum Anchor {
    /// Date the aggregate on the window's first day.
    #[default]
    FirstDay,
    /// Date the aggregate on the window's last day.
    LastDay,
}

/// What to do with a trailing window that extends past the series' last day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[non_exhaustive]
pub enum TailPolicy {
    /// Emit the partial window; the delimiter search clamps to the available records.
    #[default]
    Keep,
    /// Omit the partial window.
    Drop,
}

/// Where the period walk starts relative to the series' first day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[non_exhaustive]
pub enum HeadPolicy {
    /// Start at the beginning of the period that contains the first day, so a
    /// partially covered leading period still produces a window.
    #[default]
    Keep,
    /// Start at the first period beginning on or after the first day.
    Drop,
}

/// Reduction applied to the values one field takes across a window.
///
/// Only records that actually carry the field contribute, so the slice handed
/// to [`Reduction::apply`] is never padded with placeholders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[non_exhaustive]
pub enum Reduction {
    /// Sum of the values.
    #[default]
    Sum,
    /// Arithmetic mean.
    Mean,
    /// Largest value.
    Max,
    /// Smallest value.
    Min,
    /// Earliest value in day order.
    First,
    /// Latest value in day order.
    Last,
    /// Number of contributing records.
    Count,
}

impl Reduction {
    /// Reduce `values` (in ascending day order) to a single number.
    ///
    /// An empty slice yields `0.0` for `Sum`/`Count` and `NaN` otherwise.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn apply(self, values: &[f64]) -> f64 {
        match self {
            Self::Sum => values.iter().sum(),
            Self::Count => values.len() as f64,
            _ if values.is_empty() => f64::NAN,
            Self::Mean => values.iter().sum::<f64>() / values.len() as f64,
            Self::Max => values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            Self::Min => values.iter().copied().fold(f64::INFINITY, f64::min),
            Self::First => values[0],
            Self::Last => values[values.len() - 1],
        }
    }
}

/// Window layout for the batching helpers.
///
/// Offsets are 0-indexed within a period. `n_elements = None` means "the rest
/// of the period"; otherwise the window spans `n_elements` days starting at
/// the offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Day of the period used as the first delimiter (0-indexed).
    pub first_day_of_batch: i64,
    /// Window length in days; `None` takes the whole remainder of the period.
    pub n_elements: Option<u32>,
    /// Day on which aggregated records are dated.
    pub anchor: Anchor,
    /// Handling of a trailing window that runs past the series end.
    pub tails: TailPolicy,
    /// Handling of a leading period that starts before the series' first day.
    pub head: HeadPolicy,
}

impl BatchConfig {
    /// Start from the defaults: whole periods, first day, keep partial head and tail.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the 0-indexed first day of each window within its period.
    #[must_use]
    pub const fn first_day_of_batch(mut self, offset: i64) -> Self {
        self.first_day_of_batch = offset;
        self
    }

    /// Limit each window to `n` days.
    #[must_use]
    pub const fn n_elements(mut self, n: u32) -> Self {
        self.n_elements = Some(n);
        self
    }

    /// Date aggregated records on the given window edge.
    #[must_use]
    pub const fn anchor(mut self, anchor: Anchor) -> Self {
        self.anchor = anchor;
        self
    }

    /// Shorthand for `anchor(Anchor::LastDay)`.
    #[must_use]
    pub const fn on_last_day(self) -> Self {
        self.anchor(Anchor::LastDay)
    }

    /// Choose how a trailing partial window is handled.
    #[must_use]
    pub const fn tails(mut self, tails: TailPolicy) -> Self {
        self.tails = tails;
        self
    }

    /// Choose where the period walk starts.
    #[must_use]
    pub const fn head(mut self, head: HeadPolicy) -> Self {
        self.head = head;
        self
    }

    /// Check the granularity-independent constraints.
    ///
    /// # Errors
    /// Returns `DaybookError::Configuration` if `first_day_of_batch` is
    /// negative or `n_elements` is zero.
    pub fn validate(&self) -> Result<(), DaybookError> {
        if self.first_day_of_batch < 0 {
            return Err(DaybookError::config(format!(
                "'first_day_of_batch' can't be lesser than 0 (got {})",
                self.first_day_of_batch
            )));
        }
        if self.n_elements == Some(0) {
            return Err(DaybookError::config(
                "'n_elements' must be greater than 0 or unset to take the whole period",
            ));
        }
        Ok(())
    }
}

/// Labels and smoothing window used when attaching trend and seasonality.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecomposeConfig {
    /// Field whose values are decomposed.
    pub field: String,
    /// Upper bound of the moving-average window applied to the trend.
    pub window_size: usize,
    /// Field name the smoothed trend is stored under.
    pub trend_label: String,
    /// Field name the seasonal component is stored under.
    pub seasonality_label: String,
}

impl DecomposeConfig {
    /// Decompose `field` with the default window and labels.
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            window_size: 12,
            trend_label: "trend".to_owned(),
            seasonality_label: "seasonality".to_owned(),
        }
    }

    /// Override the trend smoothing window.
    #[must_use]
    pub const fn window_size(mut self, window_size: usize) -> Self {
        self.window_size = window_size;
        self
    }

    /// Override the output labels.
    #[must_use]
    pub fn labels(mut self, trend: impl Into<String>, seasonality: impl Into<String>) -> Self {
        self.trend_label = trend.into();
        self.seasonality_label = seasonality.into();
        self
    }
}
