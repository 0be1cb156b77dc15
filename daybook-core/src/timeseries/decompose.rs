use core::ops::Range;

use crate::granularity::Granularity;
use crate::series::TimeSeries;
use crate::{DaybookError, DecomposeConfig, Observation};

/// Trend and seasonal components of a sequence, index-aligned with the input.
///
/// Points where a component is undefined hold `NaN`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Decomposition {
    /// Slow-moving level of the sequence.
    pub trend: Vec<f64>,
    /// Repeating component with period `periods_per_cycle`.
    pub seasonal: Vec<f64>,
}

/// Splits a sequence into trend and seasonal components.
pub trait Decomposer {
    /// Decompose `values`, whose seasonal cycle spans `periods_per_cycle` samples.
    ///
    /// # Errors
    /// Implementations return `DaybookError::Data` when the sequence cannot
    /// be decomposed.
    fn decompose(&self, values: &[f64], periods_per_cycle: usize)
    -> Result<Decomposition, DaybookError>;
}

/// Classical additive decomposition.
///
/// The trend is a centred moving average over one cycle (a 2×cycle average
/// for even cycles). The filter cannot reach the half cycle at each end, so
/// those points continue a least-squares line fitted to the nearest full
/// cycle of filtered points. The seasonal component is the per-position mean
/// of the detrended values, shifted to sum to zero over one cycle.
#[derive(Debug, Clone, Copy, Default)]
pub struct Additive;

impl Decomposer for Additive {
    fn decompose(
        &self,
        values: &[f64],
        periods_per_cycle: usize,
    ) -> Result<Decomposition, DaybookError> {
        let n = values.len();
        if periods_per_cycle <= 1 {
            return Ok(Decomposition {
                trend: values.to_vec(),
                seasonal: vec![0.0; n],
            });
        }
        let p = periods_per_cycle;
        if n < 2 * p {
            return Err(DaybookError::Data(format!(
                "two complete cycles of {p} samples are needed, got {n} samples"
            )));
        }

        let weights: Vec<f64> = if p % 2 == 0 {
            let mut w = vec![1.0; p + 1];
            w[0] = 0.5;
            w[p] = 0.5;
            w.into_iter().map(|x| x / p as f64).collect()
        } else {
            vec![1.0 / p as f64; p]
        };
        let half = weights.len() / 2;
        let mut trend: Vec<f64> = (0..n)
            .map(|i| {
                if i < half || i + half >= n {
                    return f64::NAN;
                }
                weights
                    .iter()
                    .zip(&values[i - half..=i + half])
                    .map(|(w, v)| w * v)
                    .sum()
            })
            .collect();
        // At least `p` filtered points exist since `n >= 2 * p`.
        extend_linearly(&mut trend, half..n - half, p);

        let mut sums = vec![0.0; p];
        let mut counts = vec![0_usize; p];
        for (i, (v, t)) in values.iter().zip(&trend).enumerate() {
            if !t.is_nan() {
                sums[i % p] += v - t;
                counts[i % p] += 1;
            }
        }
        let means: Vec<f64> = sums
            .iter()
            .zip(&counts)
            .map(|(s, &c)| if c == 0 { f64::NAN } else { s / c as f64 })
            .collect();
        let offset = means.iter().sum::<f64>() / p as f64;
        let seasonal = (0..n).map(|i| means[i % p] - offset).collect();

        Ok(Decomposition { trend, seasonal })
    }
}

/// Fill the points outside `defined` with straight lines fitted to the first
/// and last `npoints` points inside it.
fn extend_linearly(trend: &mut [f64], defined: Range<usize>, npoints: usize) {
    let head = defined.start..defined.start + npoints;
    let (slope, intercept) = least_squares(head.clone(), &trend[head]);
    for (i, t) in trend[..defined.start].iter_mut().enumerate() {
        *t = slope * i as f64 + intercept;
    }
    let tail = defined.end - npoints..defined.end;
    let (slope, intercept) = least_squares(tail.clone(), &trend[tail]);
    for (i, t) in trend.iter_mut().enumerate().skip(defined.end) {
        *t = slope * i as f64 + intercept;
    }
}

/// Slope and intercept of the least-squares line through `(x, ys[x - xs.start])`.
fn least_squares(xs: Range<usize>, ys: &[f64]) -> (f64, f64) {
    let count = ys.len() as f64;
    let x_mean = xs.clone().map(|x| x as f64).sum::<f64>() / count;
    let y_mean = ys.iter().sum::<f64>() / count;
    let (mut cov, mut var) = (0.0, 0.0);
    for (x, y) in xs.zip(ys) {
        let dx = x as f64 - x_mean;
        cov += dx * (y - y_mean);
        var += dx * dx;
    }
    let slope = if var == 0.0 { 0.0 } else { cov / var };
    (slope, y_mean - slope * x_mean)
}

/// Centred box filter of width `window`, same length as `values`.
///
/// Near the edges the sum only covers the samples inside the sequence and is
/// divided by their count. A window of 0 or 1 returns the input unchanged.
///
/// ```
/// use daybook_core::timeseries::decompose::moving_average;
///
/// assert_eq!(moving_average(&[1.0, 2.0, 3.0, 4.0, 5.0], 3), vec![1.5, 2.0, 3.0, 4.0, 4.5]);
/// ```
#[must_use]
pub fn moving_average(values: &[f64], window: usize) -> Vec<f64> {
    if window <= 1 {
        return values.to_vec();
    }
    let n = values.len();
    // Same alignment as a "same"-mode convolution with a box kernel.
    let ahead = (window - 1) / 2;
    let behind = window - 1 - ahead;
    (0..n)
        .map(|i| {
            let lo = i.saturating_sub(behind);
            let hi = (i + ahead).min(n - 1);
            let covered = &values[lo..=hi];
            covered.iter().sum::<f64>() / covered.len() as f64
        })
        .collect()
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

/// Copy of `ts` with trend and seasonality of `config.field` attached.
///
/// The cycle length is the number of `granularity` steps per year. The trend
/// is smoothed with [`moving_average`] over `min(window_size, ceil(n / 4))`
/// samples; both components are rounded to two decimals and undefined points
/// are skipped. Seasonality is attached only when a year holds more than one
/// step.
///
/// # Errors
/// - `DaybookError::Data` if some record lacks `config.field`, the series is
///   empty, or `decomposer` returns components of the wrong length.
/// - Any error returned by `decomposer`.
#[cfg_attr(
    feature = "tracing",
    tracing::instrument(
        name = "daybook::decompose::add_trend_seasonality",
        skip_all,
        fields(len = ts.len(), granularity = %granularity, field = %config.field),
    )
)]
pub fn add_trend_seasonality<D>(
    ts: &TimeSeries,
    granularity: Granularity,
    config: &DecomposeConfig,
    decomposer: &D,
) -> Result<TimeSeries, DaybookError>
where
    D: Decomposer + ?Sized,
{
    if ts.is_empty() {
        return Err(DaybookError::Data("cannot decompose an empty series".into()));
    }
    let values = ts
        .iter()
        .map(|r| {
            r.value(&config.field).ok_or_else(|| {
                DaybookError::Data(format!(
                    "record for {} lacks field '{}'",
                    r.day, config.field
                ))
            })
        })
        .collect::<Result<Vec<f64>, DaybookError>>()?;

    let n = values.len();
    let frequency = granularity.delta().periods_per_year() as usize;
    let parts = decomposer.decompose(&values, frequency)?;
    if parts.trend.len() != n || parts.seasonal.len() != n {
        return Err(DaybookError::Data(format!(
            "decomposer returned {} trend and {} seasonal values for {n} samples",
            parts.trend.len(),
            parts.seasonal.len()
        )));
    }

    let window = config.window_size.min(n.div_ceil(4));
    let trend = moving_average(&parts.trend, window);

    let mut rows = Vec::new();
    for (i, record) in ts.iter().enumerate() {
        let t = round2(trend[i]);
        if !t.is_nan() {
            rows.push(Observation::new(record.day, config.trend_label.clone(), t));
        }
        if frequency > 1 {
            let s = round2(parts.seasonal[i]);
            if !s.is_nan() {
                rows.push(Observation::new(
                    record.day,
                    config.seasonality_label.clone(),
                    s,
                ));
            }
        }
    }

    let mut out = ts.clone();
    out.update_from_observations(rows);
    Ok(out)
}
