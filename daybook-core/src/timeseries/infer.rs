use crate::granularity::Granularity;
use crate::series::TimeSeries;
use crate::timeseries::batch::windows;
use crate::{BatchConfig, DaybookError};

/// Infer the coarsest granularity at which `ts` holds at most one record per period.
///
/// Candidates are tried from [`Granularity::Yearly`] down to
/// [`Granularity::Daily`]; the first one whose periods each contain at most
/// one record wins. A daily-sampled series therefore infers as daily, a
/// series with one record per month as monthly, and so on.
///
/// ```
/// use chrono::NaiveDate;
/// use daybook_core::{Granularity, Record, TimeSeries, infer_granularity};
///
/// let ts = TimeSeries::new(
///     (1..=4)
///         .map(|m| Record::empty(NaiveDate::from_ymd_opt(2021, m, 15).unwrap()).with_field("a", 1.0))
///         .collect(),
/// )
/// .unwrap();
/// assert_eq!(infer_granularity(&ts).unwrap(), Granularity::Monthly);
/// ```
///
/// # Errors
/// Returns `DaybookError::Data` when the series holds fewer than two records.
#[cfg_attr(
    feature = "tracing",
    tracing::instrument(name = "daybook::infer::granularity", skip_all, fields(len = ts.len()))
)]
pub fn infer_granularity(ts: &TimeSeries) -> Result<Granularity, DaybookError> {
    if ts.len() < 2 {
        return Err(DaybookError::Data(format!(
            "at least two records are needed to infer a granularity (got {})",
            ts.len()
        )));
    }
    let config = BatchConfig::default();
    for granularity in Granularity::ALL.into_iter().rev() {
        let mut populated = false;
        let mut sparse = true;
        for w in windows(ts, granularity, &config)? {
            match w.range.len() {
                0 => {}
                1 => populated = true,
                _ => {
                    sparse = false;
                    break;
                }
            }
        }
        if sparse && populated {
            #[cfg(feature = "tracing")]
            tracing::debug!(granularity = %granularity, "inferred granularity");
            return Ok(granularity);
        }
    }
    Err(DaybookError::Data(
        "unexpected granularity found in time series data".into(),
    ))
}
