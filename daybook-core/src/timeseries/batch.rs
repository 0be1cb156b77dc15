use core::ops::Range;

use chrono::{Days, NaiveDate, Weekday};

use crate::granularity::Granularity;
use crate::series::TimeSeries;
use crate::timeseries::util::{aggregate_fields, find_delimiters};
use crate::{Anchor, BatchConfig, DaybookError, HeadPolicy, Record, Reduction, TailPolicy};

/// One window produced by the batch loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Window {
    /// First day covered by the window.
    pub first_day: NaiveDate,
    /// Last day covered by the window (inclusive).
    pub last_day: NaiveDate,
    /// Positions of the covered records in the source series.
    pub range: Range<usize>,
}

impl Window {
    /// True if no record of the source series falls inside the window.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.range.is_empty()
    }
}

/// How a window is located inside its period.
#[derive(Debug, Clone, Copy)]
enum Selector {
    /// `offset`-th day of the period, spanning `span` days or to the period end.
    Day { offset: i64, span: Option<u32> },
    /// `occurrence`-th `weekday` of the period, a single day.
    Weekday { weekday: Weekday, occurrence: i64 },
}

impl Selector {
    fn first_day(self, granularity: Granularity, beg: NaiveDate) -> Result<NaiveDate, DaybookError> {
        match self {
            // Daily periods are a single day, so offsets 0 and -1 coincide.
            Self::Day { .. } if granularity == Granularity::Daily => Ok(beg),
            Self::Day { offset, .. } => granularity.nth_day(beg, offset),
            Self::Weekday {
                weekday,
                occurrence,
            } => granularity.nth_weekday(beg, weekday, occurrence),
        }
    }

    fn last_day(self, granularity: Granularity, first: NaiveDate) -> NaiveDate {
        match self {
            Self::Day {
                span: Some(n), ..
            } => first
                .checked_add_days(Days::new(u64::from(n.saturating_sub(1))))
                .unwrap_or(NaiveDate::MAX),
            Self::Day { span: None, .. } => granularity.end_of(first),
            Self::Weekday { .. } => first,
        }
    }
}

/// Iterator over the windows of a series, created by [`windows`].
///
/// Windows come out in date order and never overlap, so every record before
/// `cursor` belongs to an earlier window. Each delimiter search therefore
/// starts at `cursor` and never revisits those records.
#[derive(Debug, Clone)]
pub struct Windows<'a> {
    dates: &'a [NaiveDate],
    granularity: Granularity,
    selector: Selector,
    tails: TailPolicy,
    next_beginning: Option<NaiveDate>,
    last_day: NaiveDate,
    cursor: usize,
}

impl<'a> Windows<'a> {
    fn new(
        ts: &'a TimeSeries,
        granularity: Granularity,
        selector: Selector,
        head: HeadPolicy,
        tails: TailPolicy,
    ) -> Self {
        let dates = ts.dates();
        let (next_beginning, last_day) = match (dates.first(), dates.last()) {
            (Some(&first), Some(&last)) => {
                let beg = if head == HeadPolicy::Drop {
                    granularity.first_available_beginning(first)
                } else {
                    Some(granularity.beginning_of(first))
                };
                (beg, last)
            }
            _ => (None, NaiveDate::MIN),
        };
        Self {
            dates,
            granularity,
            selector,
            tails,
            next_beginning,
            last_day,
            cursor: 0,
        }
    }
}

impl Iterator for Windows<'_> {
    type Item = Window;

    fn next(&mut self) -> Option<Window> {
        loop {
            let beg = self.next_beginning?;
            self.next_beginning = self.granularity.next_beginning(beg);
            // Offsets are validated against the shortest regular period, so
            // only the truncated weeks at the calendar edges can miss the
            // selected day. Those periods are skipped.
            let Ok(first_day) = self.selector.first_day(self.granularity, beg) else {
                continue;
            };
            if first_day > self.last_day {
                self.next_beginning = None;
                return None;
            }
            let last_day = self.selector.last_day(self.granularity, first_day);
            if self.tails == TailPolicy::Drop && last_day > self.last_day {
                #[cfg(feature = "tracing")]
                tracing::debug!(
                    first_day = %first_day,
                    last_day = %last_day,
                    series_end = %self.last_day,
                    "dropping incomplete trailing window"
                );
                self.next_beginning = None;
                return None;
            }

            let (lo, hi) = find_delimiters(&self.dates[self.cursor..], first_day, last_day);
            let range = self.cursor + lo..self.cursor + hi;
            self.cursor = range.end;
            return Some(Window {
                first_day,
                last_day,
                range,
            });
        }
    }
}

fn check_batch_config(granularity: Granularity, config: &BatchConfig) -> Result<(), DaybookError> {
    config.validate()?;
    let min_len = i64::from(granularity.min_period_len());
    if config.first_day_of_batch >= min_len {
        return Err(DaybookError::config(format!(
            "'first_day_of_batch' must be lower than {min_len} for {granularity} batches (got {})",
            config.first_day_of_batch
        )));
    }
    match config.n_elements {
        Some(n) if config.first_day_of_batch + i64::from(n) > min_len => {
            Err(DaybookError::config(format!(
                "'first_day_of_batch' + 'n_elements' must not exceed {min_len} for {granularity} batches (got {} + {n})",
                config.first_day_of_batch
            )))
        }
        _ => Ok(()),
    }
}

/// Windows of `ts` for every `granularity` period, laid out by `config`.
///
/// A window starts `config.first_day_of_batch` days into its period and spans
/// `config.n_elements` days, or runs to the period end when unset. Windows are
/// produced until their first day passes the last day of the series.
///
/// # Errors
/// Returns `DaybookError::Configuration` if the offset is negative, the span
/// is zero, or the two together do not fit the shortest period of
/// `granularity`.
pub fn windows<'a>(
    ts: &'a TimeSeries,
    granularity: Granularity,
    config: &BatchConfig,
) -> Result<Windows<'a>, DaybookError> {
    check_batch_config(granularity, config)?;
    let selector = Selector::Day {
        offset: config.first_day_of_batch,
        span: config.n_elements,
    };
    Ok(Windows::new(ts, granularity, selector, config.head, config.tails))
}

/// Split `ts` into one sub-series per window.
///
/// ```
/// use chrono::NaiveDate;
/// use daybook_core::{BatchConfig, Granularity, Record, TimeSeries, split};
///
/// let d = |m, day| NaiveDate::from_ymd_opt(2022, m, day).unwrap();
/// let ts = TimeSeries::new(vec![
///     Record::empty(d(1, 10)).with_field("a", 1.0),
///     Record::empty(d(1, 20)).with_field("a", 2.0),
///     Record::empty(d(2, 5)).with_field("a", 3.0),
/// ])
/// .unwrap();
/// let months = split(&ts, Granularity::Monthly, &BatchConfig::default()).unwrap();
/// assert_eq!(months.len(), 2);
/// assert_eq!(months[0].len(), 2);
/// ```
///
/// # Errors
/// See [`windows`].
#[cfg_attr(
    feature = "tracing",
    tracing::instrument(
        name = "daybook::batch::split",
        skip_all,
        fields(len = ts.len(), granularity = %granularity),
    )
)]
pub fn split(
    ts: &TimeSeries,
    granularity: Granularity,
    config: &BatchConfig,
) -> Result<Vec<TimeSeries>, DaybookError> {
    Ok(windows(ts, granularity, config)?
        .map(|w| ts.slice(w.range.start, w.range.end))
        .collect())
}

/// One record per window, each field reduced with `reduction`.
///
/// # Errors
/// See [`windows`].
pub fn aggregate(
    ts: &TimeSeries,
    granularity: Granularity,
    config: &BatchConfig,
    reduction: Reduction,
) -> Result<TimeSeries, DaybookError> {
    aggregate_with(ts, granularity, config, |values| reduction.apply(values))
}

/// One record per window, each field reduced with a caller-supplied function.
///
/// The function receives the values of one field across the window's records
/// that carry it. Windows without records yield an empty record. The output
/// day is the window's first or last day according to `config.anchor`.
///
/// # Errors
/// See [`windows`].
#[cfg_attr(
    feature = "tracing",
    tracing::instrument(
        name = "daybook::batch::aggregate",
        skip_all,
        fields(len = ts.len(), granularity = %granularity),
    )
)]
pub fn aggregate_with<F>(
    ts: &TimeSeries,
    granularity: Granularity,
    config: &BatchConfig,
    mut reduce: F,
) -> Result<TimeSeries, DaybookError>
where
    F: FnMut(&[f64]) -> f64,
{
    let records = windows(ts, granularity, config)?
        .map(|w| {
            let fields = aggregate_fields(
                ts.records()[w.range].iter().map(|r| &r.fields),
                &mut reduce,
            );
            let day = if config.anchor == Anchor::LastDay {
                w.last_day
            } else {
                w.first_day
            };
            Record::new(day, fields)
        })
        .collect();
    Ok(TimeSeries::from_sorted(records))
}

/// The `day_of_batch`-th day (0-indexed, `-1` for the last) of every period.
///
/// Periods start at the first period beginning on or after the first day of
/// `ts`, so a partial leading period is skipped. Periods whose picked day is
/// missing from `ts` contribute an empty record.
///
/// # Errors
/// - `DaybookError::Configuration` if `day_of_batch` is below `-1` or not
///   present in every period of `granularity`.
/// - `DaybookError::Unsupported` for [`Granularity::Daily`] with any offset
///   other than `0` or `-1`.
#[cfg_attr(
    feature = "tracing",
    tracing::instrument(
        name = "daybook::batch::pick_a_day",
        skip_all,
        fields(len = ts.len(), granularity = %granularity, day_of_batch = day_of_batch),
    )
)]
pub fn pick_a_day(
    ts: &TimeSeries,
    granularity: Granularity,
    day_of_batch: i64,
) -> Result<TimeSeries, DaybookError> {
    if day_of_batch < -1 {
        return Err(DaybookError::config(format!(
            "'day_of_batch' can't be lesser than -1 (got {day_of_batch})"
        )));
    }
    if granularity == Granularity::Daily && day_of_batch > 0 {
        return Err(DaybookError::unsupported(
            "picking a day other than 0 or -1 on daily granularity",
        ));
    }
    let min_len = i64::from(granularity.min_period_len());
    if day_of_batch >= min_len {
        return Err(DaybookError::config(format!(
            "'day_of_batch' must be lower than {min_len} for {granularity} periods (got {day_of_batch})"
        )));
    }
    let selector = Selector::Day {
        offset: day_of_batch,
        span: Some(1),
    };
    Ok(pick(ts, granularity, selector))
}

/// The `occurrence`-th `weekday` (0-indexed, `-1` for the last) of every period.
///
/// Like [`pick_a_day`], a partial leading period is skipped.
///
/// ```
/// use chrono::{NaiveDate, Weekday};
/// use daybook_core::{Granularity, Record, TimeSeries, pick_a_weekday};
///
/// let d = |m, day| NaiveDate::from_ymd_opt(2022, m, day).unwrap();
/// let ts = TimeSeries::new(vec![
///     Record::empty(d(4, 1)).with_field("a", 1.0),
///     Record::empty(d(4, 4)).with_field("a", 2.0),
///     Record::empty(d(5, 30)).with_field("a", 3.0),
/// ])
/// .unwrap();
/// let mondays = pick_a_weekday(&ts, Granularity::Monthly, Weekday::Mon, 0).unwrap();
/// assert_eq!(mondays.dates(), &[d(4, 4), d(5, 2)]);
/// assert_eq!(mondays.get(d(4, 4)).unwrap().value("a"), Some(2.0));
/// assert!(mondays.get(d(5, 2)).unwrap().is_empty());
///
/// // A series starting mid-month skips that month.
/// let late = TimeSeries::new(vec![Record::empty(d(4, 4)), Record::empty(d(5, 30))]).unwrap();
/// let mondays = pick_a_weekday(&late, Granularity::Monthly, Weekday::Mon, 0).unwrap();
/// assert_eq!(mondays.dates(), &[d(5, 2)]);
/// ```
///
/// # Errors
/// - `DaybookError::Configuration` if `occurrence` is below `-1` or not
///   present in every period of `granularity`.
/// - `DaybookError::Unsupported` for [`Granularity::Daily`].
#[cfg_attr(
    feature = "tracing",
    tracing::instrument(
        name = "daybook::batch::pick_a_weekday",
        skip_all,
        fields(len = ts.len(), granularity = %granularity, weekday = ?weekday, occurrence = occurrence),
    )
)]
pub fn pick_a_weekday(
    ts: &TimeSeries,
    granularity: Granularity,
    weekday: Weekday,
    occurrence: i64,
) -> Result<TimeSeries, DaybookError> {
    let Some(min_occurrences) = granularity.min_weekday_occurrences() else {
        return Err(DaybookError::unsupported(
            "picking a weekday on daily granularity",
        ));
    };
    if occurrence < -1 {
        return Err(DaybookError::config(format!(
            "'occurrence' can't be lesser than -1 (got {occurrence})"
        )));
    }
    if occurrence >= i64::from(min_occurrences) {
        return Err(DaybookError::config(format!(
            "'occurrence' must be lower than {min_occurrences} for {granularity} periods (got {occurrence})"
        )));
    }
    let selector = Selector::Weekday {
        weekday,
        occurrence,
    };
    Ok(pick(ts, granularity, selector))
}

fn pick(ts: &TimeSeries, granularity: Granularity, selector: Selector) -> TimeSeries {
    let records = Windows::new(
        ts,
        granularity,
        selector,
        HeadPolicy::Drop,
        TailPolicy::Keep,
    )
    .map(|w| ts.get_or_empty(w.first_day))
    .collect();
    TimeSeries::from_sorted(records)
}
