use std::collections::BTreeSet;

use chrono::NaiveDate;

use crate::series::TimeSeries;
use crate::{DaybookError, Fields, Record};

fn fields_of<'a>(ts: &'a TimeSeries, day: NaiveDate, empty: &'a Fields) -> &'a Fields {
    ts.get(day).map_or(empty, |r| &r.fields)
}

/// Merge two field mappings that must not share any name.
///
/// # Errors
/// Returns `DaybookError::Conflict` listing the shared names.
pub fn merge_disjoint(a: &Fields, b: &Fields) -> Result<Fields, DaybookError> {
    merge_all_disjoint(&[a, b])
}

/// Merge any number of field mappings that must not share any name.
///
/// # Errors
/// Returns `DaybookError::Conflict` listing the names seen more than once.
pub fn merge_all_disjoint(all: &[&Fields]) -> Result<Fields, DaybookError> {
    let mut merged = Fields::new();
    let mut shared = BTreeSet::new();
    for fields in all {
        for (name, value) in *fields {
            if merged.insert(name.clone(), *value).is_some() {
                shared.insert(name.as_str());
            }
        }
    }
    if shared.is_empty() {
        Ok(merged)
    } else {
        Err(DaybookError::shared_fields(shared))
    }
}

/// Every day of `a` or `b`, with fields combined by `conflict`.
///
/// The resolver runs for every output day; a series lacking the day passes an
/// empty mapping.
///
/// # Errors
/// Propagates the first error returned by `conflict`.
#[cfg_attr(
    feature = "tracing",
    tracing::instrument(
        name = "daybook::merge::union",
        skip_all,
        fields(left = a.len(), right = b.len()),
    )
)]
pub fn union<F>(a: &TimeSeries, b: &TimeSeries, mut conflict: F) -> Result<TimeSeries, DaybookError>
where
    F: FnMut(&Fields, &Fields) -> Result<Fields, DaybookError>,
{
    let empty = Fields::new();
    let records = union_dates([a.dates(), b.dates()])
        .into_iter()
        .map(|day| {
            let fields = conflict(fields_of(a, day, &empty), fields_of(b, day, &empty))?;
            Ok(Record::new(day, fields))
        })
        .collect::<Result<Vec<_>, DaybookError>>()?;
    Ok(TimeSeries::from_sorted(records))
}

/// Only the days present in both `a` and `b`, with fields combined by `conflict`.
///
/// # Errors
/// Propagates the first error returned by `conflict`.
#[cfg_attr(
    feature = "tracing",
    tracing::instrument(
        name = "daybook::merge::intersection",
        skip_all,
        fields(left = a.len(), right = b.len()),
    )
)]
pub fn intersection<F>(
    a: &TimeSeries,
    b: &TimeSeries,
    mut conflict: F,
) -> Result<TimeSeries, DaybookError>
where
    F: FnMut(&Fields, &Fields) -> Result<Fields, DaybookError>,
{
    let empty = Fields::new();
    let records = intersection_dates([a.dates(), b.dates()])
        .into_iter()
        .map(|day| {
            let fields = conflict(fields_of(a, day, &empty), fields_of(b, day, &empty))?;
            Ok(Record::new(day, fields))
        })
        .collect::<Result<Vec<_>, DaybookError>>()?;
    Ok(TimeSeries::from_sorted(records))
}

/// Every day of any input series, with fields combined by `conflict`.
///
/// The resolver receives one mapping per input series, in input order, empty
/// where the series lacks the day. No input yields an empty series.
///
/// ```
/// use chrono::NaiveDate;
/// use daybook_core::{Fields, Record, TimeSeries, list_union};
///
/// let d = |day| NaiveDate::from_ymd_opt(2020, 1, day).unwrap();
/// let a = TimeSeries::new(vec![Record::empty(d(1)).with_field("a", 1.0)]).unwrap();
/// let b = TimeSeries::new(vec![Record::empty(d(3)).with_field("a", 3.0)]).unwrap();
/// let merged = list_union(&[a, b], |all| {
///     Ok(all.iter().find(|f| !f.is_empty()).map(|f| (*f).clone()).unwrap_or_default())
/// })
/// .unwrap();
/// assert_eq!(merged.dates(), &[d(1), d(3)]);
/// ```
///
/// # Errors
/// Propagates the first error returned by `conflict`.
#[cfg_attr(
    feature = "tracing",
    tracing::instrument(name = "daybook::merge::list_union", skip_all, fields(inputs = series.len()))
)]
pub fn list_union<F>(series: &[TimeSeries], mut conflict: F) -> Result<TimeSeries, DaybookError>
where
    F: FnMut(&[&Fields]) -> Result<Fields, DaybookError>,
{
    let empty = Fields::new();
    let records = union_dates(series.iter().map(TimeSeries::dates))
        .into_iter()
        .map(|day| {
            let all: Vec<&Fields> = series.iter().map(|ts| fields_of(ts, day, &empty)).collect();
            Ok(Record::new(day, conflict(&all)?))
        })
        .collect::<Result<Vec<_>, DaybookError>>()?;
    Ok(TimeSeries::from_sorted(records))
}

/// Only the days present in every input series, with fields combined by `conflict`.
///
/// No input yields an empty series.
///
/// # Errors
/// Propagates the first error returned by `conflict`.
#[cfg_attr(
    feature = "tracing",
    tracing::instrument(name = "daybook::merge::list_intersection", skip_all, fields(inputs = series.len()))
)]
pub fn list_intersection<F>(
    series: &[TimeSeries],
    mut conflict: F,
) -> Result<TimeSeries, DaybookError>
where
    F: FnMut(&[&Fields]) -> Result<Fields, DaybookError>,
{
    let empty = Fields::new();
    let records = intersection_dates(series.iter().map(TimeSeries::dates))
        .into_iter()
        .map(|day| {
            let all: Vec<&Fields> = series.iter().map(|ts| fields_of(ts, day, &empty)).collect();
            Ok(Record::new(day, conflict(&all)?))
        })
        .collect::<Result<Vec<_>, DaybookError>>()?;
    Ok(TimeSeries::from_sorted(records))
}

/// Sorted days appearing in any of `lists`.
pub fn union_dates<I, D>(lists: I) -> Vec<NaiveDate>
where
    I: IntoIterator<Item = D>,
    D: AsRef<[NaiveDate]>,
{
    let mut days = BTreeSet::new();
    for list in lists {
        days.extend(list.as_ref().iter().copied());
    }
    days.into_iter().collect()
}

/// Sorted days appearing in every one of `lists`. No list yields no day.
pub fn intersection_dates<I, D>(lists: I) -> Vec<NaiveDate>
where
    I: IntoIterator<Item = D>,
    D: AsRef<[NaiveDate]>,
{
    let mut lists = lists.into_iter();
    let Some(first) = lists.next() else {
        return Vec::new();
    };
    let mut days: BTreeSet<NaiveDate> = first.as_ref().iter().copied().collect();
    for list in lists {
        let other: BTreeSet<NaiveDate> = list.as_ref().iter().copied().collect();
        days.retain(|d| other.contains(d));
    }
    days.into_iter().collect()
}

/// The days of each series, in input order.
#[must_use]
pub fn list_of_dates(series: &[TimeSeries]) -> Vec<Vec<NaiveDate>> {
    series.iter().map(|ts| ts.dates().to_vec()).collect()
}
