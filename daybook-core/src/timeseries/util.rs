//! Shared helpers for delimiter search and per-field reduction.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::Fields;

/// Index range `[lo, hi)` of the days in sorted `dates` that fall within
/// `[min_day, max_day]`.
///
/// Both delimiters come from independent binary searches, so the cost is
/// `O(log n)` regardless of where the range sits. A range that covers no
/// stored day yields `lo == hi`; an inverted range is treated as empty.
///
/// ```
/// use chrono::NaiveDate;
/// use daybook_core::timeseries::util::find_delimiters;
///
/// let d = |day| NaiveDate::from_ymd_opt(2020, 1, day).unwrap();
/// let dates = [d(1), d(3), d(5), d(7)];
/// assert_eq!(find_delimiters(&dates, d(2), d(5)), (1, 3));
/// assert_eq!(find_delimiters(&dates, d(8), d(9)), (4, 4));
/// ```
#[must_use]
pub fn find_delimiters(dates: &[NaiveDate], min_day: NaiveDate, max_day: NaiveDate) -> (usize, usize) {
    let lo = dates.partition_point(|d| *d < min_day);
    let hi = dates.partition_point(|d| *d <= max_day);
    (lo, hi.max(lo))
}

/// Reduce a sequence of field mappings into one mapping.
///
/// Every field name seen in any input appears in the output; its value is
/// `reduce` applied to the values of the inputs that carry it, in input order.
/// Inputs lacking a field do not contribute to it.
pub fn aggregate_fields<'a, I, F>(fields: I, mut reduce: F) -> Fields
where
    I: IntoIterator<Item = &'a Fields>,
    F: FnMut(&[f64]) -> f64,
{
    let mut columns: BTreeMap<&'a str, Vec<f64>> = BTreeMap::new();
    for f in fields {
        for (name, value) in f {
            columns.entry(name.as_str()).or_default().push(*value);
        }
    }
    columns
        .into_iter()
        .map(|(name, values)| (name.to_owned(), reduce(&values)))
        .collect()
}
