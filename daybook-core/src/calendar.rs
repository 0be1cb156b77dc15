//! Calendar arithmetic over plain dates.
//!
//! Weeks start on Monday. Month, quarter, and year boundaries always exist
//! because the representable range starts on January 1 and ends on
//! December 31. The two weeks that straddle either end of the range are
//! truncated: their boundaries clamp to [`NaiveDate::MIN`] and [`NaiveDate::MAX`].

use chrono::{Datelike, Days, Months, NaiveDate, Weekday};

use crate::DaybookError;

const fn is_leap(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

/// Number of days in `month` (1-based) of `year`.
#[must_use]
pub const fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        2 if is_leap(year) => 29,
        2 => 28,
        4 | 6 | 9 | 11 => 30,
        _ => 31,
    }
}

const fn quarter_first_month(month: u32) -> u32 {
    (month - 1) / 3 * 3 + 1
}

/// Monday of the week containing `day`, or [`NaiveDate::MIN`] when that
/// Monday is not representable.
#[must_use]
pub fn first_day_of_week(day: NaiveDate) -> NaiveDate {
    day.checked_sub_days(Days::new(u64::from(day.weekday().num_days_from_monday())))
        .unwrap_or(NaiveDate::MIN)
}

/// Sunday of the week containing `day`, or [`NaiveDate::MAX`] when that
/// Sunday is not representable.
#[must_use]
pub fn last_day_of_week(day: NaiveDate) -> NaiveDate {
    day.checked_add_days(Days::new(u64::from(6 - day.weekday().num_days_from_monday())))
        .unwrap_or(NaiveDate::MAX)
}

/// First day of the month containing `day`.
#[must_use]
pub fn first_day_of_month(day: NaiveDate) -> NaiveDate {
    day - Days::new(u64::from(day.day0()))
}

/// Last day of the month containing `day`.
#[must_use]
pub fn last_day_of_month(day: NaiveDate) -> NaiveDate {
    first_day_of_month(day) + Days::new(u64::from(days_of_month(day) - 1))
}

/// First day of the quarter containing `day`.
#[must_use]
pub fn first_day_of_quarter(day: NaiveDate) -> NaiveDate {
    let year = day.year();
    let skipped: u32 = (quarter_first_month(day.month())..day.month())
        .map(|m| days_in_month(year, m))
        .sum();
    first_day_of_month(day) - Days::new(u64::from(skipped))
}

/// Last day of the quarter containing `day`.
#[must_use]
pub fn last_day_of_quarter(day: NaiveDate) -> NaiveDate {
    first_day_of_quarter(day) + Days::new(u64::from(days_of_quarter(day) - 1))
}

/// January 1st of the year containing `day`.
#[must_use]
pub fn first_day_of_year(day: NaiveDate) -> NaiveDate {
    day - Days::new(u64::from(day.ordinal0()))
}

/// December 31st of the year containing `day`.
#[must_use]
pub fn last_day_of_year(day: NaiveDate) -> NaiveDate {
    first_day_of_year(day) + Days::new(u64::from(days_of_year(day) - 1))
}

/// Number of days in the month containing `day`.
#[must_use]
pub fn days_of_month(day: NaiveDate) -> u32 {
    days_in_month(day.year(), day.month())
}

/// Number of days in the quarter containing `day`.
#[must_use]
pub fn days_of_quarter(day: NaiveDate) -> u32 {
    let first = quarter_first_month(day.month());
    (first..first + 3)
        .map(|m| days_in_month(day.year(), m))
        .sum()
}

/// Number of days in the year containing `day`.
#[must_use]
pub fn days_of_year(day: NaiveDate) -> u32 {
    if is_leap(day.year()) { 366 } else { 365 }
}

/// All dates in `[first, last]` that fall on `weekday`, in ascending order.
///
/// The length of the returned vector is the occurrence count. An inverted
/// range yields an empty vector.
#[must_use]
pub fn weekdays_of_range(first: NaiveDate, last: NaiveDate, weekday: Weekday) -> Vec<NaiveDate> {
    let shift = (7 + weekday.num_days_from_monday() - first.weekday().num_days_from_monday()) % 7;
    let Some(start) = first.checked_add_days(Days::new(u64::from(shift))) else {
        return Vec::new();
    };
    calendar_by_steps(start, last, CalendarStep::days(7)).collect()
}

/// Convert an ISO weekday code (1 = Monday .. 7 = Sunday) into a [`Weekday`].
///
/// # Errors
/// Returns `DaybookError::Configuration` for codes outside `1..=7`.
pub fn iso_weekday(code: u8) -> Result<Weekday, DaybookError> {
    Ok(match code {
        1 => Weekday::Mon,
        2 => Weekday::Tue,
        3 => Weekday::Wed,
        4 => Weekday::Thu,
        5 => Weekday::Fri,
        6 => Weekday::Sat,
        7 => Weekday::Sun,
        other => {
            return Err(DaybookError::config(format!(
                "weekday must be in 1..=7 (Monday..Sunday), got {other}"
            )));
        }
    })
}

/// A calendar delta made of whole months and whole days.
///
/// Month arithmetic clamps to the end of shorter months, so adding one month
/// to January 31st lands on the last day of February.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CalendarStep {
    months: u32,
    days: u32,
}

impl CalendarStep {
    /// A step of `n` days.
    #[must_use]
    pub const fn days(n: u32) -> Self {
        Self { months: 0, days: n }
    }

    /// A step of `n` months.
    #[must_use]
    pub const fn months(n: u32) -> Self {
        Self { months: n, days: 0 }
    }

    /// Month component.
    #[must_use]
    pub const fn month_count(&self) -> u32 {
        self.months
    }

    /// Day component.
    #[must_use]
    pub const fn day_count(&self) -> u32 {
        self.days
    }

    /// True if the step does not move a date at all.
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.months == 0 && self.days == 0
    }

    /// `day` advanced by `times` steps, or `None` past the end of the calendar.
    #[must_use]
    pub fn add_times(&self, day: NaiveDate, times: u32) -> Option<NaiveDate> {
        day.checked_add_months(Months::new(self.months.checked_mul(times)?))?
            .checked_add_days(Days::new(u64::from(self.days) * u64::from(times)))
    }

    /// `day` advanced by one step, or `None` past the end of the calendar.
    #[must_use]
    pub fn add_to(&self, day: NaiveDate) -> Option<NaiveDate> {
        self.add_times(day, 1)
    }

    /// Length of the step expressed in years (`months / 12 + days / 365`).
    #[must_use]
    pub fn total_years(&self) -> f64 {
        f64::from(self.months) / 12.0 + f64::from(self.days) / 365.0
    }

    /// How many steps fit in one year, rounded down (`1 // total_years`).
    ///
    /// Computed in integers: 365 for a day, 52 for a week, 12 for a month.
    /// Steps longer than a year (or zero steps) report 0.
    #[must_use]
    pub const fn periods_per_year(&self) -> u32 {
        // Mixed steps are measured in days so that `1 // total_years` holds.
        let day_equivalent = self
            .months
            .saturating_mul(365)
            .saturating_add(self.days.saturating_mul(12));
        if day_equivalent == 0 {
            0
        } else {
            (365 * 12) / day_equivalent
        }
    }
}

/// Lazy sequence of dates from `start` to `end` inclusive, advancing by `step`.
///
/// The k-th item is `start + k * step`, computed from `start` each time, so
/// month steps do not drift after passing through a short month. The iterator
/// is `Clone`, which makes it restartable.
#[derive(Debug, Clone)]
pub struct CalendarSteps {
    start: NaiveDate,
    end: NaiveDate,
    step: CalendarStep,
    k: u32,
    done: bool,
}

impl Iterator for CalendarSteps {
    type Item = NaiveDate;

    fn next(&mut self) -> Option<NaiveDate> {
        if self.done {
            return None;
        }
        let Some(day) = self.step.add_times(self.start, self.k) else {
            self.done = true;
            return None;
        };
        if day > self.end {
            self.done = true;
            return None;
        }
        if self.step.is_zero() {
            // A zero step would never reach `end`; yield `start` once.
            self.done = true;
        } else {
            self.k = self.k.saturating_add(1);
        }
        Some(day)
    }
}

/// Dates from `start` through `end` (inclusive) spaced by `step`.
///
/// ```
/// use chrono::NaiveDate;
/// use daybook_core::calendar::{CalendarStep, calendar_by_steps};
///
/// let d = |m, day| NaiveDate::from_ymd_opt(2022, m, day).unwrap();
/// let months: Vec<_> = calendar_by_steps(d(1, 31), d(4, 30), CalendarStep::months(1)).collect();
/// assert_eq!(months, vec![d(1, 31), d(2, 28), d(3, 31), d(4, 30)]);
/// ```
#[must_use]
pub const fn calendar_by_steps(start: NaiveDate, end: NaiveDate, step: CalendarStep) -> CalendarSteps {
    CalendarSteps {
        start,
        end,
        step,
        k: 0,
        done: false,
    }
}
