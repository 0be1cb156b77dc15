//! Calendar granularities and their period arithmetic.
//!
//! A [`Granularity`] partitions the calendar into contiguous, non-overlapping
//! periods. The variant-specific part is limited to boundaries, period length,
//! and step size; the offset math (`nth_day`, `nth_weekday`,
//! `first_available_beginning`) is shared by all variants.

use core::fmt;
use core::str::FromStr;

use chrono::{Datelike, Days, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use crate::DaybookError;
use crate::calendar::{self, CalendarStep};

/// Calendar unit used to partition a series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    /// One period per calendar day.
    Daily,
    /// Monday-to-Sunday weeks.
    Weekly,
    /// Calendar months.
    Monthly,
    /// Calendar quarters starting in January, April, July, and October.
    Quarterly,
    /// Calendar years.
    Yearly,
}

impl Granularity {
    /// All variants, finest first.
    pub const ALL: [Self; 5] = [
        Self::Daily,
        Self::Weekly,
        Self::Monthly,
        Self::Quarterly,
        Self::Yearly,
    ];

    /// Long lowercase name, as accepted by [`FromStr`].
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
            Self::Quarterly => "quarterly",
            Self::Yearly => "yearly",
        }
    }

    /// Step between consecutive period beginnings.
    #[must_use]
    pub const fn delta(&self) -> CalendarStep {
        match self {
            Self::Daily => CalendarStep::days(1),
            Self::Weekly => CalendarStep::days(7),
            Self::Monthly => CalendarStep::months(1),
            Self::Quarterly => CalendarStep::months(3),
            Self::Yearly => CalendarStep::months(12),
        }
    }

    /// First day of the period containing `day`.
    ///
    /// ```
    /// use chrono::NaiveDate;
    /// use daybook_core::Granularity;
    ///
    /// let day = NaiveDate::from_ymd_opt(2022, 4, 16).unwrap();
    /// assert_eq!(
    ///     Granularity::Monthly.beginning_of(day),
    ///     NaiveDate::from_ymd_opt(2022, 4, 1).unwrap()
    /// );
    /// ```
    #[must_use]
    pub fn beginning_of(&self, day: NaiveDate) -> NaiveDate {
        match self {
            Self::Daily => day,
            Self::Weekly => calendar::first_day_of_week(day),
            Self::Monthly => calendar::first_day_of_month(day),
            Self::Quarterly => calendar::first_day_of_quarter(day),
            Self::Yearly => calendar::first_day_of_year(day),
        }
    }

    /// Last day of the period containing `day`.
    #[must_use]
    pub fn end_of(&self, day: NaiveDate) -> NaiveDate {
        match self {
            Self::Daily => day,
            Self::Weekly => calendar::last_day_of_week(day),
            Self::Monthly => calendar::last_day_of_month(day),
            Self::Quarterly => calendar::last_day_of_quarter(day),
            Self::Yearly => calendar::last_day_of_year(day),
        }
    }

    /// Number of days in the period containing `day`.
    #[must_use]
    pub fn period_len(&self, day: NaiveDate) -> u32 {
        match self {
            Self::Daily => 1,
            // Shorter than 7 only for the truncated weeks at the calendar edges.
            Self::Weekly => {
                let span = self.end_of(day) - self.beginning_of(day);
                u32::try_from(span.num_days() + 1).unwrap_or(7)
            }
            Self::Monthly => calendar::days_of_month(day),
            Self::Quarterly => calendar::days_of_quarter(day),
            Self::Yearly => calendar::days_of_year(day),
        }
    }

    /// Length of the shortest period this granularity can produce.
    #[must_use]
    pub const fn min_period_len(&self) -> u32 {
        match self {
            Self::Daily => 1,
            Self::Weekly => 7,
            Self::Monthly => 28,
            Self::Quarterly => 90,
            Self::Yearly => 365,
        }
    }

    /// Fewest occurrences of any weekday within one period, or `None` for
    /// daily periods, which have no weekday structure.
    #[must_use]
    pub const fn min_weekday_occurrences(&self) -> Option<u32> {
        match self {
            Self::Daily => None,
            Self::Weekly => Some(1),
            Self::Monthly => Some(4),
            Self::Quarterly => Some(12),
            Self::Yearly => Some(52),
        }
    }

    /// Beginning of the period that follows the one containing `day`, or
    /// `None` if that period would start past the end of the calendar.
    #[must_use]
    pub fn next_beginning(&self, day: NaiveDate) -> Option<NaiveDate> {
        self.end_of(day).succ_opt()
    }

    /// Earliest period beginning that is on or after `day`.
    ///
    /// Returns `None` only if the next period would start past the end of the
    /// representable calendar.
    #[must_use]
    pub fn first_available_beginning(&self, day: NaiveDate) -> Option<NaiveDate> {
        let beg = self.beginning_of(day);
        if beg >= day {
            Some(beg)
        } else {
            self.next_beginning(day)
        }
    }

    /// The `idx`-th day (0-indexed, `-1` for the last) of the period containing `day`.
    ///
    /// ```
    /// use chrono::NaiveDate;
    /// use daybook_core::Granularity;
    ///
    /// let d = |m, day| NaiveDate::from_ymd_opt(2022, m, day).unwrap();
    /// assert_eq!(Granularity::Monthly.nth_day(d(4, 16), 7).unwrap(), d(4, 8));
    /// assert_eq!(Granularity::Monthly.nth_day(d(4, 16), -1).unwrap(), d(4, 30));
    /// assert!(Granularity::Monthly.nth_day(d(4, 16), 30).is_err());
    /// ```
    ///
    /// # Errors
    /// - `DaybookError::Unsupported` for [`Granularity::Daily`].
    /// - `DaybookError::OutOfRange` if `idx` is outside `[-1, period_len)`.
    pub fn nth_day(&self, day: NaiveDate, idx: i64) -> Result<NaiveDate, DaybookError> {
        if *self == Self::Daily {
            return Err(DaybookError::unsupported("nth_day on daily granularity"));
        }
        let len = self.period_len(day);
        if idx == -1 {
            return Ok(self.end_of(day));
        }
        let offset = u32::try_from(idx)
            .ok()
            .filter(|&i| i < len)
            .ok_or_else(|| {
                DaybookError::out_of_range(idx, len as usize, self.period_label(day))
            })?;
        self.beginning_of(day)
            .checked_add_days(Days::new(u64::from(offset)))
            .ok_or_else(|| DaybookError::out_of_range(idx, len as usize, self.period_label(day)))
    }

    /// The `idx`-th occurrence (0-indexed, `-1` for the last) of `weekday`
    /// within the period containing `day`.
    ///
    /// # Errors
    /// - `DaybookError::Unsupported` for [`Granularity::Daily`].
    /// - `DaybookError::OutOfRange` if `idx` is outside `[-1, occurrences)`.
    pub fn nth_weekday(
        &self,
        day: NaiveDate,
        weekday: Weekday,
        idx: i64,
    ) -> Result<NaiveDate, DaybookError> {
        if *self == Self::Daily {
            return Err(DaybookError::unsupported(
                "nth_weekday on daily granularity",
            ));
        }
        let days = calendar::weekdays_of_range(self.beginning_of(day), self.end_of(day), weekday);
        let picked = if idx == -1 {
            days.last().copied()
        } else {
            usize::try_from(idx).ok().and_then(|i| days.get(i).copied())
        };
        picked.ok_or_else(|| {
            DaybookError::out_of_range(
                idx,
                days.len(),
                format!("{weekday:?} occurrences of {}", self.period_label(day)),
            )
        })
    }

    fn period_label(&self, day: NaiveDate) -> String {
        match self {
            Self::Daily => format!("day {day}"),
            Self::Weekly => format!("days of week starting {}", self.beginning_of(day)),
            Self::Monthly => format!("days of {}-{:02}", day.year(), day.month()),
            Self::Quarterly => format!("days of {}-Q{}", day.year(), day.month0() / 3 + 1),
            Self::Yearly => format!("days of {}", day.year()),
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Granularity {
    type Err = DaybookError;

    /// Accepts long names (`"monthly"`) and single-letter codes (`"M"`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "daily" | "D" => Ok(Self::Daily),
            "weekly" | "W" => Ok(Self::Weekly),
            "monthly" | "M" => Ok(Self::Monthly),
            "quarterly" | "Q" => Ok(Self::Quarterly),
            "yearly" | "Y" => Ok(Self::Yearly),
            other => Err(DaybookError::config(format!(
                "invalid granularity value: {other}"
            ))),
        }
    }
}
