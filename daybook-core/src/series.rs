//! The date-keyed series container.

use core::fmt;
use core::iter;
use std::cell::OnceCell;
use std::collections::{BTreeSet, HashMap};

use chrono::NaiveDate;

use crate::granularity::Granularity;
use crate::timeseries::interpolate::Interpolator;
use crate::timeseries::util::find_delimiters;
use crate::{DaybookError, Fields, Observation, Record};

/// Views derived from the records, rebuilt lazily after any mutation.
#[derive(Debug, Clone)]
struct SeriesIndex {
    dates: Vec<NaiveDate>,
    positions: HashMap<NaiveDate, usize>,
    field_names: BTreeSet<String>,
}

impl SeriesIndex {
    fn build(records: &[Record]) -> Self {
        let dates: Vec<NaiveDate> = records.iter().map(|r| r.day).collect();
        let positions = dates.iter().enumerate().map(|(i, d)| (*d, i)).collect();
        let field_names = records
            .iter()
            .flat_map(|r| r.fields.keys().cloned())
            .collect();
        Self {
            dates,
            positions,
            field_names,
        }
    }
}

/// An ordered series holding exactly one [`Record`] per day.
///
/// Records are always sorted ascending by day. Only the mutators exposed here
/// can change the content, and each of them resets the derived views
/// (`dates`, day positions, field names), which are rebuilt on next access.
///
/// The cache lives in a `OnceCell`, so a series is `Send` but not `Sync`;
/// share it across threads behind a lock or clone it.
#[derive(Clone, Default)]
pub struct TimeSeries {
    records: Vec<Record>,
    index: OnceCell<SeriesIndex>,
}

impl TimeSeries {
    /// Build a series from records in any order.
    ///
    /// # Errors
    /// Returns `DaybookError::Conflict` if two records share a day.
    pub fn new(mut records: Vec<Record>) -> Result<Self, DaybookError> {
        records.sort_by_key(|r| r.day);
        if let Some(w) = records.windows(2).find(|w| w[0].day == w[1].day) {
            return Err(DaybookError::conflict(format!(
                "duplicate record for {}",
                w[0].day
            )));
        }
        Ok(Self::from_sorted(records))
    }

    /// Wrap records that are already sorted with unique days.
    pub(crate) fn from_sorted(records: Vec<Record>) -> Self {
        debug_assert!(records.windows(2).all(|w| w[0].day < w[1].day));
        Self {
            records,
            index: OnceCell::new(),
        }
    }

    /// Build a series from flattened rows; rows for the same day are merged.
    pub fn from_observations<I>(rows: I) -> Self
    where
        I: IntoIterator<Item = Observation>,
    {
        let mut ts = Self::default();
        ts.update_from_observations(rows);
        ts
    }

    fn invalidate(&mut self) {
        self.index.take();
    }

    fn index(&self) -> &SeriesIndex {
        self.index.get_or_init(|| SeriesIndex::build(&self.records))
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True when the series holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records in ascending day order.
    #[must_use]
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Iterate over records in ascending day order.
    pub fn iter(&self) -> core::slice::Iter<'_, Record> {
        self.records.iter()
    }

    /// Consume the series, returning its records in ascending day order.
    #[must_use]
    pub fn into_records(self) -> Vec<Record> {
        self.records
    }

    /// Day of the first record.
    #[must_use]
    pub fn first_day(&self) -> Option<NaiveDate> {
        self.records.first().map(|r| r.day)
    }

    /// Day of the last record.
    #[must_use]
    pub fn last_day(&self) -> Option<NaiveDate> {
        self.records.last().map(|r| r.day)
    }

    /// Days of all records, ascending.
    #[must_use]
    pub fn dates(&self) -> &[NaiveDate] {
        &self.index().dates
    }

    /// Position of the record for `day`.
    #[must_use]
    pub fn position(&self, day: NaiveDate) -> Option<usize> {
        self.index().positions.get(&day).copied()
    }

    /// True if a record exists for `day`.
    #[must_use]
    pub fn contains(&self, day: NaiveDate) -> bool {
        self.position(day).is_some()
    }

    /// Every field name that appears in at least one record.
    #[must_use]
    pub fn field_names(&self) -> &BTreeSet<String> {
        &self.index().field_names
    }

    /// Value of `name` for each record, `None` where the record lacks it.
    #[must_use]
    pub fn field_values(&self, name: &str) -> Vec<Option<f64>> {
        self.records.iter().map(|r| r.value(name)).collect()
    }

    /// Record for `day`.
    ///
    /// # Errors
    /// Returns `DaybookError::NotFound` if no record exists for `day`.
    pub fn get(&self, day: NaiveDate) -> Result<&Record, DaybookError> {
        self.position(day)
            .map(|i| &self.records[i])
            .ok_or_else(|| DaybookError::not_found(format!("record for {day}")))
    }

    /// Copy of the record for `day`, or an empty placeholder if absent.
    #[must_use]
    pub fn get_or_empty(&self, day: NaiveDate) -> Record {
        self.get(day)
            .map_or_else(|_| Record::empty(day), Clone::clone)
    }

    /// Copy of the fields stored for `day`, empty if absent.
    #[must_use]
    pub fn fields_or_empty(&self, day: NaiveDate) -> Fields {
        self.get(day).map(|r| r.fields.clone()).unwrap_or_default()
    }

    /// Mutable access to the fields of `day`.
    ///
    /// # Errors
    /// Returns `DaybookError::NotFound` if no record exists for `day`.
    pub fn fields_mut(&mut self, day: NaiveDate) -> Result<&mut Fields, DaybookError> {
        let pos = self
            .records
            .binary_search_by_key(&day, |r| r.day)
            .map_err(|_| DaybookError::not_found(format!("record for {day}")))?;
        self.invalidate();
        Ok(&mut self.records[pos].fields)
    }

    /// Insert a record for a day not yet present.
    ///
    /// # Errors
    /// Returns `DaybookError::Conflict` if a record for the same day exists;
    /// use [`TimeSeries::update`] to merge into it instead.
    pub fn append(&mut self, record: Record) -> Result<(), DaybookError> {
        match self.records.binary_search_by_key(&record.day, |r| r.day) {
            Ok(_) => Err(DaybookError::conflict(format!(
                "record for {} already exists",
                record.day
            ))),
            Err(pos) => {
                self.records.insert(pos, record);
                self.invalidate();
                Ok(())
            }
        }
    }

    /// Merge each record into the same-day record (incoming fields win on key
    /// collision), or insert it when the day is new.
    pub fn update<I>(&mut self, records: I)
    where
        I: IntoIterator<Item = Record>,
    {
        for rec in records {
            match self.records.binary_search_by_key(&rec.day, |r| r.day) {
                Ok(pos) => self.records[pos].fields.extend(rec.fields),
                Err(pos) => self.records.insert(pos, rec),
            }
        }
        self.invalidate();
    }

    /// Set one field per row, creating records for new days.
    pub fn update_from_observations<I>(&mut self, rows: I)
    where
        I: IntoIterator<Item = Observation>,
    {
        self.update(
            rows.into_iter()
                .map(|o| Record::empty(o.day).with_field(o.name, o.value)),
        );
    }

    /// Flatten the series into one row per stored field value, ordered by day
    /// then field name.
    #[must_use]
    pub fn observations(&self) -> Vec<Observation> {
        self.records
            .iter()
            .flat_map(|r| {
                r.fields
                    .iter()
                    .map(move |(name, value)| Observation::new(r.day, name.clone(), *value))
            })
            .collect()
    }

    /// Remove and return the record for `day`.
    ///
    /// # Errors
    /// Returns `DaybookError::NotFound` if no record exists for `day`.
    pub fn delete(&mut self, day: NaiveDate) -> Result<Record, DaybookError> {
        let pos = self
            .records
            .binary_search_by_key(&day, |r| r.day)
            .map_err(|_| DaybookError::not_found(format!("record for {day}")))?;
        let removed = self.records.remove(pos);
        self.invalidate();
        Ok(removed)
    }

    /// Copy of the records at positions `from_idx..to_idx`.
    ///
    /// Bounds are clamped to the series length, and an inverted range yields
    /// an empty series.
    #[must_use]
    pub fn slice(&self, from_idx: usize, to_idx: usize) -> Self {
        let to = to_idx.min(self.records.len());
        let from = from_idx.min(to);
        Self::from_sorted(self.records[from..to].to_vec())
    }

    /// Copy restricted to days within `[min_day, max_day]`.
    #[must_use]
    pub fn cut(&self, min_day: NaiveDate, max_day: NaiveDate) -> Self {
        let (lo, hi) = find_delimiters(self.dates(), min_day, max_day);
        self.slice(lo, hi)
    }

    /// Restrict this series to days within `[min_day, max_day]`.
    pub fn cut_in_place(&mut self, min_day: NaiveDate, max_day: NaiveDate) {
        let (lo, hi) = find_delimiters(self.dates(), min_day, max_day);
        self.records.truncate(hi);
        self.records.drain(..lo);
        self.invalidate();
    }

    /// One record per `granularity` step, from the first period beginning on
    /// or after the first day through the last day; missing days become empty
    /// records.
    ///
    /// ```
    /// use chrono::NaiveDate;
    /// use daybook_core::{Granularity, Record, TimeSeries};
    ///
    /// let d = |day| NaiveDate::from_ymd_opt(2022, 4, day).unwrap();
    /// let ts = TimeSeries::new(vec![
    ///     Record::empty(d(14)).with_field("a", 1.0),
    ///     Record::empty(d(16)).with_field("a", 3.0),
    /// ])
    /// .unwrap();
    /// let daily = ts.resample(Granularity::Daily);
    /// assert_eq!(daily.dates(), &[d(14), d(15), d(16)]);
    /// assert!(daily.get(d(15)).unwrap().is_empty());
    /// ```
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "daybook::series::resample",
            skip_all,
            fields(len = self.len(), granularity = %granularity),
        )
    )]
    #[must_use]
    pub fn resample(&self, granularity: Granularity) -> Self {
        let (Some(first), Some(last)) = (self.first_day(), self.last_day()) else {
            return Self::default();
        };
        let Some(start) = granularity.first_available_beginning(first) else {
            return Self::default();
        };
        let records = iter::successors(Some(start), |&beg| granularity.next_beginning(beg))
            .take_while(|&day| day <= last)
            .map(|day| self.get_or_empty(day))
            .collect();
        Self::from_sorted(records)
    }

    /// In-place variant of [`TimeSeries::resample`].
    pub fn resample_in_place(&mut self, granularity: Granularity) {
        *self = self.resample(granularity);
    }

    /// Copy where every record carries `name`, with missing values filled by
    /// `interpolator`. Samples are indexed by record position.
    ///
    /// # Errors
    /// - `DaybookError::NotFound` if no record carries `name`.
    /// - Any error from the interpolator, or `DaybookError::Data` if it
    ///   returns a different number of values.
    pub fn interpolate<I>(&self, name: &str, interpolator: &I) -> Result<Self, DaybookError>
    where
        I: Interpolator + ?Sized,
    {
        let mut out = self.clone();
        out.interpolate_in_place(name, interpolator)?;
        Ok(out)
    }

    /// In-place variant of [`TimeSeries::interpolate`]. On error the series is
    /// left untouched.
    ///
    /// # Errors
    /// See [`TimeSeries::interpolate`].
    pub fn interpolate_in_place<I>(&mut self, name: &str, interpolator: &I) -> Result<(), DaybookError>
    where
        I: Interpolator + ?Sized,
    {
        if !self.field_names().contains(name) {
            return Err(DaybookError::not_found(format!("field '{name}'")));
        }
        let samples = self.field_values(name);
        let filled = interpolator.fill(&samples)?;
        if filled.len() != samples.len() {
            return Err(DaybookError::Data(format!(
                "interpolator returned {} values for {} samples",
                filled.len(),
                samples.len()
            )));
        }
        for (rec, value) in self.records.iter_mut().zip(filled) {
            rec.fields.insert(name.to_owned(), value);
        }
        self.invalidate();
        Ok(())
    }

    /// Copy keeping only `name` in each record (records lacking it become empty).
    ///
    /// # Errors
    /// Returns `DaybookError::NotFound` if no record carries `name`.
    pub fn filter_by_field(&self, name: &str) -> Result<Self, DaybookError> {
        let mut out = self.clone();
        out.filter_by_field_in_place(name)?;
        Ok(out)
    }

    /// In-place variant of [`TimeSeries::filter_by_field`].
    ///
    /// # Errors
    /// Returns `DaybookError::NotFound` if no record carries `name`.
    pub fn filter_by_field_in_place(&mut self, name: &str) -> Result<(), DaybookError> {
        if !self.field_names().contains(name) {
            return Err(DaybookError::not_found(format!("field '{name}'")));
        }
        for rec in &mut self.records {
            rec.fields.retain(|k, _| k == name);
        }
        self.invalidate();
        Ok(())
    }
}

impl fmt::Debug for TimeSeries {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimeSeries")
            .field("records", &self.records)
            .finish()
    }
}

impl PartialEq for TimeSeries {
    fn eq(&self, other: &Self) -> bool {
        self.records == other.records
    }
}

impl TryFrom<Vec<Record>> for TimeSeries {
    type Error = DaybookError;

    fn try_from(records: Vec<Record>) -> Result<Self, Self::Error> {
        Self::new(records)
    }
}

impl From<TimeSeries> for Vec<Record> {
    fn from(ts: TimeSeries) -> Self {
        ts.records
    }
}

impl<'a> IntoIterator for &'a TimeSeries {
    type Item = &'a Record;
    type IntoIter = core::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

impl IntoIterator for TimeSeries {
    type Item = Record;
    type IntoIter = std::vec::IntoIter<Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}
