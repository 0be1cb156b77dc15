//! Per-day records and their flattened observation rows.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Named numeric values carried by a single day.
///
/// A `BTreeMap` keeps field names unique and iteration order stable, which the
/// flattened [`Observation`] view relies on.
pub type Fields = BTreeMap<String, f64>;

/// One calendar day of data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// The calendar day this record belongs to.
    pub day: NaiveDate,
    /// Field values recorded for `day`.
    pub fields: Fields,
}

impl Record {
    /// Build a record from a day and its fields.
    #[must_use]
    pub const fn new(day: NaiveDate, fields: Fields) -> Self {
        Self { day, fields }
    }

    /// Placeholder record for a day with no data.
    #[must_use]
    pub const fn empty(day: NaiveDate) -> Self {
        Self {
            day,
            fields: BTreeMap::new(),
        }
    }

    /// Build a record from `(name, value)` pairs. Later duplicates overwrite earlier ones.
    pub fn from_pairs<I, S>(day: NaiveDate, pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        Self {
            day,
            fields: pairs.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }

    /// Builder-style helper adding or replacing one field.
    #[must_use]
    pub fn with_field(mut self, name: impl Into<String>, value: f64) -> Self {
        self.fields.insert(name.into(), value);
        self
    }

    /// Value of `name`, if present.
    #[must_use]
    pub fn value(&self, name: &str) -> Option<f64> {
        self.fields.get(name).copied()
    }

    /// True when the record carries no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// A single field value flattened out of its record: `(day, name, value)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    /// Day the value belongs to.
    pub day: NaiveDate,
    /// Field name.
    pub name: String,
    /// Numeric value.
    pub value: f64,
}

impl Observation {
    /// Build an observation.
    pub fn new(day: NaiveDate, name: impl Into<String>, value: f64) -> Self {
        Self {
            day,
            name: name.into(),
            value,
        }
    }
}
