use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Unified error type for the daybook workspace.
///
/// This covers argument validation, absent days or fields, offsets that fall
/// outside their calendar period, operations a granularity cannot support,
/// merge conflicts, and collaborator results that break their contract.
#[derive(Debug, Error, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum DaybookError {
    /// Malformed caller arguments detected before any iteration begins.
    #[error("invalid configuration: {0}")]
    Configuration(String),

    /// A requested day or field has no corresponding entry.
    #[error("not found: {what}")]
    NotFound {
        /// Description of the missing entry, e.g. "record for 2022-04-16".
        what: String,
    },

    /// An offset or index exceeds the bounds of its calendar period.
    #[error("index {index} out of range for {what} (valid: -1..{bound})")]
    OutOfRange {
        /// The rejected index (0-based, `-1` meaning "last").
        index: i64,
        /// Exclusive upper bound of valid non-negative indices.
        bound: usize,
        /// What was being indexed, e.g. "days of 2022-02".
        what: String,
    },

    /// The operation is not defined for the target granularity.
    #[error("unsupported operation: {operation}")]
    Unsupported {
        /// Operation label, e.g. "nth_day on daily granularity".
        operation: String,
    },

    /// Two inputs define the same key and no resolver was supplied.
    #[error("conflict: {what}")]
    Conflict {
        /// Description of the clash, e.g. shared field names or a duplicate day.
        what: String,
    },

    /// Issues with data produced by, or handed to, an external collaborator.
    #[error("data issue: {0}")]
    Data(String),
}

impl DaybookError {
    /// Helper: build a `Configuration` error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Helper: build a `NotFound` error for a description of the missing entry.
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound { what: what.into() }
    }

    /// Helper: build an `OutOfRange` error.
    pub fn out_of_range(index: i64, bound: usize, what: impl Into<String>) -> Self {
        Self::OutOfRange {
            index,
            bound,
            what: what.into(),
        }
    }

    /// Helper: build an `Unsupported` error for an operation label.
    pub fn unsupported(operation: impl Into<String>) -> Self {
        Self::Unsupported {
            operation: operation.into(),
        }
    }

    /// Helper: build a `Conflict` error.
    pub fn conflict(what: impl Into<String>) -> Self {
        Self::Conflict { what: what.into() }
    }

    /// Helper: build a `Conflict` error listing the field names two mappings share.
    pub fn shared_fields<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let joined = names
            .into_iter()
            .map(|s| s.as_ref().to_owned())
            .collect::<Vec<_>>()
            .join(", ");
        Self::Conflict {
            what: format!("cannot merge fields because of shared keys [{joined}]"),
        }
    }

    /// Returns true if this error reports a legitimate absence rather than a
    /// programming or input mistake.
    ///
    /// Callers that treat absence as "no data" can branch on this instead of
    /// matching variants.
    #[must_use]
    pub const fn is_absence(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
