//! Daybook-specific records, configuration primitives, and the shared error type.
#![warn(missing_docs)]

mod config;
mod error;
mod record;

pub use config::{Anchor, BatchConfig, DecomposeConfig, HeadPolicy, Reduction, TailPolicy};
pub use error::DaybookError;
pub use record::{Fields, Observation, Record};
