//! Re-export of the records, configuration values, and error type from `daybook-types`.
// Consolidated re-exports so downstream crates can depend on `daybook-core` only

pub use daybook_types::DaybookError;
pub use daybook_types::{Anchor, BatchConfig, DecomposeConfig, HeadPolicy, Reduction, TailPolicy};
pub use daybook_types::{Fields, Observation, Record};
