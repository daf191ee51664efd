pub mod domain;
pub mod error;
pub mod merge;

pub use domain::*;
pub use error::CoreError;
pub use merge::{merge_records, MergeEngine, MergeReport, MergedSet};
