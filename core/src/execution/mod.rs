//! Execution records as served by the log, and the merge rules the sync layer
//! applies to them.

mod merge;
mod model;

pub use merge::{cursor_of, merge_into, MergeStats};
pub use model::{Cursor, ExecutionRecord};
