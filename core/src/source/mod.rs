mod query;
mod traits;

pub use query::{DeltaPage, DeltaQuery, ScreenshotRef, SnapshotQuery};
pub use traits::ExecutionLogSource;
