//! Browser screenshot URL cache with bounded not-found retry.

mod cache;
mod fetch;
mod prefetch;

pub use cache::{ScreenshotCache, ScreenshotEntry, ScreenshotTicket};
pub use fetch::{fetch_with_retry, ScreenshotPrefetchCache};
pub use prefetch::prefetch_targets;
