//! Client-side mirror of one session's execution log.
//!
//! [`ExecutionLogSync`] is the sans-IO state: it hands out epoch-tagged
//! [`SyncRequest`]s and folds [`SyncResponse`]s back in, dropping any whose
//! epoch has been superseded by a `reset`. [`execute`] runs a request against
//! an [`ExecutionLogSource`](crate::source::ExecutionLogSource), and
//! [`SyncClient`] glues the two together for sequential callers.

mod client;
mod driver;
mod plan;
mod state;

pub use client::SyncClient;
pub use driver::execute;
pub use plan::{DeltaDrain, SyncRequest, SyncResponse};
pub use state::{ApplyOutcome, ExecutionLogSync, SyncStatusReport};
