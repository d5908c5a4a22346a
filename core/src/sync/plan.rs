use crate::error::FetchResult;
use crate::execution::{Cursor, ExecutionRecord};
use crate::source::{DeltaQuery, SnapshotQuery};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncRequest {
    /// `replace` marks the first page (offset 0) rather than a history page;
    /// both are merged, `reset` empties the list beforehand.
    Snapshot {
        epoch: u64,
        query: SnapshotQuery,
        replace: bool,
    },
    Delta {
        epoch: u64,
        query: DeltaQuery,
        max_pages: usize,
    },
}

impl SyncRequest {
    pub fn epoch(&self) -> u64 {
        match self {
            SyncRequest::Snapshot { epoch, .. } | SyncRequest::Delta { epoch, .. } => *epoch,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            SyncRequest::Snapshot { replace: true, .. } => "snapshot",
            SyncRequest::Snapshot { replace: false, .. } => "load_more",
            SyncRequest::Delta { .. } => "delta",
        }
    }
}

/// Records gathered by one poll cycle.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeltaDrain {
    pub items: Vec<ExecutionRecord>,
    pub pages: usize,
    /// Backlog left behind when the page cap was hit.
    pub has_more: bool,
    pub next: Option<Cursor>,
}

#[derive(Debug, Clone)]
pub enum SyncResponse {
    Snapshot {
        epoch: u64,
        replace: bool,
        limit: usize,
        result: FetchResult<Vec<ExecutionRecord>>,
    },
    Delta {
        epoch: u64,
        result: FetchResult<DeltaDrain>,
    },
}

impl SyncResponse {
    pub fn epoch(&self) -> u64 {
        match self {
            SyncResponse::Snapshot { epoch, .. } | SyncResponse::Delta { epoch, .. } => *epoch,
        }
    }

    /// Same labels as [`SyncRequest::kind`].
    pub fn kind(&self) -> &'static str {
        match self {
            SyncResponse::Snapshot { replace: true, .. } => "snapshot",
            SyncResponse::Snapshot { replace: false, .. } => "load_more",
            SyncResponse::Delta { .. } => "delta",
        }
    }
}
