use chrono::{DateTime, Utc};
use serde::Serialize;

use super::plan::{DeltaDrain, SyncRequest, SyncResponse};
use crate::config::SyncConfig;
use crate::error::FetchError;
use crate::execution::{cursor_of, merge_into, Cursor, ExecutionRecord, MergeStats};
use crate::source::{DeltaQuery, SnapshotQuery};

/// Result of folding a response into the sync state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// The record list changed.
    Applied(MergeStats),
    /// Response was current but carried nothing new.
    Unchanged,
    /// Response belonged to a superseded epoch and was dropped.
    Stale,
    /// Fetch failed; prior state kept, error recorded.
    Failed,
}

#[derive(Debug, Clone, Serialize)]
pub struct SyncStatusReport {
    pub session_id: Option<String>,
    pub epoch: u64,
    pub record_count: usize,
    pub cursor: Option<Cursor>,
    pub is_loading: bool,
    pub is_loading_more: bool,
    pub is_polling: bool,
    pub has_more: bool,
    pub last_error: Option<String>,
    /// RFC3339
    pub last_synced_at: Option<String>,
}

/// Merged, ordered, de-duplicated records of one session plus the
/// bookkeeping needed to keep them current.
#[derive(Debug)]
pub struct ExecutionLogSync {
    config: SyncConfig,
    session_id: Option<String>,
    records: Vec<ExecutionRecord>,
    cursor: Option<Cursor>,
    /// Leading rows covered by offset pages; deltas do not count.
    snapshot_rows: usize,
    epoch: u64,
    has_more: bool,
    loading: bool,
    loading_more: bool,
    polling: bool,
    loaded_once: bool,
    last_error: Option<FetchError>,
    last_synced_at: Option<DateTime<Utc>>,
}

impl ExecutionLogSync {
    pub fn new(config: SyncConfig) -> Self {
        Self {
            config,
            session_id: None,
            records: Vec::new(),
            cursor: None,
            snapshot_rows: 0,
            epoch: 0,
            has_more: true,
            loading: false,
            loading_more: false,
            polling: false,
            loaded_once: false,
            last_error: None,
            last_synced_at: None,
        }
    }

    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    pub fn records(&self) -> &[ExecutionRecord] {
        &self.records
    }

    pub fn cursor(&self) -> Option<&Cursor> {
        self.cursor.as_ref()
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn has_more(&self) -> bool {
        self.has_more
    }

    /// Initial first-page snapshot in flight before anything was loaded.
    pub fn is_loading(&self) -> bool {
        self.loading && !self.loaded_once
    }

    pub fn is_loading_more(&self) -> bool {
        self.loading_more
    }

    pub fn is_polling(&self) -> bool {
        self.polling
    }

    pub fn last_error(&self) -> Option<&FetchError> {
        self.last_error.as_ref()
    }

    pub fn status(&self) -> SyncStatusReport {
        SyncStatusReport {
            session_id: self.session_id.clone(),
            epoch: self.epoch,
            record_count: self.records.len(),
            cursor: self.cursor.clone(),
            is_loading: self.is_loading(),
            is_loading_more: self.loading_more,
            is_polling: self.polling,
            has_more: self.has_more,
            last_error: self.last_error.as_ref().map(ToString::to_string),
            last_synced_at: self.last_synced_at.map(|t| t.to_rfc3339()),
        }
    }

    /// Switch to `session_id` and plan the first page.
    ///
    /// Everything still in flight for the previous epoch becomes stale.
    pub fn reset(&mut self, session_id: &str) -> SyncRequest {
        self.clear();
        self.session_id = Some(session_id.to_string());
        self.loading = true;
        tracing::debug!(
            target: "execview.sync",
            stage = "sync.reset",
            session_id = %session_id,
            epoch = self.epoch
        );
        self.snapshot_request(0, true)
    }

    /// Drop all state and invalidate in-flight work without starting anew.
    pub fn clear(&mut self) {
        self.epoch += 1;
        self.session_id = None;
        self.records.clear();
        self.cursor = None;
        self.snapshot_rows = 0;
        self.has_more = true;
        self.loading = false;
        self.loading_more = false;
        self.polling = false;
        self.loaded_once = false;
        self.last_error = None;
        self.last_synced_at = None;
    }

    /// Next offset page of history, if one is known to exist and none is
    /// already on its way.
    pub fn load_more(&mut self) -> Option<SyncRequest> {
        if self.session_id.is_none() || self.loading || self.loading_more || !self.has_more {
            return None;
        }
        self.loading_more = true;
        Some(self.snapshot_request(self.snapshot_rows, false))
    }

    /// Forward sync from the cursor; falls back to a full snapshot when
    /// nothing has been observed yet.
    pub fn poll(&mut self) -> Option<SyncRequest> {
        let session_id = self.session_id.clone()?;
        let Some(cursor) = self.cursor.clone() else {
            if self.loading {
                return None;
            }
            self.loading = true;
            return Some(self.snapshot_request(0, true));
        };
        if self.polling {
            return None;
        }
        self.polling = true;
        Some(SyncRequest::Delta {
            epoch: self.epoch,
            query: DeltaQuery::from_cursor(&session_id, &cursor, self.config.page_limit()),
            max_pages: self.config.max_delta_pages.max(1),
        })
    }

    /// First page again, merged over what is already loaded.
    pub fn refetch(&mut self) -> Option<SyncRequest> {
        self.session_id.as_ref()?;
        self.loading = true;
        Some(self.snapshot_request(0, true))
    }

    pub fn apply(&mut self, response: SyncResponse) -> ApplyOutcome {
        if response.epoch() != self.epoch {
            tracing::debug!(
                target: "execview.sync",
                stage = "sync.apply.stale",
                response_epoch = response.epoch(),
                epoch = self.epoch
            );
            return ApplyOutcome::Stale;
        }

        match response {
            SyncResponse::Snapshot {
                replace,
                limit,
                result,
                ..
            } => {
                if replace {
                    self.loading = false;
                } else {
                    self.loading_more = false;
                }
                self.loaded_once = true;
                match result {
                    Ok(page) => self.apply_snapshot(page, replace, limit),
                    Err(err) => self.record_failure("snapshot", err),
                }
            }
            SyncResponse::Delta { result, .. } => {
                self.polling = false;
                match result {
                    Ok(drain) => self.apply_delta(drain),
                    Err(err) => self.record_failure("delta", err),
                }
            }
        }
    }

    fn apply_snapshot(
        &mut self,
        page: Vec<ExecutionRecord>,
        replace: bool,
        limit: usize,
    ) -> ApplyOutcome {
        let full = page.len() >= limit;
        if replace {
            // A first page shorter than the history already paged in says
            // nothing about what lies past it.
            if page.len() >= self.snapshot_rows {
                self.has_more = full;
            }
            self.snapshot_rows = self.snapshot_rows.max(page.len());
        } else {
            self.has_more = full;
            self.snapshot_rows += page.len();
        }
        self.last_error = None;
        self.last_synced_at = Some(Utc::now());

        // `reset` already emptied the list, so the first page lands on a
        // clean slate; a refetch only ever adds or upgrades rows.
        let stats = merge_into(&mut self.records, page);
        self.advance_cursor();

        tracing::debug!(
            target: "execview.sync",
            stage = "sync.snapshot.applied",
            replace = replace,
            added = stats.added,
            updated = stats.updated,
            total = self.records.len(),
            has_more = self.has_more
        );
        if stats.changed() {
            ApplyOutcome::Applied(stats)
        } else {
            ApplyOutcome::Unchanged
        }
    }

    fn apply_delta(&mut self, drain: DeltaDrain) -> ApplyOutcome {
        self.last_error = None;
        self.last_synced_at = Some(Utc::now());
        if drain.has_more {
            tracing::info!(
                target: "execview.sync",
                stage = "sync.delta.backlog",
                pages = drain.pages,
                "delta page cap reached, remaining backlog deferred to next poll"
            );
        }
        if drain.items.is_empty() {
            return ApplyOutcome::Unchanged;
        }

        let stats = merge_into(&mut self.records, drain.items);
        self.advance_cursor();
        tracing::debug!(
            target: "execview.sync",
            stage = "sync.delta.applied",
            pages = drain.pages,
            added = stats.added,
            updated = stats.updated,
            total = self.records.len()
        );
        if stats.changed() {
            ApplyOutcome::Applied(stats)
        } else {
            ApplyOutcome::Unchanged
        }
    }

    fn advance_cursor(&mut self) {
        let next = cursor_of(&self.records);
        if next > self.cursor {
            self.cursor = next;
        }
    }

    fn record_failure(&mut self, op: &'static str, err: FetchError) -> ApplyOutcome {
        tracing::warn!(
            target: "execview.sync",
            stage = "sync.fetch.failed",
            op = op,
            kind = err.kind(),
            error = %err
        );
        self.last_error = Some(err);
        ApplyOutcome::Failed
    }

    fn snapshot_request(&self, offset: usize, replace: bool) -> SyncRequest {
        SyncRequest::Snapshot {
            epoch: self.epoch,
            query: SnapshotQuery {
                session_id: self.session_id.clone().unwrap_or_default(),
                limit: self.config.page_limit(),
                offset,
            },
            replace,
        }
    }
}
