#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use execview_core::api::{
    DeltaPage, DeltaQuery, ExecutionLogSource, ExecutionRecord, FetchError, FetchResult,
    RuntimeEvent, ScreenshotRef, SnapshotQuery,
};
use serde_json::{json, Value};
use tokio::sync::broadcast;

/// Routes `execview.*` tracing to the test harness writer; `RUST_LOG` overrides.
pub fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}

/// In-memory server-side log with the same paging rules as the HTTP API.
#[derive(Default)]
pub struct FakeLogSource {
    records: Mutex<Vec<ExecutionRecord>>,
    /// tool_use_id -> (remaining not-found answers, url)
    screenshots: Mutex<HashMap<String, (usize, String)>>,
    fail_next: Mutex<Option<FetchError>>,
    /// Held after the log was read, so a slow answer reflects the moment it
    /// was asked.
    latency: Mutex<Duration>,
    screenshot_latency: Mutex<Duration>,
    pub snapshot_calls: AtomicUsize,
    pub delta_calls: AtomicUsize,
    pub screenshot_calls: AtomicUsize,
}

impl FakeLogSource {
    pub fn new(records: Vec<ExecutionRecord>) -> Self {
        let source = Self::default();
        source.push_all(records);
        source
    }

    pub fn push(&self, record: ExecutionRecord) {
        let mut records = self.records.lock().unwrap();
        match records.iter_mut().find(|r| r.id == record.id) {
            Some(existing) => *existing = record,
            None => records.push(record),
        }
        records.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));
    }

    pub fn push_all(&self, records: Vec<ExecutionRecord>) {
        for r in records {
            self.push(r);
        }
    }

    pub fn add_screenshot(&self, tool_use_id: &str, misses: usize, url: &str) {
        self.screenshots
            .lock()
            .unwrap()
            .insert(tool_use_id.to_string(), (misses, url.to_string()));
    }

    pub fn fail_next(&self, err: FetchError) {
        *self.fail_next.lock().unwrap() = Some(err);
    }

    pub fn snapshots(&self) -> usize {
        self.snapshot_calls.load(Ordering::SeqCst)
    }

    pub fn deltas(&self) -> usize {
        self.delta_calls.load(Ordering::SeqCst)
    }

    pub fn screenshot_requests(&self) -> usize {
        self.screenshot_calls.load(Ordering::SeqCst)
    }

    pub fn set_latency(&self, latency: Duration) {
        *self.latency.lock().unwrap() = latency;
    }

    pub fn set_screenshot_latency(&self, latency: Duration) {
        *self.screenshot_latency.lock().unwrap() = latency;
    }

    fn take_failure(&self) -> Option<FetchError> {
        self.fail_next.lock().unwrap().take()
    }

    async fn respond<T>(&self, latency: &Mutex<Duration>, answer: FetchResult<T>) -> FetchResult<T> {
        let delay = *latency.lock().unwrap();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        answer
    }
}

#[async_trait]
impl ExecutionLogSource for FakeLogSource {
    fn name(&self) -> &str {
        "fake"
    }

    async fn snapshot(&self, query: SnapshotQuery) -> FetchResult<Vec<ExecutionRecord>> {
        self.snapshot_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = self.take_failure() {
            return Err(err);
        }
        let page: Vec<ExecutionRecord> = self
            .records
            .lock()
            .unwrap()
            .iter()
            .skip(query.offset)
            .take(query.limit)
            .cloned()
            .collect();
        self.respond(&self.latency, Ok(page)).await
    }

    async fn delta(&self, query: DeltaQuery) -> FetchResult<DeltaPage> {
        self.delta_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = self.take_failure() {
            return Err(err);
        }
        let mut after: Vec<ExecutionRecord> = self
            .records
            .lock()
            .unwrap()
            .iter()
            .filter(|r| {
                (r.sync_key(), r.id.as_str())
                    > (query.after_created_at.as_str(), query.after_id.as_str())
            })
            .cloned()
            .collect();
        after.sort_by(|a, b| (a.sync_key(), a.id.as_str()).cmp(&(b.sync_key(), b.id.as_str())));
        let has_more = after.len() > query.limit;
        after.truncate(query.limit);
        let page = DeltaPage {
            items: after,
            has_more,
            next_after_created_at: None,
            next_after_id: None,
        };
        self.respond(&self.latency, Ok(page)).await
    }

    async fn screenshot(&self, _session_id: &str, tool_use_id: &str) -> FetchResult<ScreenshotRef> {
        self.screenshot_calls.fetch_add(1, Ordering::SeqCst);
        let answer = {
            let mut shots = self.screenshots.lock().unwrap();
            match shots.get_mut(tool_use_id) {
                Some((misses, _)) if *misses > 0 => {
                    *misses -= 1;
                    Err(FetchError::NotFound(tool_use_id.to_string()))
                }
                Some((_, url)) => Ok(ScreenshotRef { url: url.clone() }),
                None => Err(FetchError::NotFound(tool_use_id.to_string())),
            }
        };
        self.respond(&self.screenshot_latency, answer).await
    }
}

/// Serves each session id from its own log.
#[derive(Default)]
pub struct SessionRouter {
    sessions: HashMap<String, Arc<FakeLogSource>>,
}

impl SessionRouter {
    pub fn with(mut self, session_id: &str, source: Arc<FakeLogSource>) -> Self {
        self.sessions.insert(session_id.to_string(), source);
        self
    }

    fn route(&self, session_id: &str) -> FetchResult<&FakeLogSource> {
        self.sessions
            .get(session_id)
            .map(Arc::as_ref)
            .ok_or_else(|| FetchError::NotFound(format!("session {session_id}")))
    }
}

#[async_trait]
impl ExecutionLogSource for SessionRouter {
    fn name(&self) -> &str {
        "router"
    }

    async fn snapshot(&self, query: SnapshotQuery) -> FetchResult<Vec<ExecutionRecord>> {
        self.route(&query.session_id)?.snapshot(query).await
    }

    async fn delta(&self, query: DeltaQuery) -> FetchResult<DeltaPage> {
        self.route(&query.session_id)?.delta(query).await
    }

    async fn screenshot(&self, session_id: &str, tool_use_id: &str) -> FetchResult<ScreenshotRef> {
        self.route(session_id)?.screenshot(session_id, tool_use_id).await
    }
}

pub fn ts(n: u32) -> String {
    format!("2026-03-01T10:00:{n:02}.000000")
}

pub fn bash(id: &str, n: u32, command: &str) -> ExecutionRecord {
    let mut r = ExecutionRecord::new(id, ts(n), "Bash");
    r.tool_input = json!({ "command": command });
    r.tool_output = Some(json!({ "output": "" }));
    r
}

pub fn browser(id: &str, n: u32, action: &str, input: Value) -> ExecutionRecord {
    let mut r = ExecutionRecord::new(id, ts(n), format!("mcp____poco_playwright__browser_{action}"));
    r.tool_input = input;
    r.tool_use_id = Some(format!("tu-{id}"));
    r.tool_output = Some(json!({ "ok": true }));
    r
}

pub fn ids(records: &[ExecutionRecord]) -> Vec<&str> {
    records.iter().map(|r| r.id.as_str()).collect()
}

/// Wait until an event matching `pred` arrives, or panic after `limit`.
pub async fn wait_for<F>(rx: &mut broadcast::Receiver<RuntimeEvent>, limit: Duration, mut pred: F) -> RuntimeEvent
where
    F: FnMut(&RuntimeEvent) -> bool,
{
    let fut = async {
        loop {
            match rx.recv().await {
                Ok(event) if pred(&event) => return event,
                Ok(_) | Err(broadcast::error::RecvError::Lagged(_)) => continue,
                Err(broadcast::error::RecvError::Closed) => panic!("event channel closed"),
            }
        }
    };
    tokio::time::timeout(limit, fut)
        .await
        .expect("timed out waiting for runtime event")
}
