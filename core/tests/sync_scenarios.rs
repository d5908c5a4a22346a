mod common;

use std::sync::Arc;

use common::{bash, ids, FakeLogSource};
use execview_core::api::{
    execute, ApplyOutcome, Cursor, ExecutionLogSync, FetchError, SyncClient, SyncConfig,
};
use pretty_assertions::assert_eq;
use serde_json::json;

fn config(page_limit: usize) -> SyncConfig {
    SyncConfig {
        page_limit,
        ..SyncConfig::default()
    }
}

#[tokio::test]
async fn snapshot_then_delta_appends_new_record() {
    let source = Arc::new(FakeLogSource::new(vec![
        bash("a", 1, "ls"),
        bash("b", 2, "pwd"),
        bash("c", 3, "whoami"),
    ]));
    let mut client = SyncClient::new(source.clone(), config(100));

    client.reset("s1").await;
    assert_eq!(ids(client.records()), vec!["a", "b", "c"]);

    source.push(bash("d", 4, "date"));
    let outcome = client.poll().await;
    assert!(matches!(outcome, Some(ApplyOutcome::Applied(_))));
    assert_eq!(ids(client.records()), vec!["a", "b", "c", "d"]);
    assert_eq!(source.deltas(), 1);
}

#[tokio::test]
async fn repeated_delta_keeps_one_copy() {
    let source = Arc::new(FakeLogSource::new(vec![bash("a", 1, "ls")]));
    let mut client = SyncClient::new(source.clone(), config(100));
    client.reset("s1").await;

    source.push(bash("d", 4, "date"));
    let mut state = ExecutionLogSync::new(config(100));
    let first = state.reset("s1");
    state.apply(execute(source.as_ref(), first).await);

    // Two polls planned from the same cursor both return `d`.
    let poll_a = state.poll().unwrap();
    let resp_a = execute(source.as_ref(), poll_a.clone()).await;
    let resp_b = execute(source.as_ref(), poll_a).await;
    state.apply(resp_a);
    state.apply(resp_b);
    assert_eq!(ids(state.records()), vec!["a", "d"]);

    client.poll().await;
    client.poll().await;
    assert_eq!(ids(client.records()), vec!["a", "d"]);
}

#[tokio::test]
async fn late_response_from_previous_session_is_dropped() {
    let source = Arc::new(FakeLogSource::new(vec![bash("a", 1, "ls")]));
    let mut state = ExecutionLogSync::new(config(100));

    let old = state.reset("s1");
    let new = state.reset("s2");
    let old_resp = execute(source.as_ref(), old).await;
    let new_resp = execute(source.as_ref(), new).await;

    assert_eq!(state.apply(new_resp), ApplyOutcome::Applied(execview_core::api::MergeStats { added: 1, updated: 0 }));
    assert_eq!(state.apply(old_resp), ApplyOutcome::Stale);
    assert_eq!(state.session_id(), Some("s2"));
    assert_eq!(state.records().len(), 1);
}

#[tokio::test]
async fn load_all_pages_through_history() {
    let records = (0..7).map(|i| bash(&format!("r{i}"), i, "true")).collect();
    let source = Arc::new(FakeLogSource::new(records));
    let mut client = SyncClient::new(source.clone(), config(3));

    client.reset("s1").await;
    assert_eq!(client.records().len(), 3);
    assert!(client.state().has_more());

    let pages = client.load_all().await;
    assert_eq!(pages, 2);
    assert_eq!(client.records().len(), 7);
    assert!(!client.state().has_more());
    assert_eq!(client.state().cursor(), Some(&Cursor::new(common::ts(6), "r6")));
}

#[tokio::test]
async fn in_place_completion_surfaces_through_delta() {
    let mut running = bash("a", 1, "sleep 5");
    running.tool_output = None;
    running.updated_at = Some(common::ts(1));
    let source = Arc::new(FakeLogSource::new(vec![running.clone()]));
    let mut client = SyncClient::new(source.clone(), config(100));
    client.reset("s1").await;
    assert!(!client.records()[0].is_done());

    let mut done = running;
    done.tool_output = Some(json!({"output": "ok"}));
    done.updated_at = Some(common::ts(9));
    source.push(done);

    client.poll().await;
    assert_eq!(client.records().len(), 1);
    assert!(client.records()[0].is_done());
    assert_eq!(client.state().cursor(), Some(&Cursor::new(common::ts(1), "a")));
}

#[tokio::test]
async fn delta_failure_is_recorded_and_recovers() {
    let source = Arc::new(FakeLogSource::new(vec![bash("a", 1, "ls")]));
    let mut client = SyncClient::new(source.clone(), config(100));
    client.reset("s1").await;

    source.push(bash("b", 2, "pwd"));
    source.fail_next(FetchError::Transport("connection refused".into()));
    assert_eq!(client.poll().await, Some(ApplyOutcome::Failed));
    assert_eq!(ids(client.records()), vec!["a"]);
    assert!(client.state().last_error().is_some());

    assert!(matches!(client.poll().await, Some(ApplyOutcome::Applied(_))));
    assert_eq!(ids(client.records()), vec!["a", "b"]);
    assert!(client.state().last_error().is_none());
}

#[tokio::test]
async fn refetch_picks_up_new_rows_without_clearing_first() {
    let source = Arc::new(FakeLogSource::new(vec![bash("a", 1, "ls")]));
    let mut client = SyncClient::new(source.clone(), config(100));
    client.reset("s1").await;

    source.push(bash("b", 2, "pwd"));
    let epoch = client.state().epoch();
    client.refetch().await;
    assert_eq!(client.state().epoch(), epoch);
    assert_eq!(ids(client.records()), vec!["a", "b"]);
    assert_eq!(source.snapshots(), 2);
}

#[tokio::test]
async fn late_finishing_early_row_does_not_hide_later_rows() {
    let records: Vec<_> = (0..10u32)
        .map(|n| {
            let mut r = bash(&format!("r{n}"), n, "true");
            r.updated_at = Some(common::ts(match n {
                2 => 50,
                9 => 59,
                _ => n,
            }));
            r
        })
        .collect();
    let source = Arc::new(FakeLogSource::new(records));
    let mut client = SyncClient::new(source.clone(), config(3));

    client.reset("s1").await;
    client.poll().await;
    client.load_all().await;

    let expected: Vec<String> = (0..10).map(|n| format!("r{n}")).collect();
    assert_eq!(ids(client.records()), expected);
    assert_eq!(client.state().cursor(), Some(&Cursor::new(common::ts(9), "r9")));
}

#[tokio::test]
async fn refetch_after_load_more_keeps_history() {
    let source = Arc::new(FakeLogSource::new(vec![
        bash("r0", 0, "ls"),
        bash("r1", 1, "ls"),
        bash("r2", 2, "ls"),
        bash("r3", 3, "ls"),
    ]));
    let mut client = SyncClient::new(source.clone(), config(2));
    client.reset("s1").await;
    client.load_more().await;
    let before = client.state().cursor().cloned();
    assert_eq!(client.records().len(), 4);

    client.refetch().await;
    assert_eq!(ids(client.records()), vec!["r0", "r1", "r2", "r3"]);
    assert_eq!(client.state().cursor().cloned(), before);
}
