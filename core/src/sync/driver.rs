use super::plan::{DeltaDrain, SyncRequest, SyncResponse};
use crate::error::FetchResult;
use crate::source::{DeltaQuery, ExecutionLogSource};

/// Run one planned request against `source`.
///
/// Never fails: errors travel inside the response so the state can record
/// them against the right epoch.
pub async fn execute(source: &dyn ExecutionLogSource, request: SyncRequest) -> SyncResponse {
    match request {
        SyncRequest::Snapshot {
            epoch,
            query,
            replace,
        } => {
            let limit = query.limit;
            tracing::debug!(
                target: "execview.sync",
                stage = "sync.snapshot.fetch",
                source = source.name(),
                session_id = %query.session_id,
                offset = query.offset,
                limit = limit
            );
            let result = source.snapshot(query).await;
            SyncResponse::Snapshot {
                epoch,
                replace,
                limit,
                result,
            }
        }
        SyncRequest::Delta {
            epoch,
            query,
            max_pages,
        } => SyncResponse::Delta {
            epoch,
            result: drain_delta(source, query, max_pages).await,
        },
    }
}

/// Follow delta pages until the server reports no more or the page cap hits.
///
/// A failing page fails the whole cycle; the cursor in the state has not
/// moved, so the next poll retries from the same place.
async fn drain_delta(
    source: &dyn ExecutionLogSource,
    mut query: DeltaQuery,
    max_pages: usize,
) -> FetchResult<DeltaDrain> {
    let max_pages = max_pages.max(1);
    let mut drain = DeltaDrain::default();

    loop {
        let page = source.delta(query.clone()).await?;
        drain.pages += 1;
        let next = page.next_cursor();
        let more = page.has_more;
        drain.items.extend(page.items);
        if next.is_some() {
            drain.next = next.clone();
        }

        let Some(next) = next.filter(|_| more) else {
            drain.has_more = false;
            break;
        };
        if drain.pages >= max_pages {
            drain.has_more = true;
            break;
        }
        query.after_created_at = next.after_created_at;
        query.after_id = next.after_id;
    }

    tracing::debug!(
        target: "execview.sync",
        stage = "sync.delta.drained",
        source = source.name(),
        session_id = %query.session_id,
        pages = drain.pages,
        items = drain.items.len(),
        has_more = drain.has_more
    );
    Ok(drain)
}
