use async_trait::async_trait;
use execview_core::api::{
    DeltaPage, DeltaQuery, ExecutionLogSource, ExecutionRecord, FetchResult, ScreenshotRef,
    SessionInfo, SnapshotQuery,
};
use reqwest::Url;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use super::http_error::{preview_body, HttpSourceError};

const DELTA_LIMIT_MAX: usize = 2000;

/// Execution log served by the backend's REST API.
#[derive(Clone)]
pub struct HttpExecutionLogSource {
    api_token: String,
    http: reqwest::Client,
    base: Url,
}

/// List endpoints answer either a bare array or `{ "items": [...] }`.
#[derive(Deserialize)]
#[serde(untagged)]
enum RecordList {
    Bare(Vec<ExecutionRecord>),
    Wrapped { items: Vec<ExecutionRecord> },
}

impl HttpExecutionLogSource {
    pub fn new(base_url: &str, api_token: String, timeout_ms: u64) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_millis(timeout_ms))
            .build()?;
        let base = Url::parse(base_url.trim())?;
        if base.cannot_be_a_base() {
            return Err(HttpSourceError::invalid_url(base_url).into());
        }
        Ok(Self {
            api_token,
            http,
            base,
        })
    }

    fn auth(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        if self.api_token.trim().is_empty() {
            req
        } else {
            req.bearer_auth(&self.api_token)
        }
    }

    /// `{base}/api/v1/sessions/{segments...}`, each segment percent-encoded.
    fn session_url(&self, segments: &[&str]) -> Result<Url, HttpSourceError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| HttpSourceError::invalid_url(self.base.as_str()))?
            .pop_if_empty()
            .extend(["api", "v1", "sessions"])
            .extend(segments);
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: Url,
        query: &[(&str, String)],
    ) -> Result<T, HttpSourceError> {
        let url_str = url.to_string();
        let req = self.http.get(url).query(query);
        let resp = self
            .auth(req)
            .send()
            .await
            .map_err(|err| HttpSourceError::from_reqwest(err, url_str.clone()))?;
        let (status, data) = parse_enveloped(resp).await?;
        serde_json::from_value::<T>(data).map_err(|err| {
            HttpSourceError::decode_error(status, url_str, err, "<envelope data>".to_string())
        })
    }

    /// Session summary; used to decide whether the session is still live.
    pub async fn session_info(&self, session_id: &str) -> Result<SessionInfo, HttpSourceError> {
        let url = self.session_url(&[session_id])?;
        tracing::debug!(
            target: "execview.http",
            stage = "http.session.in",
            session_id = %session_id
        );
        self.get_json(url, &[]).await
    }
}

/// Read the body, reject non-2xx, and unwrap a `{ code, message, data }`
/// envelope when present.
async fn parse_enveloped(resp: reqwest::Response) -> Result<(u16, Value), HttpSourceError> {
    let status = resp.status();
    let url = resp.url().to_string();
    let body = resp
        .text()
        .await
        .map_err(|err| HttpSourceError::from_reqwest(err, url.clone()))?;

    if !status.is_success() {
        let message = serde_json::from_str::<Value>(&body)
            .ok()
            .and_then(|v| v.get("message").and_then(Value::as_str).map(str::to_string))
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| preview_body(&body));
        return Err(HttpSourceError::status_error(status.as_u16(), url, message));
    }

    if body.trim().is_empty() {
        return Ok((status.as_u16(), Value::Null));
    }

    let payload = serde_json::from_str::<Value>(&body).map_err(|err| {
        let preview = preview_body(&body);
        HttpSourceError::decode_error(status.as_u16(), url.clone(), err, preview)
    })?;

    match payload {
        Value::Object(mut map) if map.contains_key("data") => {
            let code = map.get("code").and_then(Value::as_i64).unwrap_or(0);
            if code != 0 && code != 200 {
                let message = map
                    .get("message")
                    .and_then(Value::as_str)
                    .unwrap_or("API request failed")
                    .to_string();
                return Err(HttpSourceError::api_error(code, url, message));
            }
            Ok((status.as_u16(), map.remove("data").unwrap_or(Value::Null)))
        }
        other => Ok((status.as_u16(), other)),
    }
}

#[async_trait]
impl ExecutionLogSource for HttpExecutionLogSource {
    fn name(&self) -> &str {
        "http"
    }

    async fn snapshot(&self, query: SnapshotQuery) -> FetchResult<Vec<ExecutionRecord>> {
        let url = self.session_url(&[&query.session_id, "tool-executions"])?;
        tracing::debug!(
            target: "execview.http",
            stage = "http.snapshot.in",
            url = %url,
            limit = query.limit,
            offset = query.offset
        );
        let list: RecordList = self
            .get_json(
                url,
                &[
                    ("limit", query.limit.to_string()),
                    ("offset", query.offset.to_string()),
                ],
            )
            .await?;
        let records = match list {
            RecordList::Bare(items) | RecordList::Wrapped { items } => items,
        };
        tracing::debug!(
            target: "execview.http",
            stage = "http.snapshot.out",
            items = records.len()
        );
        Ok(records)
    }

    async fn delta(&self, query: DeltaQuery) -> FetchResult<DeltaPage> {
        let url = self.session_url(&[&query.session_id, "tool-executions", "delta"])?;
        let limit = query.limit.clamp(1, DELTA_LIMIT_MAX);
        tracing::debug!(
            target: "execview.http",
            stage = "http.delta.in",
            url = %url,
            after_created_at = %query.after_created_at,
            after_id = %query.after_id,
            limit = limit
        );
        let page: DeltaPage = self
            .get_json(
                url,
                &[
                    ("after_created_at", query.after_created_at.clone()),
                    ("after_id", query.after_id.clone()),
                    ("limit", limit.to_string()),
                ],
            )
            .await?;
        tracing::debug!(
            target: "execview.http",
            stage = "http.delta.out",
            items = page.items.len(),
            has_more = page.has_more
        );
        Ok(page)
    }

    async fn screenshot(&self, session_id: &str, tool_use_id: &str) -> FetchResult<ScreenshotRef> {
        let url = self.session_url(&[session_id, "computer", "browser", tool_use_id])?;
        tracing::debug!(
            target: "execview.http",
            stage = "http.screenshot.in",
            url = %url
        );
        Ok(self.get_json(url, &[]).await?)
    }
}
