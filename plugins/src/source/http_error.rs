use std::{error::Error as StdError, fmt};

use execview_core::api::FetchError;

const BODY_PREVIEW_LIMIT: usize = 512;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpSourceErrorKind {
    Timeout,
    Connect,
    Request,
    Body,
    Decode,
    Status,
    /// 2xx response whose envelope carried a failure code.
    Api,
    Url,
    Unknown,
}

impl HttpSourceErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Timeout => "timeout",
            Self::Connect => "connect",
            Self::Request => "request",
            Self::Body => "body",
            Self::Decode => "decode",
            Self::Status => "status",
            Self::Api => "api",
            Self::Url => "url",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for HttpSourceErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug)]
pub struct HttpSourceError {
    kind: HttpSourceErrorKind,
    /// HTTP status, or the envelope code for `Api`.
    status: Option<i64>,
    url: Option<String>,
    message: String,
    source: Option<anyhow::Error>,
}

impl HttpSourceError {
    pub fn kind(&self) -> HttpSourceErrorKind {
        self.kind
    }

    pub fn status(&self) -> Option<i64> {
        self.status
    }

    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub(crate) fn from_reqwest(err: reqwest::Error, url: String) -> Self {
        let kind = if err.is_timeout() {
            HttpSourceErrorKind::Timeout
        } else if err.is_connect() {
            HttpSourceErrorKind::Connect
        } else if err.is_request() {
            HttpSourceErrorKind::Request
        } else if err.is_body() {
            HttpSourceErrorKind::Body
        } else if err.is_decode() {
            HttpSourceErrorKind::Decode
        } else {
            HttpSourceErrorKind::Unknown
        };
        HttpSourceError {
            kind,
            status: err.status().map(|s| i64::from(s.as_u16())),
            url: Some(url),
            message: err.to_string(),
            source: Some(anyhow::Error::new(err)),
        }
    }

    pub(crate) fn status_error(status: u16, url: String, message: String) -> Self {
        HttpSourceError {
            kind: HttpSourceErrorKind::Status,
            status: Some(i64::from(status)),
            url: Some(url),
            message,
            source: None,
        }
    }

    pub(crate) fn api_error(code: i64, url: String, message: String) -> Self {
        HttpSourceError {
            kind: HttpSourceErrorKind::Api,
            status: Some(code),
            url: Some(url),
            message,
            source: None,
        }
    }

    pub(crate) fn decode_error(status: u16, url: String, err: serde_json::Error, preview: String) -> Self {
        let message = format!("failed to decode response body: {} | body={}", err, preview);
        HttpSourceError {
            kind: HttpSourceErrorKind::Decode,
            status: Some(i64::from(status)),
            url: Some(url),
            message,
            source: Some(anyhow::Error::new(err)),
        }
    }

    pub(crate) fn invalid_url(url: &str) -> Self {
        HttpSourceError {
            kind: HttpSourceErrorKind::Url,
            status: None,
            url: Some(url.to_string()),
            message: "base url cannot carry a path".to_string(),
            source: None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(
            self.kind,
            HttpSourceErrorKind::Status | HttpSourceErrorKind::Api
        ) && self.status == Some(404)
    }
}

impl fmt::Display for HttpSourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "execution log http error kind={}", self.kind)?;
        if let Some(status) = self.status {
            write!(f, " status={}", status)?;
        }
        if let Some(url) = &self.url {
            write!(f, " url={}", url)?;
        }
        write!(f, ": {}", self.message)
    }
}

impl StdError for HttpSourceError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|err| &**err as &(dyn StdError + 'static))
    }
}

impl From<HttpSourceError> for FetchError {
    fn from(err: HttpSourceError) -> Self {
        if err.is_not_found() {
            return FetchError::NotFound(err.url.unwrap_or(err.message));
        }
        match err.kind {
            HttpSourceErrorKind::Status => FetchError::Status {
                status: err.status.and_then(|s| u16::try_from(s).ok()).unwrap_or(0),
                message: err.message,
            },
            HttpSourceErrorKind::Api => FetchError::Api {
                code: err.status.unwrap_or_default(),
                message: err.message,
            },
            HttpSourceErrorKind::Decode => FetchError::Decode(err.to_string()),
            _ => FetchError::Transport(err.to_string()),
        }
    }
}

pub(crate) fn preview_body(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return "<empty body>".to_string();
    }

    let mut out = String::new();
    let mut truncated = false;
    for (idx, ch) in trimmed.chars().enumerate() {
        if idx >= BODY_PREVIEW_LIMIT {
            truncated = true;
            break;
        }
        out.push(ch);
    }

    if truncated {
        out.push_str("...");
    }

    out
}
