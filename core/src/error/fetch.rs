use thiserror::Error;

pub type FetchResult<T> = Result<T, FetchError>;

/// Failure of a single request against the execution log.
///
/// Kept `Clone` so the sync layer can hold on to the last failure and hand it
/// to the UI without consuming it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("http status {status}: {message}")]
    Status { status: u16, message: String },
    #[error("api error code={code}: {message}")]
    Api { code: i64, message: String },
    #[error("transport error: {0}")]
    Transport(String),
    #[error("decode error: {0}")]
    Decode(String),
}

impl FetchError {
    pub fn is_not_found(&self) -> bool {
        match self {
            FetchError::NotFound(_) => true,
            FetchError::Status { status, .. } => *status == 404,
            FetchError::Api { code, .. } => *code == 404,
            _ => false,
        }
    }

    /// Short machine-friendly category, used as a tracing field.
    pub fn kind(&self) -> &'static str {
        match self {
            FetchError::NotFound(_) => "not_found",
            FetchError::Status { .. } => "status",
            FetchError::Api { .. } => "api",
            FetchError::Transport(_) => "transport",
            FetchError::Decode(_) => "decode",
        }
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_is_recognized_across_variants() {
        assert!(FetchError::NotFound("tu-1".into()).is_not_found());
        assert!(FetchError::Status {
            status: 404,
            message: "missing".into()
        }
        .is_not_found());
        assert!(FetchError::Api {
            code: 404,
            message: "missing".into()
        }
        .is_not_found());
        assert!(!FetchError::Status {
            status: 502,
            message: "bad gateway".into()
        }
        .is_not_found());
        assert!(!FetchError::Transport("reset".into()).is_not_found());
    }
}
