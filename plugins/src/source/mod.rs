pub mod http;
mod http_error;

pub use http::HttpExecutionLogSource;
pub use http_error::{HttpSourceError, HttpSourceErrorKind};
