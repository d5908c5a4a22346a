#[allow(clippy::module_inception)]
pub mod error;
pub mod fetch;

pub use error::CliError;
pub use fetch::{FetchError, FetchResult};
