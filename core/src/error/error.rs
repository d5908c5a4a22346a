use thiserror::Error;

use super::fetch::FetchError;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("config error: {0}")]
    Config(String),
    #[error("command failed: {0}")]
    Command(String),
    #[error("fetch failed: {0}")]
    Fetch(#[from] FetchError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("anyhow error: {0}")]
    Anyhow(#[from] anyhow::Error),
}

impl CliError {
    /// Process exit code for this error.
    ///
    /// 11: config error, 20: command / IO error, 30: fetch error, 50: uncategorized.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Config(_) => 11,
            CliError::Command(_) | CliError::Io(_) => 20,
            CliError::Fetch(_) => 30,
            CliError::Anyhow(_) => 50,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_by_category() {
        assert_eq!(CliError::Config("bad".into()).exit_code(), 11);
        assert_eq!(CliError::Command("bad".into()).exit_code(), 20);
        assert_eq!(
            CliError::Fetch(FetchError::Transport("reset".into())).exit_code(),
            30
        );
        assert_eq!(CliError::Anyhow(anyhow::anyhow!("boom")).exit_code(), 50);
    }
}
