use clap::{Args as ClapArgs, Parser, Subcommand};

#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterArg {
    All,
    Browser,
    Terminal,
    Tool,
}

#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Jsonl,
}

#[derive(Parser, Debug)]
#[command(name = "execview", about = "Inspect and replay agent tool executions")]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file; defaults to ~/.execview/config.toml then ./config.toml.
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// Overrides `api.base_url`.
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Overrides `api.api_token`.
    #[arg(long, global = true)]
    pub token: Option<String>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text, global = true)]
    pub format: OutputFormat,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the replay frames of a session.
    Frames(FramesArgs),
    /// Follow a session live and replay its frames.
    Watch(WatchArgs),
    /// Resolve the browser screenshot of one tool call.
    Screenshot(ScreenshotArgs),
}

#[derive(ClapArgs, Debug, Clone)]
pub struct FramesArgs {
    pub session_id: String,

    #[arg(long, value_enum, default_value_t = FilterArg::All)]
    pub filter: FilterArg,

    /// Page through the whole history instead of the first page only.
    #[arg(long)]
    pub all: bool,

    /// Also list records that do not map to a frame.
    #[arg(long)]
    pub raw: bool,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct WatchArgs {
    pub session_id: String,

    #[arg(long, value_enum, default_value_t = FilterArg::All)]
    pub filter: FilterArg,

    /// Start playback from the first frame.
    #[arg(long)]
    pub play: bool,

    /// Treat the session as live without asking the server.
    #[arg(long, conflicts_with = "finished")]
    pub live: bool,

    /// Treat the session as finished without asking the server.
    #[arg(long)]
    pub finished: bool,

    /// How often to re-read the session status.
    #[arg(long, default_value_t = 5_000)]
    pub status_interval_ms: u64,

    /// Exit once the session has finished and playback has stopped.
    #[arg(long)]
    pub exit_when_done: bool,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct ScreenshotArgs {
    pub session_id: String,

    pub tool_use_id: String,

    /// Retry not-found answers as if the session were still running.
    #[arg(long)]
    pub retry: bool,
}

impl From<FilterArg> for execview_core::api::ReplayFilter {
    fn from(arg: FilterArg) -> Self {
        match arg {
            FilterArg::All => Self::All,
            FilterArg::Browser => Self::Browser,
            FilterArg::Terminal => Self::Terminal,
            FilterArg::Tool => Self::Tool,
        }
    }
}
