use clap::Parser;
use execview_cli::commands::{cli, frames, screenshot, watch};
use execview_core::api::{self as core_api, AppConfig, AppContext, CliError, LoggingConfig};
use execview_plugins::factory::PluginSourceFactory;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

static LOG_GUARD: std::sync::OnceLock<tracing_appender::non_blocking::WorkerGuard> =
    std::sync::OnceLock::new();

#[tokio::main]
async fn main() {
    let exit = match real_main().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{e}");
            e.exit_code()
        }
    };

    std::process::exit(exit);
}

async fn real_main() -> Result<i32, CliError> {
    let args = cli::Args::parse();
    let cfg = load_config(&args)?;
    init_tracing(&cfg.logging).map_err(CliError::Command)?;

    tracing::debug!(
        target: "execview.config",
        stage = "config.loaded",
        base_url = %cfg.api.base_url,
        page_limit = cfg.sync.page_limit,
        poll_interval_ms = cfg.sync.poll_interval_ms
    );

    let ctx = AppContext::new(cfg, &PluginSourceFactory)?;
    dispatch(&args, &ctx).await
}

fn load_config(args: &cli::Args) -> Result<AppConfig, CliError> {
    let explicit = args
        .config
        .as_deref()
        .map(|p| shellexpand::tilde(p).into_owned())
        .map(std::path::PathBuf::from);
    let mut cfg =
        core_api::load(explicit.as_deref()).map_err(|e| CliError::Config(e.to_string()))?;

    if let Some(url) = args.api_url.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        cfg.api.base_url = url.to_string();
    }
    if let Some(token) = args.token.as_deref() {
        cfg.api.api_token = token.trim().to_string();
    }
    Ok(cfg)
}

async fn dispatch(args: &cli::Args, ctx: &AppContext) -> Result<i32, CliError> {
    match &args.command {
        cli::Commands::Frames(frames_args) => frames::run(frames_args, args.format, ctx).await,
        cli::Commands::Watch(watch_args) => watch::run(watch_args, args.format, ctx).await,
        cli::Commands::Screenshot(shot_args) => screenshot::run(shot_args, args.format, ctx).await,
    }
}

fn init_tracing(logging: &LoggingConfig) -> Result<(), String> {
    if !logging.enabled {
        return Ok(());
    }

    let filter = match std::env::var("RUST_LOG") {
        Ok(v) if !v.trim().is_empty() => EnvFilter::from_default_env(),
        _ => EnvFilter::try_new(logging.level.clone()).map_err(|e| e.to_string())?,
    };

    let mut maybe_writer = None;

    if logging.file {
        let dir = match logging
            .directory
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
        {
            Some(d) => std::path::PathBuf::from(shellexpand::tilde(d).into_owned()),
            None => core_api::get_execview_data_dir()
                .map(|d| d.join("logs"))
                .unwrap_or_else(|_| std::env::temp_dir().join("execview")),
        };

        std::fs::create_dir_all(&dir).map_err(|e| format!("create log dir failed: {e}"))?;
        let file_name = format!("execview.{}.log", std::process::id());
        let appender = tracing_appender::rolling::never(dir, file_name);
        let (non_blocking, guard) = tracing_appender::non_blocking(appender);
        let _ = LOG_GUARD.set(guard);
        maybe_writer = Some(non_blocking);
    }

    if !logging.console && maybe_writer.is_none() {
        return Err("logging disabled for both console and file".to_string());
    }

    // stdout carries command output; logs stay on stderr.
    let console_layer = logging.console.then(|| {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_ansi(atty::is(atty::Stream::Stderr))
    });

    let file_layer = maybe_writer.map(|w| {
        tracing_subscriber::fmt::layer()
            .with_writer(w)
            .with_ansi(false)
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(file_layer)
        .init();

    Ok(())
}
