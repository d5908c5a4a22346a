use std::collections::HashSet;
use std::time::Duration;

use execview_core::api::{
    AppContext, CliError, PlaybackCommand, PlaybackState, ReplayFilter, RuntimeError, RuntimeEvent,
};
use serde_json::json;
use tokio::sync::broadcast::error::RecvError;

use super::cli::{OutputFormat, WatchArgs};
use super::render::{frame_json, frame_line, playback_line};
use super::session_status::SessionStatusProbe;

fn closed(e: RuntimeError) -> CliError {
    CliError::Command(e.to_string())
}

/// Prints what changed since the last event; tracks ids already shown.
struct Printer {
    format: OutputFormat,
    seen: HashSet<String>,
    last_selection: Option<(Option<String>, bool)>,
}

impl Printer {
    fn new(format: OutputFormat) -> Self {
        Self {
            format,
            seen: HashSet::new(),
            last_selection: None,
        }
    }

    fn frames(&mut self, frames: &[execview_core::api::Frame]) {
        for (index, frame) in frames.iter().enumerate() {
            if !self.seen.insert(frame.id().to_string()) {
                continue;
            }
            match self.format {
                OutputFormat::Text => println!("{}", frame_line(index, frame)),
                OutputFormat::Jsonl => {
                    let mut value = frame_json(index, frame);
                    value["event"] = json!("frame");
                    println!("{value}");
                }
            }
        }
    }

    fn playback(&mut self, state: &PlaybackState) {
        let key = (state.selected_frame_id.clone(), state.is_playing);
        if self.last_selection.as_ref() == Some(&key) {
            return;
        }
        self.last_selection = Some(key);
        match self.format {
            OutputFormat::Text => println!("{}", playback_line(state)),
            OutputFormat::Jsonl => println!("{}", json!({ "event": "playback", "state": state })),
        }
    }

    fn screenshot(&self, tool_use_id: &str, url: Option<&str>) {
        match self.format {
            OutputFormat::Text => match url {
                Some(url) => println!("  screenshot {tool_use_id}: {url}"),
                None => println!("  screenshot {tool_use_id}: none"),
            },
            OutputFormat::Jsonl => println!(
                "{}",
                json!({ "event": "screenshot", "tool_use_id": tool_use_id, "url": url })
            ),
        }
    }
}

pub async fn run(args: &WatchArgs, format: OutputFormat, ctx: &AppContext) -> Result<i32, CliError> {
    let session_id = args.session_id.trim().to_string();
    if session_id.is_empty() {
        return Err(CliError::Command("session id must not be empty".into()));
    }

    let probe = if args.live || args.finished {
        None
    } else {
        Some(SessionStatusProbe::new(ctx.cfg())?)
    };
    let mut active = match &probe {
        Some(probe) => probe.is_active(&session_id).await.unwrap_or_else(|e| {
            tracing::warn!(
                target: "execview.cli",
                stage = "session.status",
                error = %e,
                "session status unavailable, assuming finished"
            );
            false
        }),
        None => args.live,
    };

    let handle = ctx.spawn_replay();
    let mut events = handle.subscribe();
    handle.switch_session(session_id.clone(), active).map_err(closed)?;

    let filter = ReplayFilter::from(args.filter);
    // Filter and play only stick once there are frames to apply them to.
    let mut setup_pending = true;
    let mut seen_playing = !args.play;
    let mut printer = Printer::new(format);

    let mut status_tick = tokio::time::interval(Duration::from_millis(args.status_interval_ms.max(100)));
    status_tick.tick().await;

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            _ = &mut ctrl_c => {
                tracing::debug!(target: "execview.cli", stage = "watch.interrupt");
                break;
            }
            event = events.recv() => match event {
                Ok(RuntimeEvent::FramesChanged { frames, .. }) => {
                    printer.frames(&frames);
                    if setup_pending && !frames.is_empty() {
                        setup_pending = false;
                        if filter != ReplayFilter::All {
                            handle.playback(PlaybackCommand::SetFilter(filter)).map_err(closed)?;
                        }
                        if args.play {
                            handle.playback(PlaybackCommand::TogglePlay).map_err(closed)?;
                        }
                    }
                }
                Ok(RuntimeEvent::PlaybackChanged(state)) => {
                    printer.playback(&state);
                    seen_playing |= state.is_playing;
                    if args.exit_when_done
                        && !setup_pending
                        && seen_playing
                        && !active
                        && !state.is_playing
                    {
                        break;
                    }
                }
                Ok(RuntimeEvent::ScreenshotResolved { tool_use_id, url }) => {
                    printer.screenshot(&tool_use_id, url.as_deref());
                }
                Ok(RuntimeEvent::SyncFailed { op, error }) => {
                    eprintln!("sync {op} failed: {error}");
                }
                Ok(RuntimeEvent::RecordsChanged { count, has_more, .. }) => {
                    tracing::debug!(
                        target: "execview.cli",
                        stage = "watch.records",
                        count,
                        has_more
                    );
                }
                Ok(RuntimeEvent::Progress(_)) => {}
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(target: "execview.cli", stage = "watch.lagged", skipped);
                }
                Err(RecvError::Closed) => break,
            },
            _ = status_tick.tick(), if active && probe.is_some() => {
                let Some(probe) = probe.as_ref() else { continue };
                match probe.is_active(&session_id).await {
                    Ok(now) if now != active => {
                        tracing::info!(
                            target: "execview.cli",
                            stage = "session.status",
                            active = now,
                            "session status changed"
                        );
                        active = now;
                        handle.set_session_active(now).map_err(closed)?;
                    }
                    Ok(_) => {}
                    Err(e) => {
                        tracing::warn!(target: "execview.cli", stage = "session.status", error = %e);
                    }
                }
            }
        }
    }

    handle.shutdown().await;
    Ok(0)
}
