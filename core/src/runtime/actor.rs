use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, mpsc};
use tokio::task::{JoinError, JoinSet};
use tokio::time::{interval, sleep_until, Instant, Interval, MissedTickBehavior};

use super::types::{RuntimeCommand, RuntimeEvent};
use crate::config::AppConfig;
use crate::config::ScreenshotConfig;
use crate::frame::{classify_all, FrameCounts};
use crate::playback::{PlaybackCommand, PlaybackController};
use crate::screenshot::{fetch_with_retry, prefetch_targets, ScreenshotCache, ScreenshotTicket};
use crate::source::ExecutionLogSource;
use crate::sync::{execute, ApplyOutcome, ExecutionLogSync, SyncRequest, SyncResponse};

/// Result of one spawned fetch.
enum Completion {
    Sync(SyncResponse),
    Screenshot {
        ticket: ScreenshotTicket,
        url: Option<String>,
    },
}

pub(super) struct ReplayRuntime {
    source: Arc<dyn ExecutionLogSource>,
    screenshot_config: ScreenshotConfig,
    sync: ExecutionLogSync,
    playback: PlaybackController,
    screenshots: ScreenshotCache,
    session_active: bool,
    /// Set when the session went inactive while a poll was out.
    final_poll_due: bool,
    tasks: JoinSet<Completion>,
    poll_ticker: Interval,
    anim_ticker: Interval,
    events: broadcast::Sender<RuntimeEvent>,
}

impl ReplayRuntime {
    pub(super) fn new(
        source: Arc<dyn ExecutionLogSource>,
        config: &AppConfig,
        events: broadcast::Sender<RuntimeEvent>,
    ) -> Self {
        let mut poll_ticker = interval(config.sync.poll_interval());
        poll_ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut anim_ticker = interval(Duration::from_millis(config.playback.animation_tick_ms.max(1)));
        anim_ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        Self {
            source,
            screenshot_config: config.screenshot.clone(),
            sync: ExecutionLogSync::new(config.sync.clone()),
            playback: PlaybackController::new(config.playback.clone()),
            screenshots: ScreenshotCache::new(),
            session_active: false,
            final_poll_due: false,
            tasks: JoinSet::new(),
            poll_ticker,
            anim_ticker,
            events,
        }
    }

    pub(super) async fn run(mut self, mut commands: mpsc::UnboundedReceiver<RuntimeCommand>) {
        tracing::debug!(
            target: "execview.runtime",
            stage = "runtime.start",
            source = self.source.name()
        );

        loop {
            let polling = self.session_active && self.sync.session_id().is_some();
            let deadline = self.playback.deadline();
            // Holding at the end has nothing to interpolate.
            let animating = self.playback.is_playing() && deadline.is_some();

            tokio::select! {
                cmd = commands.recv() => match cmd {
                    Some(RuntimeCommand::Shutdown) | None => break,
                    Some(cmd) => self.handle_command(cmd),
                },

                Some(joined) = self.tasks.join_next(), if !self.tasks.is_empty() => {
                    self.handle_completion(joined);
                }

                _ = self.poll_ticker.tick(), if polling => {
                    self.start_poll();
                }

                _ = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                    if self.playback.advance(Instant::now()) {
                        self.emit_playback();
                        self.prefetch_screenshots();
                    }
                }

                _ = self.anim_ticker.tick(), if animating => {
                    self.emit(RuntimeEvent::Progress(self.playback.progress(Instant::now())));
                }
            }
        }

        self.tasks.abort_all();
        tracing::debug!(target: "execview.runtime", stage = "runtime.stop");
    }

    fn handle_command(&mut self, cmd: RuntimeCommand) {
        match cmd {
            RuntimeCommand::SwitchSession { session_id, active } => {
                self.switch_session(&session_id, active);
            }
            RuntimeCommand::SetSessionActive(active) => self.set_session_active(active),
            RuntimeCommand::LoadMore => {
                if let Some(request) = self.sync.load_more() {
                    self.spawn_sync(request);
                }
            }
            RuntimeCommand::Refetch => {
                if let Some(request) = self.sync.refetch() {
                    self.spawn_sync(request);
                }
            }
            RuntimeCommand::Playback(cmd) => self.handle_playback(cmd),
            RuntimeCommand::Shutdown => {}
        }
    }

    fn switch_session(&mut self, session_id: &str, active: bool) {
        tracing::info!(
            target: "execview.runtime",
            stage = "runtime.switch_session",
            session_id = %session_id,
            active = active
        );
        // Epochs already make late results harmless; aborting just frees the work.
        self.tasks.abort_all();
        self.screenshots.reset();
        self.playback.reset(active);
        self.session_active = active;
        self.final_poll_due = false;
        self.poll_ticker.reset();

        let request = self.sync.reset(session_id);
        self.spawn_sync(request);

        self.emit_records();
        self.emit_frames();
        self.emit_playback();
    }

    fn set_session_active(&mut self, active: bool) {
        if self.session_active == active {
            return;
        }
        let was_active = self.session_active;
        self.session_active = active;
        self.playback.set_session_active(active);
        self.emit_playback();

        if active {
            self.poll_ticker.reset();
        } else if was_active {
            // Pick up whatever landed between the last poll and completion.
            if self.sync.is_polling() {
                self.final_poll_due = true;
            } else {
                self.start_poll();
            }
        }
    }

    fn handle_playback(&mut self, cmd: PlaybackCommand) {
        if self.playback.apply(cmd, Instant::now()) {
            self.emit_playback();
        }
        self.prefetch_screenshots();
    }

    fn start_poll(&mut self) {
        if let Some(request) = self.sync.poll() {
            self.spawn_sync(request);
        }
    }

    fn handle_completion(&mut self, joined: Result<Completion, JoinError>) {
        let completion = match joined {
            Ok(completion) => completion,
            Err(err) if err.is_cancelled() => return,
            Err(err) => {
                tracing::warn!(
                    target: "execview.runtime",
                    stage = "runtime.task.failed",
                    error = %err
                );
                return;
            }
        };

        match completion {
            Completion::Sync(response) => self.handle_sync(response),
            Completion::Screenshot { ticket, url } => {
                if self.screenshots.resolve(&ticket, url.clone()) {
                    self.emit(RuntimeEvent::ScreenshotResolved {
                        tool_use_id: ticket.tool_use_id,
                        url,
                    });
                }
            }
        }
    }

    fn handle_sync(&mut self, response: SyncResponse) {
        let op = response.kind();
        let was_delta = matches!(response, SyncResponse::Delta { .. });

        match self.sync.apply(response) {
            ApplyOutcome::Applied(_) => {
                let frames = classify_all(self.sync.records());
                let changed = self.playback.set_frames(frames, Instant::now());
                self.emit_records();
                self.emit_frames();
                if changed {
                    self.emit_playback();
                }
                self.prefetch_screenshots();
            }
            ApplyOutcome::Unchanged => {}
            ApplyOutcome::Stale => return,
            ApplyOutcome::Failed => {
                if let Some(error) = self.sync.last_error().cloned() {
                    self.emit(RuntimeEvent::SyncFailed { op, error });
                }
            }
        }

        if was_delta && self.final_poll_due {
            self.final_poll_due = false;
            self.start_poll();
        }
    }

    fn prefetch_screenshots(&mut self) {
        let Some(session_id) = self.sync.session_id().map(str::to_string) else {
            return;
        };
        let targets = prefetch_targets(
            self.playback.frames(),
            self.playback.selected_index(),
            self.screenshot_config.lookahead,
        );

        for tool_use_id in targets {
            let Some(ticket) = self.screenshots.begin(&tool_use_id) else {
                continue;
            };
            let source = self.source.clone();
            let config = self.screenshot_config.clone();
            let session_id = session_id.clone();
            let retry_on_404 = self.session_active;
            self.tasks.spawn(async move {
                let url = fetch_with_retry(
                    source.as_ref(),
                    &session_id,
                    &ticket.tool_use_id,
                    retry_on_404,
                    &config,
                )
                .await;
                Completion::Screenshot { ticket, url }
            });
        }
    }

    fn spawn_sync(&mut self, request: SyncRequest) {
        let source = self.source.clone();
        self.tasks
            .spawn(async move { Completion::Sync(execute(source.as_ref(), request).await) });
    }

    fn emit_records(&self) {
        let Some(session_id) = self.sync.session_id() else {
            return;
        };
        self.emit(RuntimeEvent::RecordsChanged {
            session_id: session_id.to_string(),
            count: self.sync.records().len(),
            has_more: self.sync.has_more(),
            cursor: self.sync.cursor().cloned(),
        });
    }

    fn emit_frames(&self) {
        let frames = self.playback.frames_all().to_vec();
        let counts = FrameCounts::of(&frames);
        self.emit(RuntimeEvent::FramesChanged {
            frames: Arc::new(frames),
            counts,
        });
    }

    fn emit_playback(&self) {
        self.emit(RuntimeEvent::PlaybackChanged(
            self.playback.state(Instant::now()),
        ));
    }

    fn emit(&self, event: RuntimeEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }
}
