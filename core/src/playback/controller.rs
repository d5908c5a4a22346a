use std::time::Duration;

use tokio::time::Instant;

use super::timing::{advance_delay, interpolate_progress};
use super::types::{PlaybackCommand, PlaybackState};
use crate::config::PlaybackConfig;
use crate::frame::{available_kinds, Frame, FrameCounts, FrameKind, ReplayFilter};

/// 回放控制器：维护选中帧、播放状态与实时跟随。
///
/// 所有输入（帧列表变化、用户命令、时钟）都通过具名方法进入，
/// 调用方传入 `now`，控制器本身不持有计时器。
#[derive(Debug)]
pub struct PlaybackController {
    config: PlaybackConfig,
    frames_all: Vec<Frame>,
    frames: Vec<Frame>,
    counts: FrameCounts,
    filter: ReplayFilter,
    selected: Option<String>,
    playing: bool,
    realtime: bool,
    follow_latest: bool,
    session_active: bool,
    /// 当前帧开始展示的时刻，仅播放中有效。
    step_started: Option<Instant>,
}

impl PlaybackController {
    pub fn new(config: PlaybackConfig) -> Self {
        Self {
            config,
            frames_all: Vec::new(),
            frames: Vec::new(),
            counts: FrameCounts::default(),
            filter: ReplayFilter::All,
            selected: None,
            playing: false,
            realtime: false,
            follow_latest: true,
            session_active: false,
            step_started: None,
        }
    }

    /// 切换会话时整体重建。
    pub fn reset(&mut self, session_active: bool) {
        let config = self.config.clone();
        *self = Self::new(config);
        self.session_active = session_active;
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn frames_all(&self) -> &[Frame] {
        &self.frames_all
    }

    pub fn counts(&self) -> FrameCounts {
        self.counts
    }

    pub fn available_kinds(&self) -> Vec<FrameKind> {
        available_kinds(&self.counts)
    }

    pub fn filter(&self) -> ReplayFilter {
        self.filter
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn is_live_follow(&self) -> bool {
        self.follow_latest
    }

    pub fn session_active(&self) -> bool {
        self.session_active
    }

    pub fn selected_index(&self) -> Option<usize> {
        let id = self.selected.as_deref()?;
        self.frames.iter().position(|f| f.id() == id)
    }

    pub fn selected_frame(&self) -> Option<&Frame> {
        self.selected_index().map(|i| &self.frames[i])
    }

    pub fn state(&self, now: Instant) -> PlaybackState {
        PlaybackState {
            selected_frame_id: self.selected.clone(),
            selected_index: self.selected_index(),
            frame_count: self.frames.len(),
            is_playing: self.playing,
            is_live_follow: self.follow_latest,
            is_realtime: self.realtime,
            filter: self.filter,
            interpolated_progress: self.progress(now),
        }
    }

    /// 新的完整帧列表（未过滤）。返回可观察状态是否变化。
    pub fn set_frames(&mut self, frames: Vec<Frame>, now: Instant) -> bool {
        let before = self.fingerprint();
        let was_at_end = self.at_last();

        self.counts = FrameCounts::of(&frames);
        self.frames_all = frames;
        if let Some(kind) = self.filter.kind() {
            if self.counts.get(kind) == 0 {
                // 过滤类型已无帧，回到全部。
                self.stop();
                self.filter = ReplayFilter::All;
            }
        }
        self.frames = self.filter.apply(&self.frames_all);
        self.reconcile();

        // 停在末尾等待新帧时，新帧到达后从此刻重新计时。
        if self.playing && was_at_end && !self.at_last() {
            self.step_started = Some(now);
        }
        self.settle_at_end();
        self.fingerprint() != before
    }

    pub fn set_session_active(&mut self, active: bool) -> bool {
        if self.session_active == active {
            return false;
        }
        self.session_active = active;
        self.stop();
        self.follow_latest = true;
        self.reconcile();
        tracing::debug!(
            target: "execview.playback",
            stage = "playback.session_active",
            active = active
        );
        true
    }

    pub fn apply(&mut self, command: PlaybackCommand, now: Instant) -> bool {
        let before = self.fingerprint();
        tracing::debug!(
            target: "execview.playback",
            stage = "playback.command",
            command = ?command
        );
        match command {
            PlaybackCommand::TogglePlay => self.toggle_play(now),
            PlaybackCommand::Play => {
                if !self.playing {
                    self.toggle_play(now);
                }
            }
            PlaybackCommand::Pause => {
                if self.playing {
                    self.toggle_play(now);
                }
            }
            PlaybackCommand::Prev => {
                if let Some(i) = self.selected_index().filter(|i| *i > 0) {
                    self.seek(i - 1);
                }
            }
            PlaybackCommand::Next => {
                if let Some(i) = self.selected_index().filter(|i| i + 1 < self.frames.len()) {
                    self.seek(i + 1);
                }
            }
            PlaybackCommand::Seek(index) => self.seek(index),
            PlaybackCommand::SeekLatest => self.seek(usize::MAX),
            PlaybackCommand::SetFilter(filter) => self.set_filter(filter),
        }
        self.fingerprint() != before
    }

    /// 下一次自动前进的时刻；不在播放或已在末尾时为 `None`。
    pub fn deadline(&self) -> Option<Instant> {
        if !self.playing || self.at_last() {
            return None;
        }
        let started = self.step_started?;
        Some(started + self.current_delay()?)
    }

    /// 到期则前进一帧。返回是否前进。
    pub fn advance(&mut self, now: Instant) -> bool {
        let Some(deadline) = self.deadline() else {
            return false;
        };
        if now < deadline {
            return false;
        }
        let Some(index) = self.selected_index() else {
            return false;
        };
        let next = index + 1;
        let last = self.frames.len() - 1;
        self.selected = Some(self.frames[next].id().to_string());
        self.follow_latest = next >= last;
        self.step_started = Some(now);
        self.settle_at_end();
        tracing::trace!(
            target: "execview.playback",
            stage = "playback.advance",
            index = next,
            playing = self.playing
        );
        true
    }

    pub fn progress(&self, now: Instant) -> f64 {
        let index = self.selected_index().unwrap_or(0);
        if !self.playing || self.at_last() {
            return index as f64;
        }
        match (self.step_started, self.current_delay()) {
            (Some(started), Some(delay)) => {
                interpolate_progress(index, now.saturating_duration_since(started), delay)
            }
            _ => index as f64,
        }
    }

    fn toggle_play(&mut self, now: Instant) {
        if self.frames.is_empty() {
            return;
        }
        if self.playing {
            self.stop();
            self.follow_latest = self.at_last();
            return;
        }
        if self.at_last() {
            self.selected = Some(self.frames[0].id().to_string());
        }
        self.playing = true;
        self.realtime = true;
        self.follow_latest = true;
        self.step_started = Some(now);
        self.settle_at_end();
    }

    fn seek(&mut self, index: usize) {
        if self.frames.is_empty() {
            return;
        }
        self.stop();
        let last = self.frames.len() - 1;
        let safe = index.min(last);
        self.selected = Some(self.frames[safe].id().to_string());
        self.follow_latest = safe == last;
    }

    fn set_filter(&mut self, filter: ReplayFilter) {
        self.stop();
        self.filter = match filter.kind() {
            Some(kind) if self.counts.get(kind) == 0 => ReplayFilter::All,
            _ => filter,
        };
        self.frames = self.filter.apply(&self.frames_all);
        self.reconcile();
    }

    /// 保持选中帧有效：无效时选最近完成的帧（否则最后一帧）。
    fn reconcile(&mut self) {
        if self.frames.is_empty() {
            self.selected = None;
            self.stop();
            return;
        }

        if self.selected_index().is_some() {
            if self.follow_latest && !self.playing {
                self.selected = self.frames.last().map(|f| f.id().to_string());
            }
            return;
        }

        let pick = self
            .frames
            .iter()
            .rev()
            .find(|f| f.is_done())
            .or_else(|| self.frames.last())
            .map(|f| f.id().to_string());
        self.selected = pick;
        self.follow_latest = true;
        self.stop();
    }

    /// 播放到末尾：实时模式且会话活跃时原地等待，否则停止。
    fn settle_at_end(&mut self) {
        if self.playing && self.at_last() && !(self.realtime && self.session_active) {
            self.stop();
        }
    }

    fn stop(&mut self) {
        self.playing = false;
        self.realtime = false;
        self.step_started = None;
    }

    fn at_last(&self) -> bool {
        match self.selected_index() {
            Some(i) => i + 1 >= self.frames.len(),
            None => false,
        }
    }

    fn current_delay(&self) -> Option<Duration> {
        self.selected_frame()
            .map(|f| advance_delay(f.kind, &self.config))
    }

    fn fingerprint(&self) -> (Option<String>, bool, bool, bool, ReplayFilter, usize) {
        (
            self.selected.clone(),
            self.playing,
            self.realtime,
            self.follow_latest,
            self.filter,
            self.frames.len(),
        )
    }
}
