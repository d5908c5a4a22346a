use std::sync::Arc;

use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;

use super::actor::ReplayRuntime;
use super::types::{RuntimeCommand, RuntimeError, RuntimeEvent};
use crate::config::AppConfig;
use crate::playback::PlaybackCommand;
use crate::source::ExecutionLogSource;

const EVENT_CAPACITY: usize = 256;

/// Owner of a running replay actor.
///
/// Dropping the handle aborts the actor, which takes its in-flight fetches
/// down with it.
pub struct ReplayHandle {
    commands: mpsc::UnboundedSender<RuntimeCommand>,
    events: broadcast::Sender<RuntimeEvent>,
    task: Option<JoinHandle<()>>,
}

impl ReplayHandle {
    /// Spawn the actor on the current tokio runtime.
    pub fn spawn(source: Arc<dyn ExecutionLogSource>, config: &AppConfig) -> Self {
        let (commands, rx) = mpsc::unbounded_channel();
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        let runtime = ReplayRuntime::new(source, config, events.clone());
        let task = tokio::spawn(runtime.run(rx));
        Self {
            commands,
            events,
            task: Some(task),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<RuntimeEvent> {
        self.events.subscribe()
    }

    pub fn send(&self, cmd: RuntimeCommand) -> Result<(), RuntimeError> {
        self.commands.send(cmd).map_err(|_| RuntimeError::Closed)
    }

    pub fn switch_session(&self, session_id: impl Into<String>, active: bool) -> Result<(), RuntimeError> {
        self.send(RuntimeCommand::SwitchSession {
            session_id: session_id.into(),
            active,
        })
    }

    pub fn set_session_active(&self, active: bool) -> Result<(), RuntimeError> {
        self.send(RuntimeCommand::SetSessionActive(active))
    }

    pub fn load_more(&self) -> Result<(), RuntimeError> {
        self.send(RuntimeCommand::LoadMore)
    }

    pub fn refetch(&self) -> Result<(), RuntimeError> {
        self.send(RuntimeCommand::Refetch)
    }

    pub fn playback(&self, cmd: PlaybackCommand) -> Result<(), RuntimeError> {
        self.send(RuntimeCommand::Playback(cmd))
    }

    /// Stop the actor and wait for it to finish.
    pub async fn shutdown(mut self) {
        let _ = self.commands.send(RuntimeCommand::Shutdown);
        if let Some(task) = self.task.take() {
            if let Err(err) = task.await {
                tracing::warn!(
                    target: "execview.runtime",
                    stage = "runtime.join",
                    error = %err
                );
            }
        }
    }
}

impl Drop for ReplayHandle {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}
