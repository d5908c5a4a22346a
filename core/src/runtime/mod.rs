//! Single-task actor that owns one session's sync, frames, screenshots and
//! playback, driven by commands and timers.
//!
//! Fetches run as spawned tasks whose results come back into the same loop,
//! so every state change happens on one logical timeline.

mod actor;
mod handle;
mod types;

pub use handle::ReplayHandle;
pub use types::{RuntimeCommand, RuntimeError, RuntimeEvent};
