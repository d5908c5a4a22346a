//! Replay position, play/pause and live-follow over the active frame list.

mod controller;
mod timing;
mod types;

pub use controller::PlaybackController;
pub use timing::{advance_delay, interpolate_progress};
pub use types::{PlaybackCommand, PlaybackState};
