pub mod api;
pub mod config;
pub mod context;
pub mod error;
pub mod execution;
pub mod frame;
pub mod playback;
pub mod runtime;
pub mod screenshot;
pub mod source;
pub mod state;
pub mod sync;
