pub mod cli;
pub mod frames;
pub mod render;
pub mod screenshot;
pub mod session_status;
pub mod watch;
