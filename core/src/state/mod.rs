//! # 会话状态
//!
//! 服务端会话的生命周期状态，决定同步是否轮询、截图是否重试、
//! 回放是否在末尾等待新帧。

pub mod session;

pub use session::{SessionInfo, SessionStatus};
