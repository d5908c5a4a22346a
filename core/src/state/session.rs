//! 会话状态

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// 会话状态（服务端 `status` 字段）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    /// 排队中
    Pending,
    /// 运行中
    Running,
    /// 已完成
    Completed,
    /// 失败
    Failed,
    /// 已取消
    Cancelled,
}

impl SessionStatus {
    /// 是否活跃：活跃会话需要轮询，截图 404 需要重试
    pub fn is_active(&self) -> bool {
        matches!(self, SessionStatus::Pending | SessionStatus::Running)
    }

    /// 是否已结束
    pub fn is_terminal(&self) -> bool {
        !self.is_active()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::Pending => "pending",
            SessionStatus::Running => "running",
            SessionStatus::Completed => "completed",
            SessionStatus::Failed => "failed",
            SessionStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SessionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(SessionStatus::Pending),
            "running" => Ok(SessionStatus::Running),
            "completed" => Ok(SessionStatus::Completed),
            "failed" => Ok(SessionStatus::Failed),
            "cancelled" | "canceled" => Ok(SessionStatus::Cancelled),
            other => Err(format!("unknown session status: {other}")),
        }
    }
}

/// 会话摘要（只取回放需要的字段）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionInfo {
    /// 会话 ID
    #[serde(alias = "id")]
    pub session_id: String,
    /// 原始状态字符串；未知值按已结束处理
    #[serde(default)]
    pub status: String,
}

impl SessionInfo {
    pub fn status(&self) -> Option<SessionStatus> {
        self.status.parse().ok()
    }

    /// 是否活跃
    pub fn is_active(&self) -> bool {
        self.status().is_some_and(|s| s.is_active())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_active_statuses() {
        assert!(SessionStatus::Pending.is_active());
        assert!(SessionStatus::Running.is_active());
        assert!(SessionStatus::Completed.is_terminal());
        assert!(SessionStatus::Cancelled.is_terminal());
    }

    #[test]
    fn test_parse_status() {
        assert_eq!("Running".parse::<SessionStatus>(), Ok(SessionStatus::Running));
        assert_eq!("canceled".parse::<SessionStatus>(), Ok(SessionStatus::Cancelled));
        assert!("paused".parse::<SessionStatus>().is_err());
    }

    #[test]
    fn test_session_info_unknown_status_is_inactive() {
        let info: SessionInfo =
            serde_json::from_str(r#"{"session_id":"s1","status":"archived"}"#).unwrap();
        assert!(!info.is_active());

        let info: SessionInfo = serde_json::from_str(r#"{"id":"s1","status":"pending"}"#).unwrap();
        assert_eq!(info.session_id, "s1");
        assert!(info.is_active());
    }
}
