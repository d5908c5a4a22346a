use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::execution::ExecutionRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FrameKind {
    Browser,
    Terminal,
    Tool,
}

impl FrameKind {
    pub const ALL: [FrameKind; 3] = [FrameKind::Browser, FrameKind::Terminal, FrameKind::Tool];

    pub fn as_str(&self) -> &'static str {
        match self {
            FrameKind::Browser => "browser",
            FrameKind::Terminal => "terminal",
            FrameKind::Tool => "tool",
        }
    }
}

impl fmt::Display for FrameKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One replayable step; identified by its record's id.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Frame {
    pub kind: FrameKind,
    pub execution: ExecutionRecord,
    pub label: String,
}

impl Frame {
    pub fn id(&self) -> &str {
        &self.execution.id
    }

    pub fn is_done(&self) -> bool {
        self.execution.is_done()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReplayFilter {
    #[default]
    All,
    Browser,
    Terminal,
    Tool,
}

impl ReplayFilter {
    pub fn kind(&self) -> Option<FrameKind> {
        match self {
            ReplayFilter::All => None,
            ReplayFilter::Browser => Some(FrameKind::Browser),
            ReplayFilter::Terminal => Some(FrameKind::Terminal),
            ReplayFilter::Tool => Some(FrameKind::Tool),
        }
    }

    pub fn matches(&self, frame: &Frame) -> bool {
        match self.kind() {
            Some(kind) => kind == frame.kind,
            None => true,
        }
    }

    /// Order-preserving subsequence of `frames`.
    pub fn apply(&self, frames: &[Frame]) -> Vec<Frame> {
        frames.iter().filter(|f| self.matches(f)).cloned().collect()
    }
}

impl From<FrameKind> for ReplayFilter {
    fn from(kind: FrameKind) -> Self {
        match kind {
            FrameKind::Browser => ReplayFilter::Browser,
            FrameKind::Terminal => ReplayFilter::Terminal,
            FrameKind::Tool => ReplayFilter::Tool,
        }
    }
}

impl FromStr for ReplayFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(ReplayFilter::All),
            "browser" => Ok(ReplayFilter::Browser),
            "terminal" => Ok(ReplayFilter::Terminal),
            "tool" => Ok(ReplayFilter::Tool),
            other => Err(format!("unknown replay filter: {other}")),
        }
    }
}

impl fmt::Display for ReplayFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind() {
            Some(kind) => f.write_str(kind.as_str()),
            None => f.write_str("all"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FrameCounts {
    pub browser: usize,
    pub terminal: usize,
    pub tool: usize,
}

impl FrameCounts {
    pub fn of(frames: &[Frame]) -> Self {
        frames.iter().fold(Self::default(), |mut acc, f| {
            match f.kind {
                FrameKind::Browser => acc.browser += 1,
                FrameKind::Terminal => acc.terminal += 1,
                FrameKind::Tool => acc.tool += 1,
            }
            acc
        })
    }

    pub fn get(&self, kind: FrameKind) -> usize {
        match kind {
            FrameKind::Browser => self.browser,
            FrameKind::Terminal => self.terminal,
            FrameKind::Tool => self.tool,
        }
    }

    pub fn total(&self) -> usize {
        self.browser + self.terminal + self.tool
    }
}

/// Kinds with at least one frame, in browser/terminal/tool order.
pub fn available_kinds(counts: &FrameCounts) -> Vec<FrameKind> {
    FrameKind::ALL
        .into_iter()
        .filter(|k| counts.get(*k) > 0)
        .collect()
}
