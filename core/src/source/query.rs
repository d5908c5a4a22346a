use serde::{Deserialize, Serialize};

use crate::execution::{Cursor, ExecutionRecord};

/// Offset-paginated page of the log, ascending by `(created_at, id)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SnapshotQuery {
    pub session_id: String,
    pub limit: usize,
    pub offset: usize,
}

/// Records strictly after `(after_created_at, after_id)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeltaQuery {
    pub session_id: String,
    pub after_created_at: String,
    pub after_id: String,
    pub limit: usize,
}

impl DeltaQuery {
    pub fn from_cursor(session_id: &str, cursor: &Cursor, limit: usize) -> Self {
        Self {
            session_id: session_id.to_string(),
            after_created_at: cursor.after_created_at.clone(),
            after_id: cursor.after_id.clone(),
            limit,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeltaPage {
    #[serde(default)]
    pub items: Vec<ExecutionRecord>,

    #[serde(default)]
    pub has_more: bool,

    #[serde(default)]
    pub next_after_created_at: Option<String>,

    #[serde(default)]
    pub next_after_id: Option<String>,
}

impl DeltaPage {
    /// Where the next page of a drain starts: the server's continuation
    /// token if it sent one, otherwise the last item's key.
    pub fn next_cursor(&self) -> Option<Cursor> {
        let last = self.items.last();
        let created_at = self
            .next_after_created_at
            .clone()
            .or_else(|| last.map(|r| r.sync_key().to_string()))?;
        let id = self
            .next_after_id
            .clone()
            .or_else(|| last.map(|r| r.id.clone()))?;
        Some(Cursor::new(created_at, id))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreenshotRef {
    pub url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_cursor_prefers_server_token() {
        let page = DeltaPage {
            items: vec![ExecutionRecord::new("b", "t2", "Bash")],
            has_more: true,
            next_after_created_at: Some("t9".into()),
            next_after_id: Some("z".into()),
        };
        assert_eq!(page.next_cursor(), Some(Cursor::new("t9", "z")));
    }

    #[test]
    fn next_cursor_falls_back_to_last_item() {
        let page = DeltaPage {
            items: vec![
                ExecutionRecord::new("a", "t1", "Bash"),
                ExecutionRecord::new("b", "t2", "Bash"),
            ],
            has_more: true,
            ..DeltaPage::default()
        };
        assert_eq!(page.next_cursor(), Some(Cursor::new("t2", "b")));
        assert_eq!(DeltaPage::default().next_cursor(), None);
    }
}
