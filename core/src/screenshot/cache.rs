use std::collections::HashMap;

use serde::Serialize;

/// Per-key state. A key missing from the map has not been fetched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "url", rename_all = "snake_case")]
pub enum ScreenshotEntry {
    Pending,
    /// `None` is a confirmed absence and is never retried.
    Resolved(Option<String>),
}

/// Claim on a pending key, valid only for the epoch it was issued in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScreenshotTicket {
    pub epoch: u64,
    pub tool_use_id: String,
}

#[derive(Debug, Default)]
pub struct ScreenshotCache {
    epoch: u64,
    entries: HashMap<String, ScreenshotEntry>,
}

impl ScreenshotCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn get(&self, tool_use_id: &str) -> Option<&ScreenshotEntry> {
        self.entries.get(tool_use_id.trim())
    }

    pub fn url(&self, tool_use_id: &str) -> Option<&str> {
        match self.get(tool_use_id) {
            Some(ScreenshotEntry::Resolved(Some(url))) => Some(url.as_str()),
            _ => None,
        }
    }

    pub fn is_pending(&self, tool_use_id: &str) -> bool {
        matches!(self.get(tool_use_id), Some(ScreenshotEntry::Pending))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Mark `tool_use_id` pending and hand back a ticket, unless it is blank,
    /// already pending or already resolved.
    pub fn begin(&mut self, tool_use_id: &str) -> Option<ScreenshotTicket> {
        let id = tool_use_id.trim();
        if id.is_empty() || self.entries.contains_key(id) {
            return None;
        }
        self.entries.insert(id.to_string(), ScreenshotEntry::Pending);
        Some(ScreenshotTicket {
            epoch: self.epoch,
            tool_use_id: id.to_string(),
        })
    }

    /// Store the outcome for `ticket`; returns false for a ticket from an
    /// earlier epoch, which leaves the cache untouched.
    pub fn resolve(&mut self, ticket: &ScreenshotTicket, url: Option<String>) -> bool {
        if ticket.epoch != self.epoch {
            tracing::debug!(
                target: "execview.screenshot",
                stage = "screenshot.resolve.stale",
                tool_use_id = %ticket.tool_use_id,
                ticket_epoch = ticket.epoch,
                epoch = self.epoch
            );
            return false;
        }
        self.entries
            .insert(ticket.tool_use_id.clone(), ScreenshotEntry::Resolved(url));
        true
    }

    /// Forget everything and invalidate outstanding tickets.
    pub fn reset(&mut self) {
        self.epoch += 1;
        self.entries.clear();
    }

    pub fn resolved(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.entries.iter().filter_map(|(k, v)| match v {
            ScreenshotEntry::Resolved(url) => Some((k.as_str(), url.as_deref())),
            ScreenshotEntry::Pending => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn begin_is_single_shot_per_key() {
        let mut cache = ScreenshotCache::new();
        assert!(cache.begin("  ").is_none());
        let ticket = cache.begin(" tu-1 ").unwrap();
        assert_eq!(ticket.tool_use_id, "tu-1");
        assert!(cache.is_pending("tu-1"));
        assert!(cache.begin("tu-1").is_none());

        assert!(cache.resolve(&ticket, None));
        assert_eq!(cache.get("tu-1"), Some(&ScreenshotEntry::Resolved(None)));
        // Confirmed absence is terminal.
        assert!(cache.begin("tu-1").is_none());
    }

    #[test]
    fn reset_discards_late_results() {
        let mut cache = ScreenshotCache::new();
        let ticket = cache.begin("tu-1").unwrap();
        cache.reset();
        assert!(cache.is_empty());
        assert!(!cache.resolve(&ticket, Some("https://cdn/x.png".into())));
        assert!(cache.get("tu-1").is_none());

        let fresh = cache.begin("tu-1").unwrap();
        assert!(cache.resolve(&fresh, Some("https://cdn/x.png".into())));
        assert_eq!(cache.url("tu-1"), Some("https://cdn/x.png"));
    }
}
