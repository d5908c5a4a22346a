use std::collections::HashMap;

use super::model::{Cursor, ExecutionRecord};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeStats {
    pub added: usize,
    pub updated: usize,
}

impl MergeStats {
    pub fn changed(&self) -> bool {
        self.added > 0 || self.updated > 0
    }
}

/// Union `incoming` into `records` by id, keeping the list sorted by
/// `(created_at, id)`.
///
/// Applying the same page twice is a no-op, and pages that do not share ids
/// produce the same list regardless of arrival order.
pub fn merge_into(records: &mut Vec<ExecutionRecord>, incoming: Vec<ExecutionRecord>) -> MergeStats {
    let mut stats = MergeStats::default();
    if incoming.is_empty() {
        return stats;
    }

    let mut index: HashMap<String, usize> = records
        .iter()
        .enumerate()
        .map(|(i, r)| (r.id.clone(), i))
        .collect();

    for item in incoming {
        match index.get(&item.id) {
            Some(&i) => {
                if records[i] != item && supersedes(&item, &records[i]) {
                    records[i] = item;
                    stats.updated += 1;
                }
            }
            None => {
                index.insert(item.id.clone(), records.len());
                records.push(item);
                stats.added += 1;
            }
        }
    }

    if stats.changed() {
        records.sort_by(ExecutionRecord::cmp_sort_key);
    }
    stats
}

/// Whether `incoming` is a newer revision of the same record than `existing`.
fn supersedes(incoming: &ExecutionRecord, existing: &ExecutionRecord) -> bool {
    match incoming.updated_at.cmp(&existing.updated_at) {
        std::cmp::Ordering::Greater => true,
        std::cmp::Ordering::Less => false,
        std::cmp::Ordering::Equal => {
            // A finished record never goes back to running.
            if incoming.is_done() != existing.is_done() {
                incoming.is_done()
            } else {
                true
            }
        }
    }
}

/// `(created_at, id)` of the tail in sort order.
///
/// The delta endpoint filters on `updated_at`, which is never earlier than
/// `created_at`, so asking from the tail's creation key returns a superset of
/// what changed and late completions of older rows still come through.
pub fn cursor_of(records: &[ExecutionRecord]) -> Option<Cursor> {
    records.iter().max_by(|a, b| a.cmp_sort_key(b)).map(Cursor::of)
}
