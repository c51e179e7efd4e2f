//! Bounded top-N ranking of keyword counts

use serde::Serialize;

/// One occupied slot of the ranking table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeywordEntry {
    pub keyword: String,
    pub count: u64,
}

/// Fixed-capacity table of the N most frequent keywords, sorted descending
/// by count. Occupied slots always form a prefix; empty slots are `None`.
///
/// Updates are O(capacity). Capacity is deliberately tiny (single to low
/// double digits), so a linear shift beats a heap in practice.
#[derive(Debug, Clone)]
pub struct RankingTable {
    slots: Vec<Option<KeywordEntry>>,
}

impl RankingTable {
    /// Create a table with `capacity` slots. A capacity of 0 is clamped
    /// to 1 so the overwrite-or-displace logic always has a slot to work
    /// with.
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: vec![None; capacity.max(1)],
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn slot(&self, index: usize) -> Option<&KeywordEntry> {
        self.slots.get(index).and_then(|s| s.as_ref())
    }

    /// Copy of the occupied entries, highest count first.
    pub fn entries(&self) -> Vec<KeywordEntry> {
        self.slots.iter().flatten().cloned().collect()
    }

    /// Record that `keyword` has now been seen `new_count` times in total.
    ///
    /// `new_count` is the keyword's cumulative total, not a delta. If the
    /// keyword is already resident it is first removed (re-resolving its
    /// rank even when the count went down), then reinserted at the first
    /// slot holding a strictly smaller count. Equal counts do not displace:
    /// the resident entry keeps the better rank. A keyword that ranks below
    /// every resident entry of a full table is dropped.
    pub fn update(&mut self, keyword: &str, new_count: u64) {
        let capacity = self.slots.len();

        // Remove an existing occurrence, shifting later entries up and
        // clearing the vacated tail slot.
        if let Some(pos) = self
            .slots
            .iter()
            .position(|s| s.as_ref().is_some_and(|e| e.keyword == keyword))
        {
            self.slots.remove(pos);
            self.slots.push(None);
        }

        // First slot with a strictly smaller count; an empty slot counts
        // as zero.
        let target = self
            .slots
            .iter()
            .position(|s| s.as_ref().map_or(0, |e| e.count) < new_count);

        if let Some(index) = target {
            // Shift down from the insertion point; the tail entry falls off.
            self.slots.insert(
                index,
                Some(KeywordEntry {
                    keyword: keyword.to_string(),
                    count: new_count,
                }),
            );
            self.slots.truncate(capacity);
        }
    }
}
