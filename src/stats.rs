//! Shared statistics aggregator
//!
//! One instance is created at process start and handed to every component
//! that needs it. The block processor writes, the stream reader posts
//! status on fatal conditions, and the external reporting layer reads via
//! [`StreamStats::snapshot`]. All compound access is serialized by a single
//! mutex scoped to the instance; the lock is only ever held for in-memory
//! work, never across I/O.

use crate::ranking::{KeywordEntry, RankingTable};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Mutex;

/// Immutable point-in-time copy of the aggregate statistics.
#[derive(Debug, Clone, Serialize)]
pub struct StatsSnapshot {
    pub total_events: u64,
    pub total_keywords: u64,
    pub queue_depth: usize,
    pub daily_rate: u64,
    pub hourly_rate: u64,
    pub started_at: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
    pub status: Option<String>,
    pub top_keywords: Vec<KeywordEntry>,
}

#[derive(Debug)]
struct StatsInner {
    total_events: u64,
    total_keywords: u64,
    queue_depth: usize,
    daily_rate: u64,
    hourly_rate: u64,
    started_at: DateTime<Utc>,
    last_updated: DateTime<Utc>,
    status: Option<String>,
    top_keywords: RankingTable,
}

/// Concurrency-safe statistics for the sampled stream.
#[derive(Debug)]
pub struct StreamStats {
    inner: Mutex<StatsInner>,
}

impl StreamStats {
    /// Create the aggregator with a ranking table of `top_keywords_size`
    /// slots.
    pub fn new(top_keywords_size: usize) -> Self {
        let now = Utc::now();
        Self {
            inner: Mutex::new(StatsInner {
                total_events: 0,
                total_keywords: 0,
                queue_depth: 0,
                daily_rate: 0,
                hourly_rate: 0,
                started_at: now,
                last_updated: now,
                status: None,
                top_keywords: RankingTable::new(top_keywords_size),
            }),
        }
    }

    /// Bulk update of the basic counters in one lock acquisition.
    pub fn set_basic_fields(&self, total_keywords: u64, total_events: u64, queue_depth: usize) {
        let mut inner = self.inner.lock().unwrap();
        inner.total_keywords = total_keywords;
        inner.total_events = total_events;
        inner.queue_depth = queue_depth;
    }

    /// Recompute `last_updated` and the derived daily/hourly rates from
    /// `start_time`.
    ///
    /// Elapsed time is rounded up to whole hours/days with a floor of one
    /// unit, so a zero-duration or skewed-clock (future `start_time`)
    /// window never divides by zero or produces an absurd rate. The rates
    /// themselves are floor divisions of the event total over those units.
    pub fn set_calculated_fields(&self, start_time: DateTime<Utc>) {
        let mut inner = self.inner.lock().unwrap();
        let now = Utc::now();
        inner.last_updated = now;

        let elapsed_secs = (now - start_time).num_seconds();
        inner.hourly_rate = inner.total_events / elapsed_units(elapsed_secs, 3_600);
        inner.daily_rate = inner.total_events / elapsed_units(elapsed_secs, 86_400);
    }

    /// Feed a keyword's new cumulative total into the ranking table.
    pub fn update_top_keywords(&self, keyword: &str, count: u64) {
        self.inner.lock().unwrap().top_keywords.update(keyword, count);
    }

    /// Overwrite the free-form status string. Last write wins; used to
    /// surface fatal or degraded conditions to external observers.
    pub fn set_status(&self, message: impl Into<String>) {
        self.inner.lock().unwrap().status = Some(message.into());
    }

    /// Immutable copy of every field. Shares nothing with the aggregator's
    /// internal state.
    pub fn snapshot(&self) -> StatsSnapshot {
        let inner = self.inner.lock().unwrap();
        StatsSnapshot {
            total_events: inner.total_events,
            total_keywords: inner.total_keywords,
            queue_depth: inner.queue_depth,
            daily_rate: inner.daily_rate,
            hourly_rate: inner.hourly_rate,
            started_at: inner.started_at,
            last_updated: inner.last_updated,
            status: inner.status.clone(),
            top_keywords: inner.top_keywords.entries(),
        }
    }

    /// Timestamp the aggregator was created; the pipeline's start time.
    pub fn started_at(&self) -> DateTime<Utc> {
        self.inner.lock().unwrap().started_at
    }
}

/// Whole elapsed `unit_secs`-sized units, rounded up, floored at 1.
fn elapsed_units(elapsed_secs: i64, unit_secs: i64) -> u64 {
    let mut units = elapsed_secs.div_euclid(unit_secs);
    if elapsed_secs.rem_euclid(unit_secs) > 0 {
        units += 1;
    }
    units.max(1) as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_new_instance_defaults() {
        let stats = StreamStats::new(3);
        let snapshot = stats.snapshot();

        assert_eq!(snapshot.total_events, 0);
        assert_eq!(snapshot.total_keywords, 0);
        assert_eq!(snapshot.queue_depth, 0);
        assert_eq!(snapshot.daily_rate, 0);
        assert_eq!(snapshot.hourly_rate, 0);
        assert!(snapshot.status.is_none());
        assert!(snapshot.top_keywords.is_empty());
    }

    #[test]
    fn test_set_basic_fields() {
        let stats = StreamStats::new(1);
        for (keywords, events, depth) in
            [(0, 0, 0), (1, 0, 0), (0, 1, 0), (0, 0, 1), (10, 20, 0), (20, 30, 40)]
        {
            stats.set_basic_fields(keywords, events, depth);
            let snapshot = stats.snapshot();
            assert_eq!(snapshot.total_keywords, keywords);
            assert_eq!(snapshot.total_events, events);
            assert_eq!(snapshot.queue_depth, depth);
        }
    }

    /// Rate table carried over from the source system's documentation.
    /// Each row: (total events, elapsed hours, expected daily, expected
    /// hourly). The one-second margin keeps the elapsed window strictly
    /// inside the intended hour count despite test-run jitter.
    #[test]
    fn test_calculated_rates() {
        let rows: &[(u64, i64, u64, u64)] = &[
            (0, 0, 0, 0),
            (1, 0, 1, 1),
            (99, 0, 99, 99),
            (0, 1, 0, 0),
            (1, 1, 1, 1),
            (99, 1, 99, 99),
            (0, 12345, 0, 0),
            (1, 12345, 0, 0),
            (98, 12345, 0, 0),
            (9999, 12345, 19, 0),
            (99999, 12345, 194, 8),
            (2000000, 12345, 3883, 162),
            (0, 54321, 0, 0),
            (1, 54321, 0, 0),
            (97, 54321, 0, 0),
            (9999, 54321, 4, 0),
            (99999, 54321, 44, 1),
            (2000000, 54321, 883, 36),
        ];

        for &(total_events, elapsed_hours, expected_daily, expected_hourly) in rows {
            let stats = StreamStats::new(1);
            stats.set_basic_fields(0, total_events, 0);

            let start_time =
                Utc::now() - Duration::hours(elapsed_hours) + Duration::seconds(1);
            stats.set_calculated_fields(start_time);

            let snapshot = stats.snapshot();
            assert_eq!(
                snapshot.daily_rate, expected_daily,
                "daily rate for {} events over {}h",
                total_events, elapsed_hours
            );
            assert_eq!(
                snapshot.hourly_rate, expected_hourly,
                "hourly rate for {} events over {}h",
                total_events, elapsed_hours
            );
        }
    }

    #[test]
    fn test_future_start_time_never_divides_by_zero() {
        let stats = StreamStats::new(1);
        stats.set_basic_fields(0, 1000, 0);

        // Clock skew: start time an hour in the future
        stats.set_calculated_fields(Utc::now() + Duration::hours(1));
        let snapshot = stats.snapshot();
        assert_eq!(snapshot.daily_rate, 1000);
        assert_eq!(snapshot.hourly_rate, 1000);
    }

    #[test]
    fn test_elapsed_units_rounding() {
        assert_eq!(elapsed_units(-1, 3600), 1);
        assert_eq!(elapsed_units(0, 3600), 1);
        assert_eq!(elapsed_units(1, 3600), 1);
        assert_eq!(elapsed_units(3600, 3600), 1);
        assert_eq!(elapsed_units(3601, 3600), 2);
        assert_eq!(elapsed_units(12345 * 3600 - 1, 86400), 515);
        assert_eq!(elapsed_units(54321 * 3600 - 1, 86400), 2264);
    }

    #[test]
    fn test_set_status_last_write_wins() {
        let stats = StreamStats::new(1);
        stats.set_status("Good");
        assert_eq!(stats.snapshot().status.as_deref(), Some("Good"));
        stats.set_status("A very bad status");
        assert_eq!(stats.snapshot().status.as_deref(), Some("A very bad status"));
        stats.set_status("");
        assert_eq!(stats.snapshot().status.as_deref(), Some(""));
    }

    #[test]
    fn test_snapshot_is_isolated_copy() {
        let stats = StreamStats::new(2);
        stats.update_top_keywords("abc", 5);

        let before = stats.snapshot();
        stats.update_top_keywords("xyz", 9);
        stats.set_basic_fields(1, 1, 1);

        // The earlier snapshot must not observe later mutation
        assert_eq!(before.top_keywords.len(), 1);
        assert_eq!(before.top_keywords[0].keyword, "abc");
        assert_eq!(before.total_events, 0);

        let after = stats.snapshot();
        assert_eq!(after.top_keywords[0].keyword, "xyz");
    }

    #[test]
    fn test_update_top_keywords_delegates() {
        let stats = StreamStats::new(2);
        stats.update_top_keywords("abc", 2);
        stats.update_top_keywords("xyz", 1);
        let top = stats.snapshot().top_keywords;
        assert_eq!(top[0], KeywordEntry { keyword: "abc".into(), count: 2 });
        assert_eq!(top[1], KeywordEntry { keyword: "xyz".into(), count: 1 });
    }
}
