//! Block processor: drains the queue and feeds the statistics aggregator

use crate::keywords::extract_keywords;
use crate::queue::BlockQueue;
use crate::stats::StreamStats;
use crate::types::{DecodedEvent, EventBlock};
use chrono::{DateTime, Timelike, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

/// Heartbeat period in wall-clock seconds.
const HEARTBEAT_SECONDS: u32 = 10;

/// Decodes queued event blocks, extracts keywords and updates the shared
/// statistics.
///
/// The processor keeps the cumulative per-keyword tally; the ranking table
/// only ever sees new totals. A decode fault is isolated to the single
/// queued item: it is logged, posted to the aggregator status, and the
/// loop moves on.
pub struct BlockProcessor {
    queue: Arc<BlockQueue>,
    stats: Arc<StreamStats>,
    poll_delay: Duration,
    started_at: DateTime<Utc>,
    tally: HashMap<String, u64>,
    total_events: u64,
    total_keywords: u64,
}

impl BlockProcessor {
    pub fn new(queue: Arc<BlockQueue>, stats: Arc<StreamStats>, poll_delay_ms: u64) -> Self {
        let started_at = stats.started_at();
        Self {
            queue,
            stats,
            poll_delay: Duration::from_millis(poll_delay_ms),
            started_at,
            tally: HashMap::new(),
            total_events: 0,
            total_keywords: 0,
        }
    }

    /// Polling loop: dequeue one block at a time, sleep briefly when the
    /// queue is empty, emit a heartbeat roughly every ten seconds.
    ///
    /// Exits when the shutdown signal flips; whatever is still queued is
    /// discarded.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) {
        log::info!("Block processor is now running");

        // Remembering the last logged second keeps the heartbeat to one
        // line per ten-second window.
        let mut heartbeat_second = u32::MAX;

        loop {
            if *shutdown.borrow() {
                break;
            }

            let now = Utc::now();
            let second = now.second();
            if second % HEARTBEAT_SECONDS == 0 && second != heartbeat_second {
                log::info!(
                    "Worker running at {} with {} blocks queued",
                    now,
                    self.queue.size()
                );
                heartbeat_second = second;
            }

            match self.queue.dequeue() {
                Some(block) => {
                    if let Err(e) = self.process_block(&block) {
                        log::error!("An error occurred when processing events: {}", e);
                        self.stats
                            .set_status(format!("An error occurred when processing events: {}", e));
                    }
                }
                None => {
                    tokio::select! {
                        changed = shutdown.changed() => {
                            if changed.is_err() || *shutdown.borrow() {
                                break;
                            }
                        }
                        _ = tokio::time::sleep(self.poll_delay) => {}
                    }
                }
            }
        }

        log::info!(
            "Block processor is shutting down, {} queued blocks will not be processed",
            self.queue.size()
        );
    }

    /// Decode one block and fold it into the statistics.
    ///
    /// An event without a body yields zero keywords but still counts; a
    /// record that fails to decode counts for nothing and surfaces the
    /// error to the caller.
    pub fn process_block(&mut self, block: &EventBlock) -> Result<(), serde_json::Error> {
        let event: DecodedEvent = serde_json::from_str(block.contents())?;

        if let Some(text) = event.data.as_ref().and_then(|d| d.text.as_deref()) {
            for found in extract_keywords(text) {
                log::debug!("Keyword '{}' tagged at offset {}", found.keyword, found.position);
                let count = {
                    let entry = self.tally.entry(found.keyword.clone()).or_insert(0);
                    *entry += 1;
                    *entry
                };
                self.total_keywords += 1;
                self.stats.update_top_keywords(&found.keyword, count);
            }
        }

        self.total_events += 1;
        log::debug!("Processed event number {}", self.total_events);

        self.stats
            .set_basic_fields(self.total_keywords, self.total_events, self.queue.size());
        self.stats.set_calculated_fields(self.started_at);

        Ok(())
    }
}
