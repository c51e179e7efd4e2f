//! FIFO queue decoupling the stream reader from the block processor

use crate::types::EventBlock;
use std::collections::VecDeque;
use std::sync::Mutex;

#[derive(Debug)]
pub enum QueueError {
    /// A blank payload was offered; the reader filters keep-alives before
    /// enqueueing, so an empty block is a caller bug.
    EmptyBlock,
}

impl std::fmt::Display for QueueError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QueueError::EmptyBlock => write!(f, "cannot enqueue an empty event block"),
        }
    }
}

impl std::error::Error for QueueError {}

/// Thread-safe FIFO queue of raw event blocks.
///
/// No upper bound is enforced: under slow consumption the queue grows
/// without limit. That is an accepted trade-off, the queue stays simple
/// and `enqueue` never blocks the read loop.
#[derive(Debug, Default)]
pub struct BlockQueue {
    items: Mutex<VecDeque<EventBlock>>,
}

impl BlockQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a block at the tail. Never blocks; fails only on a blank
    /// payload.
    pub fn enqueue(&self, block: EventBlock) -> Result<(), QueueError> {
        if block.contents().trim().is_empty() {
            return Err(QueueError::EmptyBlock);
        }

        self.items.lock().unwrap().push_back(block);
        Ok(())
    }

    /// Remove and return the head block, or `None` when the queue is empty.
    /// An empty queue is a normal condition, not an error.
    pub fn dequeue(&self) -> Option<EventBlock> {
        self.items.lock().unwrap().pop_front()
    }

    /// Current number of queued blocks. A snapshot read: concurrent
    /// enqueue/dequeue may change it immediately afterwards.
    pub fn size(&self) -> usize {
        self.items.lock().unwrap().len()
    }
}
