//! Stream reader: long-lived HTTP connection feeding the block queue
//!
//! The reader owns the network side of the pipeline. It connects once per
//! run, reads the response body line by line, and enqueues each non-blank
//! line untouched. Reconnect policy is deliberately external: a fatal
//! stream fault ends this run and is surfaced through the return value and
//! the aggregator status.

use crate::config::{Config, BEARER_TOKEN_ENV};
use crate::queue::BlockQueue;
use crate::stats::StreamStats;
use crate::types::EventBlock;
use std::sync::Arc;
use tokio::sync::watch;

/// Status posted when no bearer credential is configured.
pub const BEARER_TOKEN_MISSING_MESSAGE: &str =
    "To access the stream API please set the STREAM_BEARER_TOKEN environment variable";

#[derive(Debug)]
pub enum ReaderError {
    /// The initial GET failed or returned a non-success status
    Connect(reqwest::Error),
    /// The established stream faulted mid-read
    Stream(reqwest::Error),
}

impl std::fmt::Display for ReaderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReaderError::Connect(e) => write!(f, "stream connect failed: {}", e),
            ReaderError::Stream(e) => write!(f, "stream read failed: {}", e),
        }
    }
}

impl std::error::Error for ReaderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ReaderError::Connect(e) | ReaderError::Stream(e) => Some(e),
        }
    }
}

/// Classification of a mid-stream read error.
///
/// A locally-initiated connection abort is the normal consequence of
/// closing the stream and is swallowed; everything else ends the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamClosure {
    ExpectedClosure,
    FatalFault,
}

/// Inspect an error's source chain for a local connection abort.
pub fn classify_closure(err: &(dyn std::error::Error + 'static)) -> StreamClosure {
    let mut source: Option<&(dyn std::error::Error + 'static)> = Some(err);
    while let Some(e) = source {
        if let Some(io_err) = e.downcast_ref::<std::io::Error>() {
            if io_err.kind() == std::io::ErrorKind::ConnectionAborted {
                return StreamClosure::ExpectedClosure;
            }
        }
        source = e.source();
    }
    StreamClosure::FatalFault
}

/// Reads the sampled stream and forwards raw records into the queue.
pub struct StreamReader {
    client: reqwest::Client,
    stream_url: String,
    bearer_token: Option<String>,
    queue: Arc<BlockQueue>,
    stats: Arc<StreamStats>,
}

impl StreamReader {
    pub fn new(config: &Config, queue: Arc<BlockQueue>, stats: Arc<StreamStats>) -> Self {
        Self {
            client: reqwest::Client::new(),
            stream_url: config.stream_url.clone(),
            bearer_token: config.bearer_token.clone(),
            queue,
            stats,
        }
    }

    /// Run one streaming session until end-of-stream, shutdown, or a fatal
    /// fault.
    ///
    /// With no bearer credential configured the reader never connects: it
    /// posts a descriptive status and stays idle for this run.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) -> Result<(), ReaderError> {
        let Some(token) = self.bearer_token.as_deref() else {
            log::error!("{} is not set, reader will stay idle", BEARER_TOKEN_ENV);
            self.stats.set_status(BEARER_TOKEN_MISSING_MESSAGE);
            return Ok(());
        };

        log::info!("🔌 Connecting to stream: {}", self.stream_url);
        let response = match self
            .client
            .get(&self.stream_url)
            .bearer_auth(token)
            .send()
            .await
            .and_then(|r| r.error_for_status())
        {
            Ok(response) => response,
            Err(e) => {
                // A pipeline that never connected must be distinguishable
                // from one that is healthy but quiet
                log::error!("❌ Stream connect failed: {}", e);
                self.stats.set_status(format!("Stream connect failed: {}", e));
                return Err(ReaderError::Connect(e));
            }
        };

        // Headers received: the stream is live even before any body bytes
        log::info!("✅ Stream connected, reading records");

        let mut response = response;
        let mut pending: Vec<u8> = Vec::new();

        loop {
            tokio::select! {
                changed = shutdown.changed() => {
                    // Dropping the response below force-closes the
                    // connection, so a blocked read never outlives the
                    // shutdown request.
                    if changed.is_err() || *shutdown.borrow() {
                        log::info!("Shutdown requested, closing stream");
                        break;
                    }
                }
                chunk = response.chunk() => match chunk {
                    Ok(Some(bytes)) => {
                        pending.extend_from_slice(&bytes);
                        self.drain_lines(&mut pending);
                    }
                    Ok(None) => {
                        // A final record may end at EOF without a newline;
                        // it is just as valid as a terminated one
                        self.flush_pending(&mut pending);
                        log::info!("End of stream reached");
                        break;
                    }
                    Err(e) => match classify_closure(&e) {
                        StreamClosure::ExpectedClosure => {
                            log::info!("Stream closed locally: {}", e);
                            break;
                        }
                        StreamClosure::FatalFault => {
                            log::error!("❌ Stream fault: {}", e);
                            self.stats.set_status(format!("Stream read failed: {}", e));
                            return Err(ReaderError::Stream(e));
                        }
                    }
                }
            }
        }

        Ok(())
    }

    /// Split complete lines out of the chunk buffer. Blank lines are
    /// protocol keep-alives and are discarded; anything else is enqueued
    /// as-is.
    fn drain_lines(&self, pending: &mut Vec<u8>) {
        while let Some(pos) = pending.iter().position(|&b| b == b'\n') {
            let raw: Vec<u8> = pending.drain(..=pos).collect();
            self.handle_line(&raw[..raw.len() - 1]);
        }
    }

    /// Enqueue the unterminated remainder of the buffer at end-of-stream.
    fn flush_pending(&self, pending: &mut Vec<u8>) {
        if !pending.is_empty() {
            let raw = std::mem::take(pending);
            self.handle_line(&raw);
        }
    }

    fn handle_line(&self, raw: &[u8]) {
        let line = String::from_utf8_lossy(raw);
        let line = line.trim_end_matches('\r');

        if line.trim().is_empty() {
            log::debug!("Keep-alive received");
            return;
        }

        if let Err(e) = self.queue.enqueue(EventBlock::new(line)) {
            log::warn!("Dropping record: {}", e);
        }
    }
}
