//! tagflow - live keyword statistics over a sampled event stream
//!
//! The pipeline has two long-running tasks connected by a FIFO queue:
//! the stream reader pulls newline-delimited JSON records off a long-lived
//! HTTP connection and enqueues them raw; the block processor drains the
//! queue, extracts `#`-tagged keywords and feeds the shared statistics
//! aggregator. A reporting layer (external to this crate) reads the
//! aggregator through [`stats::StreamStats::snapshot`].

pub mod config;
pub mod keywords;
pub mod processor;
pub mod queue;
pub mod ranking;
pub mod reader;
pub mod stats;
pub mod types;
