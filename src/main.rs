//! tagflow runtime
//!
//! Wires the pipeline together: stream reader -> block queue -> block
//! processor -> shared statistics. Runs until CTRL+C, then signals both
//! tasks to stop and logs a final snapshot. Serving the snapshot (REST,
//! pages) is a separate concern layered on top of the library.

use log::{error, info};
use std::sync::Arc;
use tagflow::config::Config;
use tagflow::processor::BlockProcessor;
use tagflow::queue::BlockQueue;
use tagflow::reader::StreamReader;
use tagflow::stats::StreamStats;
use tokio::sync::watch;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::from_env();

    info!("🚀 Starting tagflow collector");
    info!("   ├─ Stream URL: {}", config.stream_url);
    info!(
        "   ├─ Bearer token: {}",
        if config.bearer_token.is_some() { "configured" } else { "MISSING" }
    );
    info!("   ├─ Top keywords tracked: {}", config.top_keywords_size);
    info!("   └─ Poll delay: {}ms", config.poll_delay_ms);

    let stats = Arc::new(StreamStats::new(config.top_keywords_size));
    let queue = Arc::new(BlockQueue::new());
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let reader = StreamReader::new(&config, queue.clone(), stats.clone());
    let reader_shutdown = shutdown_rx.clone();
    let reader_handle = tokio::spawn(async move {
        if let Err(e) = reader.run(reader_shutdown).await {
            error!("❌ Stream reader failed: {}", e);
        }
    });

    let processor = BlockProcessor::new(queue.clone(), stats.clone(), config.poll_delay_ms);
    let processor_handle = tokio::spawn(processor.run(shutdown_rx));

    info!("✅ Pipeline running, press CTRL+C to stop");

    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("⚠️  Received CTRL+C, shutting down..."),
        Err(e) => error!("❌ Failed to listen for CTRL+C: {}", e),
    }

    // Cooperative shutdown: the reader force-closes its connection, the
    // processor exits at its next loop iteration.
    shutdown_tx.send(true).ok();
    let _ = reader_handle.await;
    let _ = processor_handle.await;

    let snapshot = stats.snapshot();
    info!(
        "✅ Collector stopped: {} events, {} keywords, {} still queued",
        snapshot.total_events,
        snapshot.total_keywords,
        snapshot.queue_depth
    );
    if let Some(status) = snapshot.status {
        info!("   └─ Last status: {}", status);
    }

    Ok(())
}
