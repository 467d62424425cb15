//! Mortality producer - replays the regional mortality CSV as a live JSONL stream
//!
//! ## Usage
//!
//! ```bash
//! cargo run --release --bin mortality_producer
//! ```
//!
//! ## Environment Variables
//!
//! - LIVE_DATA_PATH - JSONL stream to write (default: data/project_live.json)
//! - MORTALITY_CSV_PATH - Source table (default: data/USRegionalMortality.csv)
//! - PRODUCER_DB_PATH - SQLite copy of every message (default: data/mortality.sqlite)
//! - MESSAGE_INTERVAL_SECONDS - Delay between messages (default: 1)
//! - RUST_LOG - Logging level (optional, default: info)

use mortflow::config::ProducerConfig;
use mortflow::producer::{load_rows, MessageGenerator, MortalityMessage};
use mortflow::streamer_core::{JsonlWriter, SqliteWriter, WriterBackend};
use std::path::Path;
use tokio::time::interval;

/// Start every run from an empty live file
fn reset_live_file(path: &Path) -> std::io::Result<()> {
    if path.exists() {
        std::fs::remove_file(path)?;
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stderr)
        .init();

    dotenv::dotenv().ok();

    let config = ProducerConfig::from_env()?;

    log::info!("🚀 Starting Mortality Producer");
    log::info!("   Source: {}", config.csv_path.display());
    log::info!("   Live stream: {}", config.live_data_path.display());
    log::info!("   Database: {}", config.db_path.display());
    log::info!("   Interval: {}s", config.message_interval.as_secs());
    log::info!("   Use Ctrl+C to stop.");

    let rows = load_rows(&config.csv_path)?;
    let mut db = SqliteWriter::<MortalityMessage>::new(&config.db_path)?;

    reset_live_file(&config.live_data_path)?;
    let mut live = JsonlWriter::new(&config.live_data_path)?;

    let mut messages = MessageGenerator::new(rows);
    let mut ticker = interval(config.message_interval);
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = &mut shutdown => {
                log::warn!("🛑 Mortality Producer interrupted by user");
                break;
            }
            _ = ticker.tick() => {
                let Some(message) = messages.next() else {
                    break;
                };

                log::info!(
                    "📤 {} {} {} {}: Rate {}, SE {}",
                    message.region,
                    message.status,
                    message.sex,
                    message.cause,
                    message.rate,
                    message.se
                );

                if let Err(e) = live.write(&message).await {
                    log::error!("❌ Failed to write {}: {}", live.path().display(), e);
                }
                if let Err(e) = db.write(&message).await {
                    log::error!("❌ Failed to store message: {}", e);
                }
            }
        }
    }

    if let Err(e) = WriterBackend::<MortalityMessage>::flush(&mut live).await {
        log::error!("❌ Failed to flush {}: {}", live.path().display(), e);
    }
    if let Err(e) = db.flush().await {
        log::error!("❌ Failed to flush database: {}", e);
    }

    log::info!("👋 Mortality Producer shutting down after {} messages", messages.emitted());
    Ok(())
}
