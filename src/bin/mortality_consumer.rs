//! Mortality consumer - tails the live stream and renders rolling analytics
//!
//! ## Usage
//!
//! ```bash
//! cargo run --release --bin mortality_consumer
//! HEADLESS=true cargo run --release --bin mortality_consumer
//! ```
//!
//! ## Environment Variables
//!
//! - LIVE_DATA_PATH - JSONL stream to tail (default: data/project_live.json)
//! - MORTALITY_DB_PATH - SQLite analytics database (default: data/mortality_analytics.sqlite)
//! - HIGH_MORTALITY_THRESHOLD - Rate counted as high mortality (default: 100.0)
//! - WINDOW_CAPACITY - Readings kept per rolling window (default: 20)
//! - POLL_INTERVAL_SECS - Ingest poll period (default: 2)
//! - RENDER_INTERVAL_SECS - Dashboard refresh period (default: 2)
//! - FOCUS_CAUSE - Cause shown on the dashboard (default: Heart disease)
//! - HEADLESS - Log snapshots instead of drawing (default: false)
//! - RUST_LOG - Logging level (optional, default: info when headless, error with the dashboard)

use mortflow::config::ConsumerConfig;
use mortflow::consumer::{AnalyticsRow, ConsumerRuntime};
use mortflow::streamer_core::SqliteWriter;
use mortflow::ui::{Dashboard, LogRenderer, SnapshotRenderer};

async fn run<R: SnapshotRenderer>(
    config: &ConsumerConfig,
    writer: SqliteWriter<AnalyticsRow>,
    renderer: R,
) {
    let mut runtime = ConsumerRuntime::new(config, writer, renderer);

    runtime
        .run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                log::error!("Failed to listen for Ctrl-C: {}", e);
                std::future::pending::<()>().await;
            }
        })
        .await;
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();

    let config = ConsumerConfig::from_env()?;

    // Dashboard mode stays quiet unless RUST_LOG asks otherwise
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.default_log_filter()),
    )
    .target(env_logger::Target::Stderr)
    .init();

    log::info!("🚀 Starting Mortality Consumer");
    log::info!("   Live stream: {}", config.live_data_path.display());
    log::info!("   Database: {}", config.db_path.display());
    log::info!("   High mortality threshold: {}", config.threshold);
    log::info!("   Window capacity: {}", config.window_capacity);
    log::info!(
        "   Poll / render interval: {}s / {}s",
        config.poll_interval.as_secs(),
        config.render_interval.as_secs()
    );
    log::info!("   Focus cause: {}", config.focus_cause);

    let writer = SqliteWriter::<AnalyticsRow>::new(&config.db_path)?;

    if config.headless {
        log::info!("📊 Renderer: log");
        run(&config, writer, LogRenderer::new(config.focus_cause.clone())).await;
    } else {
        let dashboard = Dashboard::start(config.focus_cause.clone())?;
        run(&config, writer, dashboard).await;
    }

    log::info!("👋 Mortality Consumer shut down");
    Ok(())
}
