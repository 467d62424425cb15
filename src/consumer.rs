//! Consumer runtime - polls the live file, aggregates, persists and renders
//!
//! Everything runs on one task: the scheduler decides which of the two
//! periodic jobs is due and they run back to back, so the aggregator needs no
//! lock. Task bodies never sit inside a `select!`, which means a shutdown
//! request is only observed between iterations and never cuts an ingest short.

use crate::aggregator_core::{MortalityRecord, StreamAggregator};
use crate::config::ConsumerConfig;
use crate::scheduler::{Scheduler, TaskKind};
use crate::streamer_core::{JsonlPoller, SqlRow, WriterBackend};
use crate::ui::{RenderSignal, SnapshotRenderer};
use rusqlite::{params, Transaction};
use std::future::Future;
use std::time::Duration;

/// One persisted row per accepted record
#[derive(Debug, Clone, PartialEq)]
pub struct AnalyticsRow {
    pub region: String,
    pub status: String,
    pub sex: String,
    pub cause: String,
    pub rate: f64,
    pub se: f64,
    pub timestamp: String,
    pub keyword_mentioned: Option<String>,
    pub is_high_mortality: bool,
}

impl AnalyticsRow {
    pub fn from_record(record: &MortalityRecord, is_high_mortality: bool) -> Self {
        Self {
            region: record.region.clone(),
            status: record.status.clone(),
            sex: record.sex.clone(),
            cause: record.cause.clone(),
            rate: record.rate,
            se: record.se,
            timestamp: record.timestamp.clone(),
            keyword_mentioned: record.keyword_mentioned.clone(),
            is_high_mortality,
        }
    }
}

impl SqlRow for AnalyticsRow {
    const SCHEMA: &'static str = "
        CREATE TABLE IF NOT EXISTS mortality_analytics (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            region TEXT,
            status TEXT,
            sex TEXT,
            cause TEXT,
            rate REAL,
            se REAL,
            timestamp TEXT,
            keyword_mentioned TEXT,
            is_high_mortality BOOLEAN,
            processed_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
        );
        CREATE INDEX IF NOT EXISTS idx_analytics_cause_region
            ON mortality_analytics(cause, region);
    ";

    fn insert(&self, tx: &Transaction<'_>) -> rusqlite::Result<usize> {
        tx.execute(
            "INSERT INTO mortality_analytics
             (region, status, sex, cause, rate, se, timestamp, keyword_mentioned, is_high_mortality)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                self.region,
                self.status,
                self.sex,
                self.cause,
                self.rate,
                self.se,
                self.timestamp,
                self.keyword_mentioned,
                self.is_high_mortality,
            ],
        )
    }
}

/// Outcome of one ingest-poll iteration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PollStats {
    pub lines: usize,
    pub accepted: usize,
    pub duplicates: usize,
    pub rejected: usize,
    pub high: usize,
    pub persist_failures: usize,
}

pub struct ConsumerRuntime<W, R>
where
    W: WriterBackend<AnalyticsRow>,
    R: SnapshotRenderer,
{
    poller: JsonlPoller,
    aggregator: StreamAggregator,
    writer: W,
    renderer: R,
    scheduler: Scheduler,
}

impl<W, R> ConsumerRuntime<W, R>
where
    W: WriterBackend<AnalyticsRow>,
    R: SnapshotRenderer,
{
    pub fn new(config: &ConsumerConfig, writer: W, renderer: R) -> Self {
        Self {
            poller: JsonlPoller::new(config.live_data_path.clone()),
            aggregator: StreamAggregator::new(config.threshold, config.window_capacity),
            writer,
            renderer,
            scheduler: Scheduler::new(config.poll_interval, config.render_interval),
        }
    }

    /// Ingest everything appended to the live file since the last poll
    pub async fn poll_once(&mut self) -> PollStats {
        let mut stats = PollStats::default();

        let lines = match self.poller.poll().await {
            Ok(lines) => lines,
            Err(e) => {
                log::error!("❌ Error reading {}: {}", self.poller.path().display(), e);
                return stats;
            }
        };

        if lines.is_empty() {
            log::info!("⏳ Waiting for new mortality data...");
            return stats;
        }

        for line in lines {
            stats.lines += 1;

            let record = match MortalityRecord::from_jsonl(&line) {
                Ok(record) => record,
                Err(e) => {
                    log::warn!("⚠️  Could not extract mortality data ({}): {}", e, line);
                    stats.rejected += 1;
                    continue;
                }
            };

            let result = self.aggregator.ingest(&record);
            if !result.accepted {
                log::debug!("Skipping already-seen message {}", record.identity());
                stats.duplicates += 1;
                continue;
            }

            stats.accepted += 1;
            if result.was_high {
                stats.high += 1;
                log::warn!(
                    "🚨 HIGH MORTALITY DETECTED: {} {} {} {}: Rate {}",
                    record.region,
                    record.status,
                    record.sex,
                    record.cause,
                    record.rate
                );
            }

            log::info!(
                "📊 {} {} {} {}: Rate {}, SE {}, Keyword: {}",
                record.region,
                record.status,
                record.sex,
                record.cause,
                record.rate,
                record.se,
                record.keyword_mentioned.as_deref().unwrap_or("-")
            );

            // In-memory aggregates stay authoritative even if the durable copy fails
            let row = AnalyticsRow::from_record(&record, result.was_high);
            if let Err(e) = self.writer.write(&row).await {
                log::error!("❌ Failed to persist {}: {}", record.identity(), e);
                stats.persist_failures += 1;
            }
        }

        // Commit every poll so readers see rows without waiting for the next batch
        if stats.accepted > 0 {
            if let Err(e) = self.writer.flush().await {
                log::error!("❌ Failed to flush {} writer: {}", self.writer.backend_type(), e);
                stats.persist_failures += 1;
            }
        }

        stats
    }

    /// Hand the current snapshot to the renderer
    pub fn render_once(&mut self) -> RenderSignal {
        let snapshot = self.aggregator.snapshot();
        match self.renderer.render(&snapshot) {
            Ok(signal) => signal,
            Err(e) => {
                log::error!("Render error ({}): {}", self.renderer.name(), e);
                RenderSignal::Continue
            }
        }
    }

    pub async fn run_task(&mut self, kind: TaskKind) -> RenderSignal {
        log::trace!("Running task {}", kind.as_str());
        match kind {
            TaskKind::IngestPoll => {
                self.poll_once().await;
                RenderSignal::Continue
            }
            TaskKind::SnapshotRender => self.render_once(),
        }
    }

    /// Run every task due at `now` (offset since start), in order
    pub async fn step(&mut self, now: Duration) -> RenderSignal {
        for kind in self.scheduler.step(now) {
            if self.run_task(kind).await == RenderSignal::Shutdown {
                return RenderSignal::Shutdown;
            }
        }
        RenderSignal::Continue
    }

    /// Drive the scheduler on the wall clock until `shutdown` resolves or the
    /// renderer asks to quit, then flush.
    pub async fn run_until<F>(&mut self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        let start = tokio::time::Instant::now();
        tokio::pin!(shutdown);

        loop {
            let deadline = start + self.scheduler.next_deadline();

            tokio::select! {
                biased;
                _ = &mut shutdown => {
                    log::info!("🛑 Shutdown requested");
                    break;
                }
                _ = tokio::time::sleep_until(deadline) => {}
            }

            if self.step(start.elapsed()).await == RenderSignal::Shutdown {
                log::info!("🛑 Quit requested from {}", self.renderer.name());
                break;
            }
        }

        self.finish().await;
    }

    /// Flush pending rows and log totals
    pub async fn finish(&mut self) {
        if let Err(e) = self.writer.flush().await {
            log::error!("❌ Failed to flush {} writer: {}", self.writer.backend_type(), e);
        }

        log::info!(
            "📈 Total high mortality events detected: {}",
            self.aggregator.monitor().count()
        );
        log::info!(
            "📊 Processed {} records ({} duplicates, {} identities tracked) for {} causes",
            self.aggregator.accepted_count(),
            self.aggregator.duplicate_count(),
            self.aggregator.seen_identities(),
            self.aggregator.categories().len()
        );
    }

    pub fn aggregator(&self) -> &StreamAggregator {
        &self.aggregator
    }

    pub fn writer(&self) -> &W {
        &self.writer
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }
}
