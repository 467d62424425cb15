use crate::streamer_core::sqlite_pragma::apply_optimized_pragmas;
use crate::streamer_core::writer_backend::{WriterBackend, WriterError};
use async_trait::async_trait;
use rusqlite::{Connection, Transaction};
use std::path::Path;
use std::time::Instant;

/// A row type that knows its table and how to insert itself
pub trait SqlRow: Clone + Send + Sync + 'static {
    /// `CREATE TABLE IF NOT EXISTS ...` plus any indexes, executed as one batch
    const SCHEMA: &'static str;

    fn insert(&self, tx: &Transaction<'_>) -> rusqlite::Result<usize>;
}

/// Batched SQLite writer: rows are buffered and committed in one transaction
/// when the batch fills or the flush interval elapses.
pub struct SqliteWriter<R: SqlRow> {
    conn: Connection,
    batch: Vec<R>,
    batch_size: usize,
    last_flush: Instant,
    flush_interval_secs: u64,
}

impl<R: SqlRow> SqliteWriter<R> {
    pub fn new(db_path: impl AsRef<Path>) -> Result<Self, WriterError> {
        let db_path = db_path.as_ref();

        // Ensure parent directory exists
        if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                WriterError::Io(std::io::Error::new(
                    e.kind(),
                    format!("Failed to create database directory {}: {}", parent.display(), e),
                ))
            })?;
        }

        let conn = Connection::open(db_path)?;
        apply_optimized_pragmas(&conn)?;
        conn.execute_batch(R::SCHEMA)?;

        log::info!("✅ SQLite database initialized at {}", db_path.display());

        Ok(Self {
            conn,
            batch: Vec::with_capacity(100),
            batch_size: 100,
            last_flush: Instant::now(),
            flush_interval_secs: 2,
        })
    }

    pub fn pending(&self) -> usize {
        self.batch.len()
    }

    /// Commit the buffered batch. A failed commit drops the batch so a
    /// broken database cannot grow the buffer without bound.
    fn flush_batch(&mut self) -> Result<(), WriterError> {
        if self.batch.is_empty() {
            return Ok(());
        }

        let rows = self.batch.len();
        let result = commit_rows(&mut self.conn, &self.batch);
        self.batch.clear();
        self.last_flush = Instant::now();

        match result {
            Ok(()) => {
                log::debug!("✅ Flushed {} rows to SQLite", rows);
                Ok(())
            }
            Err(e) => {
                log::error!("❌ Dropped {} rows after failed SQLite commit: {}", rows, e);
                Err(WriterError::BatchDropped {
                    rows,
                    reason: e.to_string(),
                })
            }
        }
    }
}

fn commit_rows<R: SqlRow>(conn: &mut Connection, rows: &[R]) -> rusqlite::Result<()> {
    let tx = conn.transaction()?;
    for row in rows {
        row.insert(&tx)?;
    }
    tx.commit()
}

#[async_trait]
impl<R: SqlRow> WriterBackend<R> for SqliteWriter<R> {
    async fn write(&mut self, row: &R) -> Result<(), WriterError> {
        self.batch.push(row.clone());

        if self.batch.len() >= self.batch_size
            || self.last_flush.elapsed().as_secs() >= self.flush_interval_secs
        {
            self.flush_batch()?;
        }

        Ok(())
    }

    async fn flush(&mut self) -> Result<(), WriterError> {
        self.flush_batch()
    }

    fn backend_type(&self) -> &'static str {
        "SQLite"
    }
}

impl<R: SqlRow> Drop for SqliteWriter<R> {
    fn drop(&mut self) {
        if let Err(e) = self.flush_batch() {
            log::error!("❌ Failed to flush SQLite batch on shutdown: {}", e);
        }
    }
}
