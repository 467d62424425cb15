use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WriterError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Database error: {0}")]
    Database(String),
    #[error("Dropped {rows} buffered rows after failed commit: {reason}")]
    BatchDropped { rows: usize, reason: String },
}

impl From<rusqlite::Error> for WriterError {
    fn from(err: rusqlite::Error) -> Self {
        WriterError::Database(err.to_string())
    }
}

#[async_trait]
pub trait WriterBackend<E: Sync>: Send {
    /// Write a single event
    async fn write(&mut self, event: &E) -> Result<(), WriterError>;

    /// Flush pending writes to storage
    async fn flush(&mut self) -> Result<(), WriterError>;

    /// Get backend type for logging
    fn backend_type(&self) -> &'static str;
}
