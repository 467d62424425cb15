//! Append-only JSONL writer for the live message file

use crate::streamer_core::writer_backend::{WriterBackend, WriterError};
use async_trait::async_trait;
use serde::Serialize;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

pub struct JsonlWriter {
    file: BufWriter<File>,
    path: PathBuf,
    lines_written: u64,
}

impl JsonlWriter {
    pub fn new(path: impl AsRef<Path>) -> Result<Self, WriterError> {
        let path = path.as_ref();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new().create(true).append(true).open(path)?;

        log::info!("📝 Writing messages to: {}", path.display());

        Ok(Self {
            file: BufWriter::new(file),
            path: path.to_path_buf(),
            lines_written: 0,
        })
    }

    /// Serialize one event as a line and flush it so tailing readers see it immediately
    pub fn write_event<E: Serialize>(&mut self, event: &E) -> Result<(), WriterError> {
        let json = serde_json::to_string(event)?;
        writeln!(self.file, "{}", json)?;
        self.file.flush()?;
        self.lines_written += 1;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn lines_written(&self) -> u64 {
        self.lines_written
    }
}

#[async_trait]
impl<E: Serialize + Sync> WriterBackend<E> for JsonlWriter {
    async fn write(&mut self, event: &E) -> Result<(), WriterError> {
        self.write_event(event)
    }

    async fn flush(&mut self) -> Result<(), WriterError> {
        self.file.flush()?;
        Ok(())
    }

    fn backend_type(&self) -> &'static str {
        "JSONL"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_lines_appended_and_flushed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data").join("live.json");

        let mut writer = JsonlWriter::new(&path).unwrap();
        writer.write_event(&json!({"author": "a", "rate": 1.5})).unwrap();
        writer.write_event(&json!({"author": "b", "rate": 2.5})).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], r#"{"author":"a","rate":1.5}"#);
        assert_eq!(writer.lines_written(), 2);
        assert_eq!(writer.path(), path.as_path());
    }

    #[test]
    fn test_reopen_appends() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("live.json");

        JsonlWriter::new(&path).unwrap().write_event(&json!({"n": 1})).unwrap();
        JsonlWriter::new(&path).unwrap().write_event(&json!({"n": 2})).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents.lines().count(), 2);
    }

    #[tokio::test]
    async fn test_backend_writes_typed_events() {
        #[derive(Serialize)]
        struct Event {
            author: &'static str,
        }

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("live.json");
        let mut writer = JsonlWriter::new(&path).unwrap();

        writer.write(&Event { author: "a" }).await.unwrap();
        WriterBackend::<Event>::flush(&mut writer).await.unwrap();

        assert_eq!(WriterBackend::<Event>::backend_type(&writer), "JSONL");
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "{\"author\":\"a\"}\n");
    }
}
