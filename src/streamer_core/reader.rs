//! Non-blocking JSONL poller with truncation and rotation detection
//!
//! Each `poll` returns whatever complete lines were appended since the last
//! call and never waits for more. A missing file is treated as "nothing new".

use std::fs::Metadata;
use std::io::{ErrorKind, SeekFrom};
use std::path::{Path, PathBuf};
use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncSeekExt};

#[cfg(unix)]
use std::os::unix::fs::MetadataExt;

pub struct JsonlPoller {
    path: PathBuf,
    offset: u64,
    inode: Option<u64>,
    partial: Vec<u8>,
}

impl JsonlPoller {
    /// Reads from the start of the file; already-seen records are the
    /// aggregator's job to drop.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            offset: 0,
            inode: None,
            partial: Vec::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Read every complete, non-empty line appended since the previous poll
    pub async fn poll(&mut self) -> std::io::Result<Vec<String>> {
        let metadata = match tokio::fs::metadata(&self.path).await {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                if self.offset > 0 {
                    log::info!("📭 Live file removed, waiting for it to reappear: {}", self.path.display());
                    self.reset();
                }
                return Ok(Vec::new());
            }
            Err(e) => return Err(e),
        };

        if self.detect_rotation(&metadata) {
            log::info!("🔄 File truncation or rotation detected, rereading: {}", self.path.display());
            self.reset();
        }

        #[cfg(unix)]
        {
            self.inode = Some(metadata.ino());
        }

        if metadata.len() == self.offset {
            return Ok(Vec::new());
        }

        let mut file = File::open(&self.path).await?;
        file.seek(SeekFrom::Start(self.offset)).await?;

        let mut chunk = Vec::new();
        let read = file.read_to_end(&mut chunk).await?;
        self.offset += read as u64;
        self.partial.extend_from_slice(&chunk);

        Ok(self.drain_complete_lines())
    }

    fn drain_complete_lines(&mut self) -> Vec<String> {
        let mut lines = Vec::new();

        while let Some(pos) = self.partial.iter().position(|b| *b == b'\n') {
            let raw: Vec<u8> = self.partial.drain(..=pos).collect();
            let line = String::from_utf8_lossy(&raw);
            let trimmed = line.trim();
            if !trimmed.is_empty() {
                lines.push(trimmed.to_string());
            }
        }

        lines
    }

    fn detect_rotation(&self, metadata: &Metadata) -> bool {
        if metadata.len() < self.offset {
            return true;
        }

        #[cfg(unix)]
        {
            if let Some(old) = self.inode {
                return old != metadata.ino();
            }
        }

        false
    }

    fn reset(&mut self) {
        self.offset = 0;
        self.inode = None;
        self.partial.clear();
    }
}
