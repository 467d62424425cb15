//! Aggregator Core - incremental rolling metrics over the mortality event stream
//!
//! # Architecture
//!
//! ```text
//! JSONL line → MortalityRecord::from_jsonl (validation + coercion)
//!     ↓
//! StreamAggregator::ingest
//!     ├── Deduplicator (author + timestamp identity)
//!     ├── RollingWindow (last N rates per (cause, region) and (cause, sex))
//!     ├── AggregateStore ×2 (running mean by region, by gender)
//!     └── ThresholdMonitor (high mortality counter)
//!     ↓
//! Snapshot → renderer
//! ```
//!
//! Nothing in this module performs I/O.

pub mod aggregator;
pub mod dedup;
pub mod detector;
pub mod normalizer;
pub mod stats;
pub mod window;

pub use aggregator::{IngestResult, Snapshot, StreamAggregator};
pub use dedup::Deduplicator;
pub use detector::{ThresholdMonitor, DEFAULT_HIGH_MORTALITY_THRESHOLD};
pub use normalizer::{ExtractError, MortalityRecord};
pub use stats::{AggregateStore, RunningStat};
pub use window::{RollingWindow, WindowKey, DEFAULT_WINDOW_CAPACITY};
