//! mortflow - streaming mortality analytics demo
//!
//! A producer replays a regional mortality table into a JSONL file; the
//! consumer tails that file, folds each record into in-memory aggregates,
//! persists accepted records to SQLite and renders a live dashboard.

pub mod aggregator_core;
pub mod config;
pub mod consumer;
pub mod producer;
pub mod scheduler;
pub mod streamer_core;
pub mod ui;
