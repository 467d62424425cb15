//! Demo producer: replays the regional mortality CSV as a JSONL stream

pub mod generator;
pub mod loader;

pub use generator::{synthetic_timestamp, MessageGenerator, MortalityMessage, TIMESTAMP_FORMAT};
pub use loader::{load_rows, LoadError, MortalityRow};
