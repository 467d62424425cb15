pub mod jsonl_writer;
pub mod reader;
pub mod sqlite_pragma;
pub mod sqlite_writer;
pub mod writer_backend;

pub use jsonl_writer::JsonlWriter;
pub use reader::JsonlPoller;
pub use sqlite_writer::{SqlRow, SqliteWriter};
pub use writer_backend::{WriterBackend, WriterError};
