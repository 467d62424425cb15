pub mod layout;
pub mod renderer;
pub mod terminal;

pub use renderer::{format_rate, LogRenderer, RenderError, RenderSignal, SnapshotRenderer};
pub use terminal::Dashboard;
