use crate::aggregator_core::Snapshot;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("terminal error: {0}")]
    Io(#[from] std::io::Error),
}

/// What the render loop should do after a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderSignal {
    Continue,
    /// The user asked to quit
    Shutdown,
}

/// Presentation sink; pulls nothing itself, the scheduler hands it snapshots
pub trait SnapshotRenderer {
    fn render(&mut self, snapshot: &Snapshot) -> Result<RenderSignal, RenderError>;

    /// Renderer name for logging
    fn name(&self) -> &'static str;
}

/// Format a mortality rate for display
pub fn format_rate(rate: f64) -> String {
    format!("{:.1}", rate)
}

/// Headless renderer: one log line per snapshot for the focus cause
pub struct LogRenderer {
    focus_cause: String,
}

impl LogRenderer {
    pub fn new(focus_cause: impl Into<String>) -> Self {
        Self {
            focus_cause: focus_cause.into(),
        }
    }

    pub fn summarize(&self, snapshot: &Snapshot) -> String {
        let genders: Vec<String> = snapshot
            .gender_means_for(&self.focus_cause)
            .into_iter()
            .map(|(gender, mean)| format!("{}={}", gender, format_rate(mean)))
            .collect();

        let regions: Vec<String> = snapshot
            .region_series_for(&self.focus_cause)
            .into_iter()
            .filter_map(|(region, series)| {
                series
                    .last()
                    .map(|latest| format!("{}={}", region, format_rate(*latest)))
            })
            .collect();

        format!(
            "{} | mean by gender [{}] | latest by region [{}] | high mortality events (rate ≥ {}): {}",
            self.focus_cause,
            genders.join(", "),
            regions.join(", "),
            snapshot.threshold,
            snapshot.high_mortality_count
        )
    }
}

impl SnapshotRenderer for LogRenderer {
    fn render(&mut self, snapshot: &Snapshot) -> Result<RenderSignal, RenderError> {
        log::info!("📈 {}", self.summarize(snapshot));
        Ok(RenderSignal::Continue)
    }

    fn name(&self) -> &'static str {
        "log"
    }
}
