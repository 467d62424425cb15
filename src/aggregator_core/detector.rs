//! High-mortality detection with a configurable threshold

pub const DEFAULT_HIGH_MORTALITY_THRESHOLD: f64 = 100.0;

#[derive(Debug)]
pub struct ThresholdMonitor {
    threshold: f64,
    high_count: u64,
}

impl ThresholdMonitor {
    pub fn new(threshold: f64) -> Self {
        Self {
            threshold,
            high_count: 0,
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(DEFAULT_HIGH_MORTALITY_THRESHOLD)
    }

    /// Inclusive: a rate equal to the threshold is high
    pub fn classify(&self, rate: f64) -> bool {
        rate >= self.threshold
    }

    pub fn record_if_high(&mut self, rate: f64) -> bool {
        if self.classify(rate) {
            self.high_count += 1;
            true
        } else {
            false
        }
    }

    pub fn count(&self) -> u64 {
        self.high_count
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }
}

impl Default for ThresholdMonitor {
    fn default() -> Self {
        Self::with_defaults()
    }
}
