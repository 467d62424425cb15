//! Stream aggregator - folds validated records into windows, grouped stats and the high counter

use super::dedup::Deduplicator;
use super::detector::ThresholdMonitor;
use super::normalizer::MortalityRecord;
use super::stats::AggregateStore;
use super::window::{RollingWindow, WindowKey};
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IngestResult {
    pub accepted: bool,
    pub was_high: bool,
}

/// Point-in-time view for presentation
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Snapshot {
    pub by_gender_mean: BTreeMap<WindowKey, f64>,
    pub by_region_series: BTreeMap<WindowKey, Vec<f64>>,
    pub high_mortality_count: u64,
    pub threshold: f64,
    pub window_capacity: usize,
}

impl Snapshot {
    /// `(gender, mean)` pairs for one cause, sorted by gender
    pub fn gender_means_for(&self, cause: &str) -> Vec<(&str, f64)> {
        self.by_gender_mean
            .iter()
            .filter(|(key, _)| key.category == cause)
            .map(|(key, mean)| (key.dimension.as_str(), *mean))
            .collect()
    }

    /// `(region, series)` pairs for one cause, sorted by region
    pub fn region_series_for(&self, cause: &str) -> Vec<(&str, &[f64])> {
        self.by_region_series
            .iter()
            .filter(|(key, _)| key.category == cause)
            .map(|(key, series)| (key.dimension.as_str(), series.as_slice()))
            .collect()
    }
}

/// Single owner of all in-memory aggregate state.
///
/// Mutated only through `ingest`; safe to drop and rebuild from empty at any time.
#[derive(Debug)]
pub struct StreamAggregator {
    dedup: Deduplicator,
    windows: RollingWindow,
    by_region: AggregateStore,
    by_gender: AggregateStore,
    monitor: ThresholdMonitor,
    accepted_count: u64,
    duplicate_count: u64,
}

impl StreamAggregator {
    pub fn new(threshold: f64, window_capacity: usize) -> Self {
        Self {
            dedup: Deduplicator::new(),
            windows: RollingWindow::new(window_capacity),
            by_region: AggregateStore::new(),
            by_gender: AggregateStore::new(),
            monitor: ThresholdMonitor::new(threshold),
            accepted_count: 0,
            duplicate_count: 0,
        }
    }

    pub fn ingest(&mut self, record: &MortalityRecord) -> IngestResult {
        if !self.dedup.is_new(&record.identity()) {
            self.duplicate_count += 1;
            return IngestResult::default();
        }

        let region_key = WindowKey::new(record.cause.as_str(), record.region.as_str());
        let gender_key = WindowKey::new(record.cause.as_str(), record.sex.as_str());

        self.windows.append(region_key.clone(), record.rate);
        self.windows.append(gender_key.clone(), record.rate);

        self.by_region.update(region_key, record.rate);
        self.by_gender.update(gender_key, record.rate);

        let was_high = self.monitor.record_if_high(record.rate);
        self.accepted_count += 1;

        IngestResult {
            accepted: true,
            was_high,
        }
    }

    pub fn snapshot(&self) -> Snapshot {
        let by_gender_mean = self
            .by_gender
            .keys()
            .into_iter()
            .map(|key| {
                let mean = self.by_gender.mean(&key);
                (key, mean)
            })
            .collect();

        let by_region_series = self
            .by_region
            .keys()
            .into_iter()
            .map(|key| {
                let series = self.windows.snapshot(&key);
                (key, series)
            })
            .collect();

        Snapshot {
            by_gender_mean,
            by_region_series,
            high_mortality_count: self.monitor.count(),
            threshold: self.monitor.threshold(),
            window_capacity: self.windows.capacity(),
        }
    }

    pub fn windows(&self) -> &RollingWindow {
        &self.windows
    }

    pub fn by_region(&self) -> &AggregateStore {
        &self.by_region
    }

    pub fn by_gender(&self) -> &AggregateStore {
        &self.by_gender
    }

    pub fn monitor(&self) -> &ThresholdMonitor {
        &self.monitor
    }

    pub fn accepted_count(&self) -> u64 {
        self.accepted_count
    }

    pub fn duplicate_count(&self) -> u64 {
        self.duplicate_count
    }

    /// Distinct record identities remembered by the deduplicator
    pub fn seen_identities(&self) -> usize {
        self.dedup.len()
    }

    /// Distinct causes seen so far
    pub fn categories(&self) -> BTreeSet<String> {
        self.by_region
            .keys()
            .into_iter()
            .map(|key| key.category)
            .collect()
    }
}
