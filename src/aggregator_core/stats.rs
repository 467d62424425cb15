//! Running sum/count statistics grouped by `WindowKey`

use super::window::WindowKey;
use std::collections::{BTreeSet, HashMap};

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RunningStat {
    pub sum: f64,
    pub count: u64,
}

impl RunningStat {
    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.sum / self.count as f64
        }
    }
}

/// Grouped running statistics. Entries only ever grow; nothing is evicted.
#[derive(Debug, Default)]
pub struct AggregateStore {
    groups: HashMap<WindowKey, RunningStat>,
}

impl AggregateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, key: WindowKey, value: f64) {
        let stat = self.groups.entry(key).or_default();
        stat.sum += value;
        stat.count += 1;
    }

    /// Mean for `key`, 0.0 when nothing has been recorded
    pub fn mean(&self, key: &WindowKey) -> f64 {
        self.groups.get(key).map_or(0.0, RunningStat::mean)
    }

    pub fn count(&self, key: &WindowKey) -> u64 {
        self.groups.get(key).map_or(0, |stat| stat.count)
    }

    pub fn sum(&self, key: &WindowKey) -> f64 {
        self.groups.get(key).map_or(0.0, |stat| stat.sum)
    }

    pub fn keys(&self) -> BTreeSet<WindowKey> {
        self.groups.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean_of_unknown_key_is_zero() {
        let store = AggregateStore::new();
        let key = WindowKey::new("Heart disease", "Male");
        assert_eq!(store.mean(&key), 0.0);
        assert_eq!(store.count(&key), 0);
    }

    #[test]
    fn test_mean_matches_arithmetic_mean() {
        let mut store = AggregateStore::new();
        let key = WindowKey::new("Cancer", "HHS Region 04");
        let rates = [188.2, 150.0, 97.5, 210.25, 3.0];
        for rate in rates {
            store.update(key.clone(), rate);
        }

        let expected = rates.iter().sum::<f64>() / rates.len() as f64;
        assert!((store.mean(&key) - expected).abs() < 1e-9);
        assert_eq!(store.count(&key), 5);
        assert!((store.sum(&key) - rates.iter().sum::<f64>()).abs() < 1e-9);
    }

    #[test]
    fn test_keys_sorted_and_deduplicated() {
        let mut store = AggregateStore::new();
        store.update(WindowKey::new("Heart disease", "Male"), 1.0);
        store.update(WindowKey::new("Heart disease", "Female"), 2.0);
        store.update(WindowKey::new("Heart disease", "Male"), 3.0);

        let keys: Vec<WindowKey> = store.keys().into_iter().collect();
        assert_eq!(
            keys,
            vec![
                WindowKey::new("Heart disease", "Female"),
                WindowKey::new("Heart disease", "Male"),
            ]
        );
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_running_stat_default_mean() {
        assert_eq!(RunningStat::default().mean(), 0.0);
    }
}
