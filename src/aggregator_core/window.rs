//! Fixed-capacity rolling windows of recent rates per composite key

use std::collections::{BTreeSet, HashMap, VecDeque};
use std::fmt;

pub const DEFAULT_WINDOW_CAPACITY: usize = 20;

/// Composite key `(category, dimension)`, e.g. `("Heart disease", "HHS Region 01")`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WindowKey {
    pub category: String,
    pub dimension: String,
}

impl WindowKey {
    pub fn new(category: impl Into<String>, dimension: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            dimension: dimension.into(),
        }
    }
}

impl fmt::Display for WindowKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.category, self.dimension)
    }
}

/// Ring buffers keyed by `WindowKey`; the oldest value is dropped once a
/// buffer holds `capacity` values.
#[derive(Debug)]
pub struct RollingWindow {
    capacity: usize,
    buffers: HashMap<WindowKey, VecDeque<f64>>,
}

impl RollingWindow {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            buffers: HashMap::new(),
        }
    }

    pub fn append(&mut self, key: WindowKey, value: f64) {
        let capacity = self.capacity;
        let buffer = self
            .buffers
            .entry(key)
            .or_insert_with(|| VecDeque::with_capacity(capacity));

        while buffer.len() >= capacity {
            buffer.pop_front();
        }
        buffer.push_back(value);
    }

    /// Current contents oldest first; empty for unknown keys
    pub fn snapshot(&self, key: &WindowKey) -> Vec<f64> {
        self.buffers
            .get(key)
            .map(|buffer| buffer.iter().copied().collect())
            .unwrap_or_default()
    }

    pub fn len(&self, key: &WindowKey) -> usize {
        self.buffers.get(key).map_or(0, VecDeque::len)
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn keys(&self) -> BTreeSet<WindowKey> {
        self.buffers.keys().cloned().collect()
    }
}

impl Default for RollingWindow {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn heart(dimension: &str) -> WindowKey {
        WindowKey::new("Heart disease", dimension)
    }

    #[test]
    fn test_snapshot_unknown_key_is_empty() {
        let window = RollingWindow::default();
        assert!(window.snapshot(&heart("Male")).is_empty());
        assert_eq!(window.len(&heart("Male")), 0);
    }

    #[test]
    fn test_append_preserves_arrival_order() {
        let mut window = RollingWindow::new(5);
        window.append(heart("HHS Region 01"), 3.0);
        window.append(heart("HHS Region 01"), 1.0);
        window.append(heart("HHS Region 01"), 2.0);

        assert_eq!(window.snapshot(&heart("HHS Region 01")), vec![3.0, 1.0, 2.0]);
    }

    #[test]
    fn test_capacity_evicts_oldest() {
        let mut window = RollingWindow::new(DEFAULT_WINDOW_CAPACITY);
        let values: Vec<f64> = (0..25).map(|i| i as f64).collect();
        for value in &values {
            window.append(heart("HHS Region 02"), *value);
        }

        let snapshot = window.snapshot(&heart("HHS Region 02"));
        assert_eq!(snapshot.len(), 20);
        assert_eq!(snapshot, values[5..25].to_vec());
    }

    #[test]
    fn test_capacity_plus_one_drops_first() {
        let mut window = RollingWindow::new(3);
        for value in [10.0, 20.0, 30.0, 40.0] {
            window.append(heart("Female"), value);
        }
        assert_eq!(window.snapshot(&heart("Female")), vec![20.0, 30.0, 40.0]);
    }

    #[test]
    fn test_keys_are_independent() {
        let mut window = RollingWindow::new(2);
        window.append(heart("Male"), 1.0);
        window.append(heart("Female"), 2.0);
        window.append(WindowKey::new("Cancer", "Male"), 3.0);

        assert_eq!(window.snapshot(&heart("Male")), vec![1.0]);
        assert_eq!(window.keys().len(), 3);
    }

    #[test]
    fn test_zero_capacity_clamped() {
        let mut window = RollingWindow::new(0);
        window.append(heart("Male"), 1.0);
        window.append(heart("Male"), 2.0);
        assert_eq!(window.capacity(), 1);
        assert_eq!(window.snapshot(&heart("Male")), vec![2.0]);
    }
}
