//! Local-cut change detection: a lightweight, non-rule-based companion to
//! the main CDTDS pipeline that scans a fixed-size sliding window of recent
//! per-transaction item counters for a clean split between two internally
//! coherent halves.
//!
//! This does not replace [`crate::drift`]'s rule-based detectors; it is a
//! cheaper first-pass signal over raw item-count drift, independent of any
//! mined rule set.

use crate::item::Item;
use ahash::{AHashMap, AHashSet};

#[derive(Debug, Clone, Copy)]
pub struct LocalCutConfig {
    /// Size of the sliding window of recent transactions scanned for a cut.
    pub window_len: usize,
    /// Minimum number of items whose count must diverge past the threshold
    /// before a candidate cut is accepted.
    pub merge_threshold: usize,
    /// Minimum length of either side of a candidate cut within the window.
    pub min_cut_len: usize,
    /// Fraction of `window_len` an item's before/after count must differ by
    /// to count as diverging.
    pub local_cut_confidence: f64,
}

pub struct LocalCutDetector {
    config: LocalCutConfig,
    buckets: Vec<AHashMap<Item, u64>>,
    last_emitted_at: Option<usize>,
}

impl LocalCutDetector {
    pub fn new(config: LocalCutConfig) -> Self {
        LocalCutDetector {
            config,
            buckets: Vec::new(),
            last_emitted_at: None,
        }
    }

    /// Feed one transaction. Returns the absolute transaction index of a
    /// detected cut, at most once per `window_len`-sized span.
    pub fn push(&mut self, transaction: &[Item]) -> Option<usize> {
        let mut counter = AHashMap::new();
        for &item in transaction {
            *counter.entry(item).or_insert(0) += 1;
        }
        self.buckets.push(counter);
        let current_index = self.buckets.len() - 1;

        if self.buckets.len() < self.config.window_len {
            return None;
        }

        let cut = self.find_local_drift()?;

        if let Some(last) = self.last_emitted_at {
            if current_index.saturating_sub(last) < self.config.window_len {
                return None;
            }
        }
        self.last_emitted_at = Some(current_index);
        Some(cut)
    }

    fn find_local_drift(&self) -> Option<usize> {
        let n = self.buckets.len();
        let start = n - self.config.window_len;
        let window = &self.buckets[start..];
        let threshold = self.config.local_cut_confidence * self.config.window_len as f64;

        for cut in self.config.min_cut_len..=window.len().saturating_sub(self.config.min_cut_len) {
            let before = Self::merge(&window[..cut]);
            let after = Self::merge(&window[cut..]);

            let mut items: AHashSet<Item> = AHashSet::new();
            items.extend(before.keys());
            items.extend(after.keys());

            let diverging = items
                .iter()
                .filter(|item| {
                    let b = *before.get(item).unwrap_or(&0) as f64;
                    let a = *after.get(item).unwrap_or(&0) as f64;
                    (a - b).abs() > threshold
                })
                .count();

            if diverging >= self.config.merge_threshold {
                return Some(n - 1);
            }
        }
        None
    }

    fn merge(buckets: &[AHashMap<Item, u64>]) -> AHashMap<Item, u64> {
        let mut total = AHashMap::new();
        for bucket in buckets {
            for (&item, &count) in bucket {
                *total.entry(item).or_insert(0) += count;
            }
        }
        total
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::Interner;

    /// Feeds 10 transactions of `[a, b, c]` followed by 10 of `[d, e, f]`,
    /// disjoint items, and checks that exactly one cut is signalled inside
    /// the transition region.
    #[test]
    fn disjoint_item_shift_signals_exactly_one_cut() {
        let mut interner = Interner::new();
        let abc: Vec<Item> = ["a", "b", "c"].iter().map(|n| interner.intern(n)).collect();
        let def: Vec<Item> = ["d", "e", "f"].iter().map(|n| interner.intern(n)).collect();

        let config = LocalCutConfig {
            window_len: 5,
            merge_threshold: 2,
            min_cut_len: 2,
            local_cut_confidence: 0.05,
        };
        let mut detector = LocalCutDetector::new(config);

        let mut signals = Vec::new();
        for _ in 0..10 {
            if let Some(idx) = detector.push(&abc) {
                signals.push(idx);
            }
        }
        for _ in 0..10 {
            if let Some(idx) = detector.push(&def) {
                signals.push(idx);
            }
        }

        assert_eq!(signals.len(), 1, "expected exactly one cut signal, got {signals:?}");
    }
}
