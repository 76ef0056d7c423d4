//! Exponential-histogram bucketed window: an ordered list of sealed buckets
//! (each owning its own FPTree) plus one pending bucket, shaped so that
//! bucket sizes form a non-increasing sequence of powers of two with no more
//! than `merge_threshold` consecutive buckets of the same size.

use crate::fptree::FPTree;
use crate::item::Item;

struct Bucket {
    tree: FPTree,
    size: u64,
}

/// Exponential-histogram window of per-bucket FPTrees.
pub struct AdaptiveWindow {
    bucket_capacity: u64,
    merge_threshold: usize,
    buckets: Vec<Bucket>,
    pending: FPTree,
    pending_count: u64,
}

impl AdaptiveWindow {
    pub fn new(bucket_capacity: u64, merge_threshold: usize) -> Self {
        assert!(bucket_capacity > 0, "bucket_capacity must be positive");
        AdaptiveWindow {
            bucket_capacity,
            merge_threshold,
            buckets: Vec::new(),
            pending: FPTree::new(),
            pending_count: 0,
        }
    }

    /// Sealed bucket sizes, oldest to newest.
    pub fn bucket_sizes(&self) -> Vec<u64> {
        self.buckets.iter().map(|b| b.size).collect()
    }

    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// Random access to a sealed bucket's tree by index (0 = oldest).
    pub fn bucket_tree(&self, index: usize) -> &FPTree {
        &self.buckets[index].tree
    }

    /// Slice-assignment to an empty list truncates the window.
    pub fn truncate(&mut self) {
        self.buckets.clear();
        self.pending = FPTree::new();
        self.pending_count = 0;
    }

    pub fn push(&mut self, transaction: &[Item]) {
        self.pending.insert(transaction, 1);
        self.pending_count += 1;
        if self.pending_count == self.bucket_capacity {
            let sealed = std::mem::replace(&mut self.pending, FPTree::new());
            self.buckets.push(Bucket {
                tree: sealed,
                size: self.bucket_capacity,
            });
            self.pending_count = 0;
            self.enforce_shape();
        }
    }

    /// Repeatedly merge the two oldest buckets of any run whose length
    /// exceeds `merge_threshold`, until no run violates it.
    fn enforce_shape(&mut self) {
        loop {
            let violation = self.first_violating_run();
            match violation {
                Some(start) => self.merge_at(start),
                None => break,
            }
        }
    }

    /// Index of the first bucket in the first offending (too-long) run of
    /// equal sizes, scanning oldest to newest.
    fn first_violating_run(&self) -> Option<usize> {
        let mut i = 0;
        while i < self.buckets.len() {
            let mut j = i;
            while j + 1 < self.buckets.len() && self.buckets[j + 1].size == self.buckets[i].size {
                j += 1;
            }
            let run_len = j - i + 1;
            if run_len > self.merge_threshold {
                return Some(i);
            }
            i = j + 1;
        }
        None
    }

    /// Merge `buckets[start]` and `buckets[start+1]` (the two oldest in a
    /// violating run) into a single bucket of doubled size, re-sorting the
    /// combined tree under the combined item-count.
    fn merge_at(&mut self, start: usize) {
        let older = self.buckets.remove(start);
        let mut newer = self.buckets.remove(start);
        for (path, count) in older.tree.iter_paths() {
            if count > 0 {
                newer.tree.insert(&path, count);
            }
        }
        newer.tree.sort();
        newer.size += older.size;
        self.buckets.insert(start, newer);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::Interner;

    #[test]
    fn exponential_histogram_shape_matches_scenario() {
        let mut interner = Interner::new();
        let a = interner.intern("a");
        let mut window = AdaptiveWindow::new(2, 2);

        let mut observed = Vec::new();
        for _ in 0..8 {
            window.push(&[a]);
            observed.push(window.bucket_sizes());
        }

        let expected: Vec<Vec<u64>> = vec![
            vec![],
            vec![2],
            vec![2],
            vec![2, 2],
            vec![2, 2],
            vec![4, 2],
            vec![4, 2],
            vec![4, 2, 2],
        ];
        assert_eq!(observed, expected);
    }

    #[test]
    fn never_exceeds_merge_threshold_run_length() {
        let mut interner = Interner::new();
        let a = interner.intern("a");
        let k = 3;
        let mut window = AdaptiveWindow::new(1, k);
        for _ in 0..40 {
            window.push(&[a]);
            let sizes = window.bucket_sizes();
            let mut i = 0;
            while i < sizes.len() {
                let mut j = i;
                while j + 1 < sizes.len() && sizes[j + 1] == sizes[i] {
                    j += 1;
                }
                assert!(j - i + 1 <= k, "run of equal-sized buckets exceeded merge_threshold");
                i = j + 1;
            }
        }
    }
}
