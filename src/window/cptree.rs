//! CP-tree: a single FPTree paired with a fixed-size sliding-window FIFO,
//! periodically resorted under refreshed item frequencies.

use crate::fptree::FPTree;
use crate::item::Item;
use crate::mining::fpgrowth;
use ahash::AHashMap;
use std::collections::VecDeque;

/// One mining yield at a window boundary.
pub struct WindowMining {
    pub window_start: u64,
    pub window_length: usize,
    pub itemsets: Vec<Vec<Item>>,
    pub supports: AHashMap<Vec<Item>, f64>,
}

pub struct CpTreeMiner {
    tree: FPTree,
    window: VecDeque<Vec<Item>>,
    window_size: usize,
    frequency: Option<AHashMap<Item, u64>>,
    sort_interval: usize,
    since_last_sort: usize,
    total_pushed: u64,
    min_support: f64,
}

impl CpTreeMiner {
    pub fn new(window_size: usize, sort_interval: usize, min_support: f64) -> Self {
        CpTreeMiner {
            tree: FPTree::new(),
            window: VecDeque::with_capacity(window_size),
            window_size,
            frequency: None,
            sort_interval,
            since_last_sort: 0,
            total_pushed: 0,
            min_support,
        }
    }

    fn sort_transaction(raw: &[Item], frequency: &Option<AHashMap<Item, u64>>) -> Vec<Item> {
        match frequency {
            Some(freq) => {
                let mut v = raw.to_vec();
                v.sort_by(|a, b| {
                    let ca = freq.get(a).copied().unwrap_or(0);
                    let cb = freq.get(b).copied().unwrap_or(0);
                    cb.cmp(&ca).then_with(|| a.cmp(b))
                });
                v
            }
            // Deterministic default ordering before any resort has happened.
            None => {
                let mut v = raw.to_vec();
                v.sort();
                v
            }
        }
    }

    fn snapshot_frequency(tree: &FPTree) -> AHashMap<Item, u64> {
        tree.header_items().map(|i| (i, tree.item_count(i))).collect()
    }

    /// Insert `raw` (an already-deduplicated transaction). Returns a mining
    /// yield whenever `raw` lands on a window boundary.
    pub fn push(&mut self, raw: &[Item]) -> Option<WindowMining> {
        let sorted = Self::sort_transaction(raw, &self.frequency);
        self.tree.insert(&sorted, 1);
        self.window.push_back(sorted);

        let mut just_sorted = false;

        if self.window.len() > self.window_size {
            let old = self.window.pop_front().unwrap();
            self.tree.remove(&old, 1);
        }

        self.since_last_sort += 1;
        if self.since_last_sort >= self.sort_interval {
            self.tree.sort();
            self.frequency = Some(Self::snapshot_frequency(&self.tree));
            self.since_last_sort = 0;
            just_sorted = true;
        }

        self.total_pushed += 1;
        if self.window_size > 0 && self.total_pushed % self.window_size as u64 == 0 {
            if !just_sorted {
                self.tree.sort();
                self.frequency = Some(Self::snapshot_frequency(&self.tree));
            }
            let result = fpgrowth::mine(&self.tree, self.min_support, false);
            let n = result.n_transactions.max(1) as f64;
            let supports = result
                .itemset_counts
                .iter()
                .map(|(k, &v)| (k.clone(), v as f64 / n))
                .collect();
            let window_start = self.total_pushed - self.window_size as u64;
            return Some(WindowMining {
                window_start,
                window_length: self.window.len(),
                itemsets: result.itemsets,
                supports,
            });
        }
        None
    }
}
