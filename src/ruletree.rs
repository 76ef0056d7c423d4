//! Dual-prefix index over a fixed rule set: counts, per transaction, how
//! often each `(antecedent, consequent-item)` pair is satisfied.

use crate::item::Item;
use crate::mining::rules::AssociationRule;
use ahash::{AHashMap, AHashSet};
use std::collections::VecDeque;

#[derive(Debug, Clone, Default)]
struct Node {
    /// next antecedent item -> child node.
    children: AHashMap<Item, Node>,
    /// consequent items attached at this antecedent prefix.
    consequents: AHashSet<Item>,
}

/// A two-layer prefix index over rules: the antecedent spine, plus a
/// consequent-item set at each antecedent node, plus per-(antecedent,
/// consequent) match counters.
#[derive(Debug, Clone)]
pub struct RuleTree {
    root: Node,
    counters: AHashMap<(Vec<Item>, Item), u64>,
    rag_bag_count: u64,
    transaction_count: u64,
    /// sliding-window FIFO of recently recorded transactions, if bounded.
    window: Option<VecDeque<Vec<Item>>>,
    window_size: usize,
}

impl RuleTree {
    /// Build a fresh tree over `rules`. Each rule's antecedent is sorted
    /// under `Item`'s canonical order before being inserted down the spine;
    /// a multi-item consequent is decomposed into one consequent-set entry
    /// (and one counter) per consequent item.
    pub fn build(rules: &[AssociationRule]) -> Self {
        let mut tree = RuleTree {
            root: Node::default(),
            counters: AHashMap::new(),
            rag_bag_count: 0,
            transaction_count: 0,
            window: None,
            window_size: 0,
        };
        for rule in rules {
            let mut antecedent = rule.antecedent.clone();
            antecedent.sort();
            let mut node = &mut tree.root;
            for &item in &antecedent {
                node = node.children.entry(item).or_default();
            }
            for &cons in &rule.consequent {
                node.consequents.insert(cons);
                tree.counters.entry((antecedent.clone(), cons)).or_insert(0);
            }
        }
        tree
    }

    /// Enable a sliding-window FIFO of `size` recent transactions; once it
    /// overflows, the oldest transaction is replayed through
    /// [`RuleTree::remove_matches`].
    pub fn with_window(mut self, size: usize) -> Self {
        self.window = Some(VecDeque::with_capacity(size));
        self.window_size = size;
        self
    }

    /// Deep-copy the antecedent/consequent topology of `self` but zero all
    /// counters and the window contents — the "clone topology, reset
    /// counters" constructor used to derive a test tree from a training
    /// tree.
    pub fn clone_topology_reset_counters(&self) -> Self {
        let mut counters = AHashMap::new();
        for key in self.counters.keys() {
            counters.insert(key.clone(), 0);
        }
        RuleTree {
            root: self.root.clone(),
            counters,
            rag_bag_count: 0,
            transaction_count: 0,
            window: self.window.as_ref().map(|_| VecDeque::with_capacity(self.window_size)),
            window_size: self.window_size,
        }
    }

    /// Fold another tree's counters into `self`, assuming both share the
    /// same rule topology (e.g. both built from the same rule set). Used
    /// by the block-based drift detector to absorb one block into another.
    pub fn absorb(&mut self, other: &RuleTree) {
        for (key, &count) in &other.counters {
            *self.counters.entry(key.clone()).or_insert(0) += count;
        }
        self.rag_bag_count += other.rag_bag_count;
        self.transaction_count += other.transaction_count;
    }

    pub fn transaction_count(&self) -> u64 {
        self.transaction_count
    }

    pub fn rag_bag_count(&self) -> u64 {
        self.rag_bag_count
    }

    /// Record `transaction` (assumed already deduplicated); items are
    /// internally sorted by canonical order before matching.
    pub fn record_matches(&mut self, transaction: &[Item]) {
        let mut sorted = transaction.to_vec();
        sorted.sort();
        let hit = Self::apply(&self.root, &sorted, &mut self.counters, 1);
        if hit {
            // rule_miss_rate's complement; nothing else to do.
        } else {
            self.rag_bag_count += 1;
        }
        self.transaction_count += 1;

        if self.window.is_some() {
            let ejected = {
                let window = self.window.as_mut().unwrap();
                window.push_back(sorted);
                if window.len() > self.window_size {
                    window.pop_front()
                } else {
                    None
                }
            };
            if let Some(old) = ejected {
                self.remove_matches_sorted(&old);
            }
        }
    }

    /// Symmetric to `record_matches`, used to eject a transaction from the
    /// window: decrements the same counters it had previously incremented.
    pub fn remove_matches(&mut self, transaction: &[Item]) {
        let mut sorted = transaction.to_vec();
        sorted.sort();
        self.remove_matches_sorted(&sorted);
    }

    fn remove_matches_sorted(&mut self, sorted: &[Item]) {
        let hit = Self::apply(&self.root, sorted, &mut self.counters, -1);
        if !hit {
            self.rag_bag_count = self.rag_bag_count.saturating_sub(1);
        }
        self.transaction_count = self.transaction_count.saturating_sub(1);
    }

    /// For every start position in `sorted`, walk forward skipping items
    /// that don't extend the current antecedent node, checking consequent
    /// membership at every step. Returns whether any consequent matched.
    fn apply(
        root: &Node,
        sorted: &[Item],
        counters: &mut AHashMap<(Vec<Item>, Item), u64>,
        delta: i64,
    ) -> bool {
        let mut any_match = false;
        for start in 0..sorted.len() {
            let mut node = root;
            let mut antecedent = Vec::new();
            for &item in &sorted[start..] {
                if node.consequents.contains(&item) {
                    let key = (antecedent.clone(), item);
                    let entry = counters.entry(key).or_insert(0);
                    if delta >= 0 {
                        *entry += delta as u64;
                    } else {
                        *entry = entry.saturating_sub((-delta) as u64);
                    }
                    any_match = true;
                }
                if let Some(child) = node.children.get(&item) {
                    node = child;
                    antecedent.push(item);
                }
            }
        }
        any_match
    }

    /// Rule-match counts normalized by `transaction_count`, in a
    /// deterministic `(antecedent, consequent)` key order.
    pub fn match_vector(&self) -> Vec<((Vec<Item>, Item), f64)> {
        if self.transaction_count == 0 {
            return Vec::new();
        }
        let mut keys: Vec<&(Vec<Item>, Item)> = self.counters.keys().collect();
        keys.sort();
        keys.into_iter()
            .map(|k| {
                let count = self.counters[k];
                (k.clone(), count as f64 / self.transaction_count as f64)
            })
            .collect()
    }

    pub fn rag_bag(&self) -> f64 {
        if self.transaction_count == 0 {
            return 0.0;
        }
        self.rag_bag_count as f64 / self.transaction_count as f64
    }

    pub fn rule_miss_rate(&self) -> f64 {
        if self.transaction_count == 0 {
            return 0.0;
        }
        (self.transaction_count - self.rag_bag_count) as f64 / self.transaction_count as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::Interner;

    fn rule(a: &[Item], c: &[Item]) -> AssociationRule {
        AssociationRule {
            antecedent: a.to_vec(),
            consequent: c.to_vec(),
            confidence: 1.0,
            lift: 1.0,
            support: 1.0,
        }
    }

    #[test]
    fn single_rule_matches_and_counts() {
        let mut interner = Interner::new();
        let a = interner.intern("a");
        let b = interner.intern("b");
        let c = interner.intern("c");
        let rules = vec![rule(&[a, b], &[c])];
        let mut tree = RuleTree::build(&rules);

        tree.record_matches(&[a, b, c]);
        tree.record_matches(&[a, b]);
        tree.record_matches(&[a]);

        assert_eq!(tree.transaction_count(), 3);
        assert_eq!(tree.rag_bag_count(), 2);
        let mv = tree.match_vector();
        assert_eq!(mv.len(), 1);
        assert!((mv[0].1 - (1.0 / 3.0)).abs() < 1e-9);
    }

    #[test]
    fn clone_topology_reset_counters_zeroes_state() {
        let mut interner = Interner::new();
        let a = interner.intern("a");
        let c = interner.intern("c");
        let rules = vec![rule(&[a], &[c])];
        let mut training = RuleTree::build(&rules);
        training.record_matches(&[a, c]);
        assert_eq!(training.transaction_count(), 1);

        let test_tree = training.clone_topology_reset_counters();
        assert_eq!(test_tree.transaction_count(), 0);
        assert_eq!(test_tree.rag_bag_count(), 0);
        assert_eq!(test_tree.match_vector().len(), 0);
    }

    #[test]
    fn sliding_window_ejects_oldest_transaction() {
        let mut interner = Interner::new();
        let a = interner.intern("a");
        let c = interner.intern("c");
        let rules = vec![rule(&[a], &[c])];
        let mut tree = RuleTree::build(&rules).with_window(2);

        tree.record_matches(&[a, c]);
        tree.record_matches(&[a]);
        tree.record_matches(&[a]); // ejects the first [a, c]

        assert_eq!(tree.transaction_count(), 2);
    }
}
