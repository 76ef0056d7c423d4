//! Apriori + inverted-index baseline miner, used as a test oracle for
//! FP-Growth rather than as a production mining path.

use crate::item::{Item, ItemSet};
use ahash::{AHashMap, AHashSet};

/// item -> set of transaction indices containing it.
pub struct InvertedIndex {
    postings: AHashMap<Item, AHashSet<usize>>,
    n: usize,
}

impl InvertedIndex {
    pub fn build(transactions: &[Vec<Item>]) -> Self {
        let mut postings: AHashMap<Item, AHashSet<usize>> = AHashMap::new();
        for (idx, tx) in transactions.iter().enumerate() {
            for &item in tx {
                postings.entry(item).or_default().insert(idx);
            }
        }
        InvertedIndex {
            postings,
            n: transactions.len(),
        }
    }

    /// support(set) = |intersection of posting lists| / n
    pub fn support(&self, set: &[Item]) -> f64 {
        if self.n == 0 || set.is_empty() {
            return 0.0;
        }
        let mut lists: Vec<&AHashSet<usize>> = Vec::with_capacity(set.len());
        for item in set {
            match self.postings.get(item) {
                Some(l) => lists.push(l),
                None => return 0.0,
            }
        }
        lists.sort_by_key(|l| l.len());
        let mut iter = lists.into_iter();
        let mut acc: AHashSet<usize> = iter.next().unwrap().clone();
        for list in iter {
            acc.retain(|idx| list.contains(idx));
        }
        acc.len() as f64 / self.n as f64
    }
}

/// Classic level-wise Apriori: candidates at level k are unions of two
/// level-(k-1) frequent sets that differ in exactly one item, filtered by
/// the requirement that every (k-1)-subset already be frequent.
pub fn mine(transactions: &[Vec<Item>], min_support: f64) -> Vec<(Vec<Item>, f64)> {
    let index = InvertedIndex::build(transactions);
    let n = transactions.len();
    if n == 0 {
        return Vec::new();
    }

    let mut singles: AHashSet<Item> = AHashSet::new();
    for tx in transactions {
        for &item in tx {
            singles.insert(item);
        }
    }

    let mut level: Vec<ItemSet> = singles
        .into_iter()
        .map(|i| ItemSet::from_items(vec![i]))
        .filter(|s| index.support(s.as_slice()) >= min_support - f64::EPSILON)
        .collect();

    let mut frequent: Vec<(Vec<Item>, f64)> = level
        .iter()
        .map(|s| (s.as_slice().to_vec(), index.support(s.as_slice())))
        .collect();

    while !level.is_empty() {
        let known: AHashSet<Vec<Item>> = level.iter().map(|s| s.as_slice().to_vec()).collect();
        let mut candidates: AHashSet<Vec<Item>> = AHashSet::new();

        for i in 0..level.len() {
            for j in (i + 1)..level.len() {
                if let Some(merged) = join_if_compatible(&level[i], &level[j]) {
                    if all_subsets_frequent(&merged, &known) {
                        candidates.insert(merged);
                    }
                }
            }
        }

        let mut next_level = Vec::new();
        for cand in candidates {
            let support = index.support(&cand);
            if support >= min_support - f64::EPSILON {
                next_level.push(ItemSet::from_items(cand.clone()));
                frequent.push((cand, support));
            }
        }
        level = next_level;
    }

    frequent
}

fn join_if_compatible(a: &ItemSet, b: &ItemSet) -> Option<Vec<Item>> {
    let merged = ItemSet::from_items(a.iter().copied().chain(b.iter().copied()));
    if merged.len() == a.len() + 1 {
        Some(merged.as_slice().to_vec())
    } else {
        None
    }
}

fn all_subsets_frequent(set: &[Item], known: &AHashSet<Vec<Item>>) -> bool {
    let n = set.len();
    if n <= 1 {
        return true;
    }
    for skip in 0..n {
        let subset: Vec<Item> = set
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != skip)
            .map(|(_, &it)| it)
            .collect();
        if !known.contains(&subset) {
            return false;
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::Interner;

    fn tx(interner: &mut Interner, names: &[&str]) -> Vec<Item> {
        names.iter().map(|n| interner.intern(n)).collect()
    }

    #[test]
    fn support_matches_expected_scenario() {
        let mut interner = Interner::new();
        let transactions = vec![
            tx(&mut interner, &["a", "b", "c", "d", "e", "f"]),
            tx(&mut interner, &["g", "h", "i", "j", "k", "l"]),
            tx(&mut interner, &["z", "x"]),
            tx(&mut interner, &["z", "x"]),
            tx(&mut interner, &["z", "x", "y"]),
            tx(&mut interner, &["z", "x", "y", "i"]),
        ];
        let index = InvertedIndex::build(&transactions);

        let z = interner.intern("z");
        let x = interner.intern("x");
        let y = interner.intern("y");
        let i = interner.intern("i");

        assert!((index.support(&[z, x, y]) - 2.0 / 6.0).abs() < 1e-9);
        assert!((index.support(&[i]) - 2.0 / 6.0).abs() < 1e-9);
        assert!((index.support(&[z, x]) - 4.0 / 6.0).abs() < 1e-9);
    }

    #[test]
    fn apriori_matches_fp_growth_on_golden_example() {
        let mut interner = Interner::new();
        let raw: [&[&str]; 10] = [
            &["a", "b", "c", "d"],
            &["a", "b", "c", "d", "e"],
            &["a", "b", "d"],
            &["a", "c", "d", "e"],
            &["b", "c", "d"],
            &["b", "d", "e"],
            &["a", "b", "c"],
            &["a", "c", "d"],
            &["a", "b", "d", "e"],
            &["c", "d", "e"],
        ];
        let transactions: Vec<Vec<Item>> = raw.iter().map(|r| tx(&mut interner, r)).collect();

        let mut tree = crate::fptree::FPTree::new();
        for t in &transactions {
            tree.insert(t, 1);
        }
        tree.sort();
        let fp_result = super::super::fpgrowth::mine(&tree, 0.2, false);

        let apriori_result = mine(&transactions, 0.2);

        let norm = |v: &Vec<Item>| {
            let mut v = v.clone();
            v.sort();
            v
        };
        let fp_sets: std::collections::HashSet<Vec<Item>> =
            fp_result.itemsets.iter().map(norm).collect();
        let ap_sets: std::collections::HashSet<Vec<Item>> =
            apriori_result.iter().map(|(s, _)| norm(s)).collect();

        assert_eq!(fp_sets, ap_sets);
    }
}
