//! Recursive frequent-itemset enumeration over an [`FPTree`].

use crate::fptree::FPTree;
use crate::item::Item;
use ahash::AHashMap;

/// Result of a mining run: the frequent itemsets found, their absolute
/// counts, and the transaction total they were mined against.
pub struct MiningResult {
    pub itemsets: Vec<Vec<Item>>,
    pub itemset_counts: AHashMap<Vec<Item>, u64>,
    pub n_transactions: u64,
}

/// Mine `tree` for itemsets with support at least `min_support`.
///
/// `min_count = min_support * n_transactions` (rounded up). When
/// `maximal_only` is set, an itemset is only emitted if no superset of it
/// (found deeper in the recursion) was also frequent.
pub fn mine(tree: &FPTree, min_support: f64, maximal_only: bool) -> MiningResult {
    let n_transactions = tree.num_transactions();
    let min_count = ((min_support * n_transactions as f64).ceil() as u64).max(1);

    let mut itemsets = Vec::new();
    let mut itemset_counts = AHashMap::new();
    mine_recursive(
        tree,
        &[],
        n_transactions,
        min_count,
        maximal_only,
        &mut itemsets,
        &mut itemset_counts,
    );

    MiningResult {
        itemsets,
        itemset_counts,
        n_transactions,
    }
}

/// `path_count` is the running count associated with `path` so far (the
/// multiplicity shared by every transaction contributing to this branch).
fn mine_recursive(
    tree: &FPTree,
    path: &[Item],
    path_count: u64,
    min_count: u64,
    maximal_only: bool,
    itemsets: &mut Vec<Vec<Item>>,
    itemset_counts: &mut AHashMap<Vec<Item>, u64>,
) {
    if tree.has_single_path() {
        for combo in single_path_combinations(tree, min_count) {
            let mut full = path.to_vec();
            let count = combo.1;
            full.extend(combo.0);
            itemset_counts.insert(full.clone(), count);
            itemsets.push(full);
        }
        return;
    }

    let mut header_items: Vec<(Item, u64)> = tree
        .header_items()
        .map(|item| (item, tree.item_count(item)))
        .filter(|(_, c)| *c >= min_count)
        .collect();
    // Increasing item_count order, tiebroken by item id, matches FP-Growth's
    // deterministic recursion order.
    header_items.sort_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(&b.0)));

    for (x, x_count) in header_items {
        let mut new_path = path.to_vec();
        new_path.push(x);
        let new_count = path_count.min(x_count);

        let cond_tree = build_conditional_tree(tree, x);

        let before = itemsets.len();
        mine_recursive(
            &cond_tree,
            &new_path,
            new_count,
            min_count,
            maximal_only,
            itemsets,
            itemset_counts,
        );
        let emitted_below = itemsets.len() > before;

        if !maximal_only || !emitted_below {
            itemset_counts.insert(new_path.clone(), new_count);
            itemsets.push(new_path);
        }
    }
}

fn single_path_combinations(tree: &FPTree, min_count: u64) -> Vec<(Vec<Item>, u64)> {
    let path = tree.single_path_items();
    let n = path.len();
    let mut out = Vec::new();
    for mask in 1..(1u32 << n) {
        let mut items = Vec::new();
        let mut count = u64::MAX;
        for (i, &(item, c)) in path.iter().enumerate() {
            if mask & (1 << i) != 0 {
                items.push(item);
                count = count.min(c);
            }
        }
        if count >= min_count {
            out.push((items, count));
        }
    }
    out
}

/// Project `tree` onto `item`: for every header-node of `item`, insert the
/// root-to-parent path of that node with the node's own count.
fn build_conditional_tree(tree: &FPTree, item: Item) -> FPTree {
    let mut cond = FPTree::new();
    for node in tree.header_nodes(item) {
        let count = tree.node_count(node);
        if count == 0 {
            continue;
        }
        let prefix = tree.prefix_path(node);
        if !prefix.is_empty() {
            cond.insert(&prefix, count);
        }
    }
    cond
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::Interner;
    use std::collections::HashSet;

    /// The 10-transaction golden example from the source algorithm
    /// (items a..e).
    fn golden_tree() -> (FPTree, Interner) {
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
        let mut tree = FPTree::new();
        for tx in raw {
            let items: Vec<Item> = tx.iter().map(|n| interner.intern(n)).collect();
            tree.insert(&items, 1);
        }
        tree.sort();
        (tree, interner)
    }

    fn names_of(itemset: &[Item], interner: &Interner) -> Vec<String> {
        let mut v: Vec<String> = itemset.iter().map(|i| interner.name(*i).to_string()).collect();
        v.sort();
        v
    }

    #[test]
    fn golden_fp_growth_matches_expected_itemsets() {
        let (tree, interner) = golden_tree();
        let result = mine(&tree, 0.2, false);

        let got: HashSet<Vec<String>> = result
            .itemsets
            .iter()
            .map(|is| names_of(is, &interner))
            .collect();

        let expected_raw: &[&[&str]] = &[
            &["a"],
            &["b"],
            &["c"],
            &["d"],
            &["e"],
            &["a", "b"],
            &["a", "c"],
            &["a", "d"],
            &["a", "e"],
            &["b", "c"],
            &["b", "d"],
            &["c", "d"],
            &["c", "e"],
            &["d", "e"],
            &["a", "b", "c"],
            &["a", "b", "d"],
            &["a", "c", "d"],
            &["a", "d", "e"],
            &["b", "c", "d"],
        ];
        let expected: HashSet<Vec<String>> = expected_raw
            .iter()
            .map(|row| {
                let mut v: Vec<String> = row.iter().map(|s| s.to_string()).collect();
                v.sort();
                v
            })
            .collect();

        assert_eq!(got, expected);
    }

    #[test]
    fn maximal_only_drops_subsets_of_emitted_supersets() {
        let (tree, _interner) = golden_tree();
        let result = mine(&tree, 0.2, true);
        // every maximal itemset found at min_support=0.2 must not be a
        // subset of another emitted itemset.
        for a in &result.itemsets {
            let aset: HashSet<Item> = a.iter().copied().collect();
            for b in &result.itemsets {
                if a == b {
                    continue;
                }
                let bset: HashSet<Item> = b.iter().copied().collect();
                assert!(
                    !aset.is_subset(&bset),
                    "maximal_only should not emit a proper subset of another result"
                );
            }
        }
    }
}
