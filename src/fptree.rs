//! Arena-indexed FP-tree: a compressed prefix tree of transactions.
//!
//! Nodes live in a `Vec` arena and are addressed by a stable `NodeId` index
//! rather than by `Rc`/`Weak` pointers — parent links and header entries are
//! just indices, so there is no reference-cycle bookkeeping. Freed node slots
//! are recycled via a free list.

use ahash::{AHashMap, AHashSet};
use std::fmt;

/// Stable index of a node in an `FPTree`'s arena. The root is always `NodeId(0)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n{}", self.0)
    }
}

use crate::item::Item;

#[derive(Debug, Clone)]
struct FPNode {
    /// `None` only for the root sentinel.
    item: Option<Item>,
    count: u64,
    end_count: u64,
    parent: Option<NodeId>,
    children: AHashMap<Item, NodeId>,
    /// `false` once freed; the slot may be reused by a later insert.
    live: bool,
}

impl FPNode {
    fn root() -> Self {
        FPNode {
            item: None,
            count: 0,
            end_count: 0,
            parent: None,
            children: AHashMap::new(),
            live: true,
        }
    }
}

/// Compressed prefix tree of transactions supporting incremental insertion,
/// path removal, resorting under a changing item order, and recursive
/// projection for FP-Growth.
#[derive(Debug, Clone)]
pub struct FPTree {
    nodes: Vec<FPNode>,
    free: Vec<usize>,
    /// item -> set of nodes carrying that item.
    header: AHashMap<Item, AHashSet<NodeId>>,
    /// multiset of item occurrences across all stored paths.
    item_count: AHashMap<Item, u64>,
    /// sum of `end_count` over all nodes.
    num_transactions: u64,
    /// nodes with `end_count > 0`.
    leaves: AHashSet<NodeId>,
}

pub const ROOT: NodeId = NodeId(0);

impl Default for FPTree {
    fn default() -> Self {
        Self::new()
    }
}

impl FPTree {
    pub fn new() -> Self {
        FPTree {
            nodes: vec![FPNode::root()],
            free: Vec::new(),
            header: AHashMap::new(),
            item_count: AHashMap::new(),
            num_transactions: 0,
            leaves: AHashSet::new(),
        }
    }

    pub fn num_transactions(&self) -> u64 {
        self.num_transactions
    }

    pub fn item_count(&self, item: Item) -> u64 {
        self.item_count.get(&item).copied().unwrap_or(0)
    }

    pub fn header_items(&self) -> impl Iterator<Item = Item> + '_ {
        self.header.keys().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.num_transactions == 0
    }

    fn node(&self, id: NodeId) -> &FPNode {
        &self.nodes[id.0]
    }

    fn node_mut(&mut self, id: NodeId) -> &mut FPNode {
        &mut self.nodes[id.0]
    }

    fn alloc(&mut self, item: Item, parent: NodeId) -> NodeId {
        let node = FPNode {
            item: Some(item),
            count: 0,
            end_count: 0,
            parent: Some(parent),
            children: AHashMap::new(),
            live: true,
        };
        if let Some(slot) = self.free.pop() {
            self.nodes[slot] = node;
            NodeId(slot)
        } else {
            self.nodes.push(node);
            NodeId(self.nodes.len() - 1)
        }
    }

    fn free_node(&mut self, id: NodeId) {
        debug_assert!(id != ROOT, "cannot free the root");
        self.nodes[id.0].live = false;
        self.nodes[id.0].children.clear();
        self.free.push(id.0);
    }

    /// Insert `path` (root-downward order) with multiplicity `count`.
    ///
    /// # Panics
    /// If `count == 0`.
    pub fn insert(&mut self, path: &[Item], count: u64) {
        assert!(count > 0, "FPTree::insert requires a positive count");
        let mut current = ROOT;
        for &item in path {
            let child = self.node(current).children.get(&item).copied();
            let next = match child {
                Some(id) => id,
                None => {
                    let id = self.alloc(item, current);
                    self.node_mut(current).children.insert(item, id);
                    self.header.entry(item).or_default().insert(id);
                    id
                }
            };
            self.node_mut(next).count += count;
            *self.item_count.entry(item).or_insert(0) += count;
            current = next;
        }
        self.node_mut(current).end_count += count;
        self.num_transactions += count;
        if current != ROOT {
            self.leaves.insert(current);
        }
    }

    /// Remove `path` with multiplicity `count`. The path must already exist
    /// with at least `count` occurrences at every step.
    ///
    /// # Panics
    /// If the path does not exist or any traversed count would underflow —
    /// both are programming errors, never user-triggerable in a correct
    /// caller.
    pub fn remove(&mut self, path: &[Item], count: u64) {
        assert!(count > 0, "FPTree::remove requires a positive count");
        let mut current = ROOT;
        let mut trail = Vec::with_capacity(path.len());
        for &item in path {
            let next = self
                .node(current)
                .children
                .get(&item)
                .copied()
                .unwrap_or_else(|| panic!("remove on a path missing item {item:?}"));
            trail.push((item, next));
            current = next;
        }

        for &(item, id) in &trail {
            let node = self.node_mut(id);
            assert!(node.count >= count, "FPTree count underflow on remove");
            node.count -= count;
            *self.item_count.get_mut(&item).unwrap() -= count;
        }

        let leaf = self.node_mut(current);
        assert!(leaf.end_count >= count, "FPTree end_count underflow on remove");
        leaf.end_count -= count;
        if leaf.end_count == 0 {
            self.leaves.remove(&current);
        }
        self.num_transactions -= count;

        // Unlink any node whose count dropped to zero, walking up from the
        // leaf so children are unlinked before their parents.
        for &(item, id) in trail.iter().rev() {
            if self.node(id).count == 0 {
                let parent = self.node(id).parent.unwrap();
                self.node_mut(parent).children.remove(&item);
                if let Some(set) = self.header.get_mut(&item) {
                    set.remove(&id);
                    if set.is_empty() {
                        self.header.remove(&item);
                    }
                }
                self.leaves.remove(&id);
                self.free_node(id);
            }
        }
    }

    /// Recover the root-to-`id` path (inclusive of `id`'s item).
    fn path_to(&self, id: NodeId) -> Vec<Item> {
        let mut items = Vec::new();
        let mut cur = id;
        while let Some(item) = self.node(cur).item {
            items.push(item);
            cur = self.node(cur).parent.unwrap();
        }
        items.reverse();
        items
    }

    /// Root-to-parent path of `id` (excludes `id`'s own item); used to build
    /// conditional pattern bases.
    pub fn prefix_path(&self, id: NodeId) -> Vec<Item> {
        let parent = self.node(id).parent.unwrap();
        if parent == ROOT {
            Vec::new()
        } else {
            self.path_to(parent)
        }
    }

    pub fn node_count(&self, id: NodeId) -> u64 {
        self.node(id).count
    }

    pub fn header_nodes(&self, item: Item) -> Vec<NodeId> {
        self.header
            .get(&item)
            .map(|s| s.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Walk root -> only-child until a node has zero or multiple children.
    pub fn has_single_path(&self) -> bool {
        let mut current = ROOT;
        loop {
            let children = &self.node(current).children;
            match children.len() {
                0 => return true,
                1 => current = *children.values().next().unwrap(),
                _ => return false,
            }
        }
    }

    /// Items and end_counts along the tree's single path, root-to-leaf. Only
    /// meaningful when `has_single_path()` is true.
    pub fn single_path_items(&self) -> Vec<(Item, u64)> {
        let mut out = Vec::new();
        let mut current = ROOT;
        loop {
            let children = &self.node(current).children;
            if children.len() != 1 {
                break;
            }
            let next = *children.values().next().unwrap();
            let node = self.node(next);
            out.push((node.item.unwrap(), node.count));
            current = next;
        }
        out
    }

    /// Snapshot of `(path, end_count)` per leaf, root-to-leaf order. The
    /// snapshot is taken once; it does not observe mutation performed while
    /// iterating.
    pub fn iter_paths(&self) -> Vec<(Vec<Item>, u64)> {
        self.leaves
            .iter()
            .map(|&id| (self.path_to(id), self.node(id).end_count))
            .filter(|(_, c)| *c > 0)
            .collect()
    }

    /// Whether every parent-child edge already satisfies the descending
    /// item-count order (with id tiebreak).
    pub fn is_sorted(&self) -> bool {
        fn walk(tree: &FPTree, id: NodeId) -> bool {
            let node = tree.node(id);
            for &child_id in node.children.values() {
                let child = tree.node(child_id);
                let child_item = child.item.unwrap();
                if let Some(parent_item) = node.item {
                    let pc = tree.item_count(parent_item);
                    let cc = tree.item_count(child_item);
                    if cc > pc || (cc == pc && child_item < parent_item) {
                        return false;
                    }
                }
                if !walk(tree, child_id) {
                    return false;
                }
            }
            true
        }
        walk(self, ROOT)
    }

    /// Re-order every stored path so that higher-`item_count` items sit
    /// closer to the root, descending, with item id as tiebreak.
    ///
    /// Implementation follows the snapshot-then-reinsert strategy: take a
    /// snapshot of leaves, recover each one's path, and if its sorted form
    /// differs, remove and reinsert it. Freshly created leaves from a
    /// reinsert are already sorted and are never revisited.
    pub fn sort(&mut self) {
        let snapshot: Vec<NodeId> = self.leaves.iter().copied().collect();
        let counts = self.item_count.clone();
        for id in snapshot {
            // `id` may no longer be a leaf if an earlier reinsert in this
            // same pass happened to touch it (can't happen for paths that
            // don't share a prefix, but cheap to guard anyway).
            if !self.leaves.contains(&id) {
                continue;
            }
            let path = self.path_to(id);
            let end_count = self.node(id).end_count;
            if end_count == 0 {
                continue;
            }
            let mut sorted = path.clone();
            sorted.sort_by(|a, b| {
                let ca = counts.get(a).copied().unwrap_or(0);
                let cb = counts.get(b).copied().unwrap_or(0);
                cb.cmp(&ca).then_with(|| a.cmp(b))
            });
            if sorted != path {
                self.remove(&path, end_count);
                self.insert(&sorted, end_count);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::Interner;

    fn items(interner: &mut Interner, names: &[&str]) -> Vec<Item> {
        names.iter().map(|n| interner.intern(n)).collect()
    }

    #[test]
    fn insert_then_remove_returns_to_empty() {
        let mut interner = Interner::new();
        let path = items(&mut interner, &["a", "b", "c"]);
        let mut tree = FPTree::new();
        tree.insert(&path, 3);
        assert_eq!(tree.num_transactions(), 3);
        tree.remove(&path, 3);
        assert_eq!(tree.num_transactions(), 0);
        assert!(tree.is_empty());
        assert_eq!(tree.header_items().count(), 0);
    }

    #[test]
    fn item_count_matches_header_sum() {
        let mut interner = Interner::new();
        let p1 = items(&mut interner, &["a", "b"]);
        let p2 = items(&mut interner, &["a", "c"]);
        let mut tree = FPTree::new();
        tree.insert(&p1, 2);
        tree.insert(&p2, 1);
        let a = p1[0];
        let sum: u64 = tree
            .header_nodes(a)
            .iter()
            .map(|&n| tree.node_count(n))
            .sum();
        assert_eq!(tree.item_count(a), sum);
        assert_eq!(tree.item_count(a), 3);
    }

    #[test]
    fn single_path_detection() {
        let mut interner = Interner::new();
        let path = items(&mut interner, &["a", "b", "c"]);
        let mut tree = FPTree::new();
        tree.insert(&path, 1);
        assert!(tree.has_single_path());
        tree.insert(&items(&mut interner, &["a", "d"]), 1);
        assert!(!tree.has_single_path());
    }

    #[test]
    fn sort_orders_by_descending_count() {
        let mut interner = Interner::new();
        let a = interner.intern("a");
        let b = interner.intern("b");
        let mut tree = FPTree::new();
        // b is more frequent than a overall, but inserted with a first.
        tree.insert(&[a, b], 1);
        tree.insert(&[b], 3);
        tree.sort();
        assert!(tree.is_sorted());
        let paths = tree.iter_paths();
        let ab_path = paths.iter().find(|(p, _)| p.len() == 2).unwrap();
        assert_eq!(ab_path.0[0], b);
    }

    #[test]
    fn iteration_snapshot_ignores_concurrent_understanding() {
        let mut interner = Interner::new();
        let path = items(&mut interner, &["x", "y"]);
        let mut tree = FPTree::new();
        tree.insert(&path, 5);
        let snap = tree.iter_paths();
        assert_eq!(snap.len(), 1);
        assert_eq!(snap[0].1, 5);
    }
}
