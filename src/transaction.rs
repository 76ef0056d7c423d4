use crate::item::{Item, Interner};

/// An ordered sequence of items as they arrived in the stream.
///
/// Ordering matters only transiently, for insertion into a tree under a
/// chosen item-frequency ordering; the underlying notion is set-valued.
/// Duplicates are removed at construction time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    items: Vec<Item>,
}

impl Transaction {
    /// Build a transaction from raw item names, interning each one and
    /// dropping duplicates (first occurrence wins).
    pub fn from_names(names: &[String], interner: &mut Interner) -> Self {
        let mut items = Vec::with_capacity(names.len());
        for name in names {
            let item = interner.intern(name);
            if !items.contains(&item) {
                items.push(item);
            }
        }
        Self { items }
    }

    pub fn from_items(items: Vec<Item>) -> Self {
        let mut deduped = Vec::with_capacity(items.len());
        for item in items {
            if !deduped.contains(&item) {
                deduped.push(item);
            }
        }
        Self { items: deduped }
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn contains(&self, item: Item) -> bool {
        self.items.contains(&item)
    }

    /// Return a copy of this transaction's items sorted by the given key,
    /// descending, with the item id as a deterministic tiebreak.
    pub fn sorted_by_frequency(&self, item_count: &ahash::AHashMap<Item, u64>) -> Vec<Item> {
        let mut items = self.items.clone();
        items.sort_by(|a, b| {
            let ca = item_count.get(a).copied().unwrap_or(0);
            let cb = item_count.get(b).copied().unwrap_or(0);
            cb.cmp(&ca).then_with(|| a.cmp(b))
        });
        items
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dedupes_repeated_items() {
        let mut interner = Interner::new();
        let tx = Transaction::from_names(
            &["a".to_string(), "b".to_string(), "a".to_string()],
            &mut interner,
        );
        assert_eq!(tx.len(), 2);
    }

    #[test]
    fn sorts_by_descending_frequency_with_id_tiebreak() {
        let mut interner = Interner::new();
        let a = interner.intern("a");
        let b = interner.intern("b");
        let tx = Transaction::from_items(vec![a, b]);
        let mut counts = ahash::AHashMap::default();
        counts.insert(a, 1);
        counts.insert(b, 1);
        // equal counts: tiebreak is ascending item id, i.e. a before b
        assert_eq!(tx.sorted_by_frequency(&counts), vec![a, b]);
    }
}
