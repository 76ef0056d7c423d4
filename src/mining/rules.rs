//! Rule generation: powerset enumeration of rules with confidence/lift
//! filters.

use crate::item::Item;
use ahash::AHashMap;

/// A discovered association rule `antecedent -> consequent`.
#[derive(Debug, Clone, PartialEq)]
pub struct AssociationRule {
    pub antecedent: Vec<Item>,
    pub consequent: Vec<Item>,
    pub confidence: f64,
    pub lift: f64,
    pub support: f64,
}

/// For every frequent itemset of size >= 2 and every non-empty proper subset
/// `antecedent`, emit a rule `antecedent -> (itemset - antecedent)` whose
/// confidence and lift clear the given thresholds.
///
/// `itemset_counts` and `n_transactions` must be consistent with `itemsets`
/// (as produced by [`crate::mining::fpgrowth::mine`]).
pub fn generate_rules(
    itemsets: &[Vec<Item>],
    itemset_counts: &AHashMap<Vec<Item>, u64>,
    n_transactions: u64,
    min_conf: f64,
    min_lift: f64,
) -> Vec<AssociationRule> {
    let n = n_transactions as f64;
    let support_of = |set: &[Item]| -> f64 {
        let mut sorted = set.to_vec();
        sorted.sort();
        itemset_counts
            .get(&sorted)
            .map(|&c| c as f64 / n)
            .unwrap_or(0.0)
    };

    let mut rules = Vec::new();
    for itemset in itemsets {
        if itemset.len() < 2 {
            continue;
        }
        let itemset_support = support_of(itemset);

        for antecedent in non_empty_proper_subsets(itemset) {
            let consequent: Vec<Item> = itemset
                .iter()
                .copied()
                .filter(|i| !antecedent.contains(i))
                .collect();
            if consequent.is_empty() {
                continue;
            }

            let antecedent_support = support_of(&antecedent);
            let consequent_support = support_of(&consequent);
            if antecedent_support <= 0.0 {
                continue;
            }

            let confidence = itemset_support / antecedent_support;
            let lift = if consequent_support > 0.0 {
                confidence / consequent_support
            } else {
                0.0
            };

            if confidence >= min_conf && lift >= min_lift {
                rules.push(AssociationRule {
                    antecedent,
                    consequent,
                    confidence,
                    lift,
                    support: itemset_support,
                });
            }
        }
    }
    rules
}

/// All non-empty, proper subsets of `items` (excludes the full set and the
/// empty set), as a bitmask powerset.
fn non_empty_proper_subsets(items: &[Item]) -> Vec<Vec<Item>> {
    let n = items.len();
    let mut subsets = Vec::with_capacity((1 << n).saturating_sub(2));
    for mask in 1..(1u32 << n) - 1 {
        let mut subset = Vec::new();
        for (j, &item) in items.iter().enumerate() {
            if mask & (1 << j) != 0 {
                subset.push(item);
            }
        }
        subsets.push(subset);
    }
    subsets
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::Interner;

    #[test]
    fn xy_implies_z_rule_matches_expected_metrics() {
        // Scenario 2's dataset: support({x,y,z}) = 2/6, support({x,y}) = ?
        let mut interner = Interner::new();
        let z = interner.intern("z");
        let x = interner.intern("x");
        let y = interner.intern("y");

        let mut counts = AHashMap::new();
        let mut xy = vec![x, y];
        xy.sort();
        let mut xyz = vec![x, y, z];
        xyz.sort();
        counts.insert(xy.clone(), 2u64);
        counts.insert(xyz.clone(), 2u64);
        counts.insert(vec![z], 4u64);

        let itemsets = vec![xyz.clone()];
        let rules = generate_rules(&itemsets, &counts, 6, 0.0, 0.0);

        let rule = rules
            .iter()
            .find(|r| {
                let mut a = r.antecedent.clone();
                a.sort();
                a == xy
            })
            .expect("expected {x,y} -> {z} rule");
        assert!((rule.confidence - 1.0).abs() < 1e-9);
        assert!((rule.lift - 1.5).abs() < 1e-9);
        assert!((rule.support - 1.0 / 3.0).abs() < 1e-9);
    }
}
