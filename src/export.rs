//! Plain-text rules-file writer: one file per training cohort.

use crate::errors::Result;
use crate::item::Interner;
use crate::mining::rules::AssociationRule;
use std::io::Write;
use std::path::Path;

/// Write `rules` to `<prefix>.<cohort>`: header
/// `Antecedent->Consequent,Confidence,Lift,Support`, then one line per
/// rule with space-separated, sorted item names and four-decimal metrics.
pub fn write_cohort_rules<P: AsRef<Path>>(
    prefix: P,
    cohort: usize,
    rules: &[AssociationRule],
    interner: &Interner,
) -> Result<()> {
    let path = format!("{}.{}", prefix.as_ref().display(), cohort);
    let file = std::fs::File::create(path)?;
    write_rules(file, rules, interner)
}

/// Write a single rules file with no per-cohort split, for the batch miner.
pub fn write_rules_file<P: AsRef<Path>>(path: P, rules: &[AssociationRule], interner: &Interner) -> Result<()> {
    let file = std::fs::File::create(path)?;
    write_rules(file, rules, interner)
}

fn write_rules<W: Write>(mut out: W, rules: &[AssociationRule], interner: &Interner) -> Result<()> {
    writeln!(out, "Antecedent->Consequent,Confidence,Lift,Support")?;
    for rule in rules {
        let antecedent = joined_sorted_names(&rule.antecedent, interner);
        let consequent = joined_sorted_names(&rule.consequent, interner);
        writeln!(
            out,
            "{}->{},{:.4},{:.4},{:.4}",
            antecedent, consequent, rule.confidence, rule.lift, rule.support
        )?;
    }
    Ok(())
}

fn joined_sorted_names(items: &[crate::item::Item], interner: &Interner) -> String {
    let mut names: Vec<&str> = items.iter().map(|&i| interner.name(i)).collect();
    names.sort_unstable();
    names.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::Interner;

    #[test]
    fn formats_header_and_one_rule_line() {
        let mut interner = Interner::new();
        let a = interner.intern("a");
        let b = interner.intern("b");
        let c = interner.intern("c");
        let rules = vec![AssociationRule {
            antecedent: vec![b, a],
            consequent: vec![c],
            confidence: 0.75,
            lift: 1.5,
            support: 0.3333,
        }];

        let mut buf = Vec::new();
        write_rules(&mut buf, &rules, &interner).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next().unwrap(), "Antecedent->Consequent,Confidence,Lift,Support");
        assert_eq!(lines.next().unwrap(), "a b->c,0.7500,1.5000,0.3333");
    }
}
