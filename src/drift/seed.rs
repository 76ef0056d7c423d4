//! Block-based (SeedDriftDetector) drift test, and its ProSeed variant that
//! consults a volatility detector to stay sensitive near predicted drift
//! points.

use super::hoeffding::cannot_reject_equal_means;
use super::volatility::VolatilityDetector;
use super::{Drift, DriftKind};
use crate::item::Item;
use crate::mining::rules::AssociationRule;
use crate::ruletree::RuleTree;

const SAMPLE_INTERVAL: u64 = 32;
const BLOCK_COMPARE_CONFIDENCE: f64 = 0.1;
const TRAINING_COMPARE_CONFIDENCE: f64 = 0.05;
/// ProSeed's guard zone: transactions within this many steps of a predicted
/// drift point force a drop instead of a merge.
const PROSEED_GUARD_ZONE: u64 = 1000;

pub struct SeedDriftDetector {
    training: RuleTree,
    previous: Option<RuleTree>,
    current: RuleTree,
    since_interval: u64,
    /// Whether this instance runs the ProSeed variant (requires a
    /// volatility detector to be meaningful).
    proseed: bool,
}

impl SeedDriftDetector {
    pub fn new(training_window: &[Vec<Item>], rules: &[AssociationRule], proseed: bool) -> Self {
        let mut training = RuleTree::build(rules);
        for tx in training_window {
            training.record_matches(tx);
        }
        let current = training.clone_topology_reset_counters();
        SeedDriftDetector {
            training,
            previous: None,
            current,
            since_interval: 0,
            proseed,
        }
    }

    pub fn training_rule_miss_rate(&self) -> f64 {
        self.training.rule_miss_rate()
    }

    pub fn check_for_drift(
        &mut self,
        transaction: &[Item],
        transaction_num: u64,
        volatility: Option<&VolatilityDetector>,
    ) -> Option<Drift> {
        self.current.record_matches(transaction);
        self.since_interval += 1;
        if self.since_interval < SAMPLE_INTERVAL {
            return None;
        }
        self.since_interval = 0;

        match &mut self.previous {
            None => {
                self.previous = Some(self.current.clone());
            }
            Some(prev) => {
                let equal_blocks = cannot_reject_equal_means(
                    prev.rule_miss_rate(),
                    self.current.rule_miss_rate(),
                    prev.transaction_count(),
                    self.current.transaction_count(),
                    BLOCK_COMPARE_CONFIDENCE,
                );
                let forced_drop = self.proseed && Self::near_predicted_drift(volatility, transaction_num);

                if equal_blocks && !forced_drop {
                    prev.absorb(&self.current);
                } else {
                    *prev = self.current.clone();
                }
            }
        }
        self.current = self.training.clone_topology_reset_counters();

        let prev = self.previous.as_ref().unwrap();
        let rejects_equality = !cannot_reject_equal_means(
            self.training.rule_miss_rate(),
            prev.rule_miss_rate(),
            self.training.transaction_count(),
            prev.transaction_count(),
            TRAINING_COMPARE_CONFIDENCE,
        );

        if rejects_equality {
            let kind = if self.proseed { DriftKind::ProSeed } else { DriftKind::Seed };
            Some(Drift::new(kind, transaction_num))
        } else {
            None
        }
    }

    fn near_predicted_drift(volatility: Option<&VolatilityDetector>, transaction_num: u64) -> bool {
        match volatility.and_then(|v| v.predicted_next_drift()) {
            Some(predicted) => predicted.abs_diff(transaction_num) <= PROSEED_GUARD_ZONE,
            None => false,
        }
    }
}
