//! The CDTDS orchestrator: per training window, mine rules, pick a drift
//! strategy from configuration, and stream transactions through it until it
//! signals drift, then restart on a fresh window.

use crate::config::{DriftAlgorithm, PipelineConfig};
use crate::drift::seed::SeedDriftDetector;
use crate::drift::volatility::{FixedConfidenceVolatilityDetector, VolatilityDetector};
use crate::drift::{Drift, DriftDetector};
use crate::fptree::FPTree;
use crate::item::{Interner, Item};
use crate::mining::rules::{generate_rules, AssociationRule};
use crate::mining::{fpgrowth, stats::MiningStats};

enum ActiveDetector {
    Virtual(DriftDetector, FixedConfidenceVolatilityDetector),
    Seed(SeedDriftDetector),
}

/// One completed training cohort: the rules mined for it, and the drift (if
/// any) that ended it.
pub struct CohortResult {
    pub cohort: usize,
    pub rules: Vec<AssociationRule>,
    pub drift: Option<Drift>,
}

/// Drives the mine-then-monitor loop over a transaction stream, owning the
/// interner for the lifetime of the run so item identities stay stable
/// across cohorts.
pub struct CdtdsPipeline {
    config: PipelineConfig,
    interner: Interner,
    volatility: VolatilityDetector,
}

impl CdtdsPipeline {
    pub fn new(config: PipelineConfig) -> Self {
        CdtdsPipeline {
            config,
            interner: Interner::new(),
            volatility: VolatilityDetector::new(),
        }
    }

    pub fn interner(&self) -> &Interner {
        &self.interner
    }

    /// Run to completion over `transactions` (raw, un-interned item-name
    /// rows), calling `on_cohort` once per completed cohort (whether or not
    /// it ended in a detected drift — a cohort with no drift only happens
    /// when the stream runs out mid-monitoring).
    pub fn run<I, F>(&mut self, transactions: I, mut on_cohort: F) -> usize
    where
        I: IntoIterator<Item = Vec<String>>,
        F: FnMut(CohortResult, &Interner),
    {
        let mut iter = transactions.into_iter();
        let mut transaction_num: u64 = 0;
        let mut cohort = 0usize;
        let mut drift_count = 0usize;

        'cohorts: loop {
            let mut window: Vec<Vec<Item>> = Vec::with_capacity(self.config.training_window_size);
            while window.len() < self.config.training_window_size {
                let Some(raw) = iter.next() else { break 'cohorts };
                let tx = crate::transaction::Transaction::from_names(&raw, &mut self.interner);
                window.push(tx.items().to_vec());
                transaction_num += 1;
            }

            let mut tree = FPTree::new();
            for tx in &window {
                tree.insert(tx, 1);
            }
            tree.sort();

            let mining = fpgrowth::mine(&tree, self.config.min_support, self.config.generate_maximal_itemsets);
            let rules = generate_rules(
                &mining.itemsets,
                &mining.itemset_counts,
                mining.n_transactions,
                self.config.min_confidence,
                self.config.min_lift,
            );
            let stats = MiningStats {
                cohort,
                frequent_itemsets_count: mining.itemsets.len(),
                rules_generated: rules.len(),
                transactions_in_window: window.len(),
                drifts_detected: drift_count,
            };
            log::info!(
                "cohort {}: {} transactions, {} itemsets, {} rules",
                stats.cohort,
                stats.transactions_in_window,
                stats.frequent_itemsets_count,
                stats.rules_generated
            );

            if rules.is_empty() {
                log::info!("cohort {cohort}: empty rule set, skipping to next window");
                on_cohort(
                    CohortResult {
                        cohort,
                        rules,
                        drift: None,
                    },
                    &self.interner,
                );
                cohort += 1;
                continue;
            }

            let mut active = self.build_detector(&window, &rules);

            let mut drift_signal = None;
            loop {
                let Some(raw) = iter.next() else { break };
                let tx = crate::transaction::Transaction::from_names(&raw, &mut self.interner);
                let items = tx.items().to_vec();

                let drift = match &mut active {
                    ActiveDetector::Virtual(detector, fixed) => {
                        detector.check_for_drift(&items, transaction_num, Some(fixed))
                    }
                    ActiveDetector::Seed(detector) => {
                        detector.check_for_drift(&items, transaction_num, Some(&self.volatility))
                    }
                };
                transaction_num += 1;

                if let Some(drift) = drift {
                    log::info!(
                        "drift detected: cohort={} kind={:?} transaction={}",
                        cohort,
                        drift.kind,
                        drift.transaction_num
                    );
                    self.volatility.add(drift.transaction_num);
                    drift_count += 1;
                    drift_signal = Some(drift);
                    break;
                }
            }

            let exhausted = drift_signal.is_none();
            on_cohort(
                CohortResult {
                    cohort,
                    rules,
                    drift: drift_signal,
                },
                &self.interner,
            );
            cohort += 1;
            if exhausted {
                break;
            }
        }

        drift_count
    }

    fn build_detector(&self, window: &[Vec<Item>], rules: &[AssociationRule]) -> ActiveDetector {
        match self.config.drift_algorithm {
            DriftAlgorithm::Virtual => {
                let fixed = FixedConfidenceVolatilityDetector(
                    self.config
                        .fixed_drift_confidence
                        .expect("validated config guarantees fixed_drift_confidence for Virtual"),
                );
                ActiveDetector::Virtual(DriftDetector::new(window, rules), fixed)
            }
            DriftAlgorithm::Seed => ActiveDetector::Seed(SeedDriftDetector::new(window, rules, false)),
            DriftAlgorithm::ProSeed => ActiveDetector::Seed(SeedDriftDetector::new(window, rules, true)),
        }
    }
}
