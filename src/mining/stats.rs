/// Running counters surfaced in log lines and reported by the pipeline at
/// the end of each training cohort.
#[derive(Debug, Default, Clone)]
pub struct MiningStats {
    pub cohort: usize,
    pub frequent_itemsets_count: usize,
    pub rules_generated: usize,
    pub transactions_in_window: usize,
    pub drifts_detected: usize,
}

impl MiningStats {
    pub fn new() -> Self {
        Self::default()
    }
}
