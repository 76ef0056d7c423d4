use crate::errors::{MiningError, Result};

/// Which drift-detection strategy the pipeline should run per training
/// cohort.
///
/// `vrchange` and `prochange` are accepted on the CLI as aliases for the
/// same Hellinger/rolling-mean algorithm; `virtual` (one source variant's
/// name for it) is rejected, resolving the spec's "adopt one, reject the
/// other" open question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriftAlgorithm {
    /// Hellinger-distance rolling-mean test (CLI: `vrchange` or `prochange`).
    Virtual,
    /// Block-merge-or-drop Hoeffding test.
    Seed,
    /// Seed, guarded by a volatility detector's predicted drift positions.
    ProSeed,
}

impl DriftAlgorithm {
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "vrchange" | "prochange" => Some(DriftAlgorithm::Virtual),
            "seed" => Some(DriftAlgorithm::Seed),
            "proseed" => Some(DriftAlgorithm::ProSeed),
            _ => None,
        }
    }
}

/// Validated configuration for one streaming pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub training_window_size: usize,
    pub min_support: f64,
    pub min_confidence: f64,
    pub min_lift: f64,
    pub drift_algorithm: DriftAlgorithm,
    /// Required when `drift_algorithm == Virtual`; forbidden otherwise.
    pub fixed_drift_confidence: Option<f64>,
    pub generate_maximal_itemsets: bool,
    pub trace_malloc: bool,
    pub disable_save_rules: bool,
}

impl PipelineConfig {
    #[allow(clippy::too_many_arguments)]
    pub fn validated(
        training_window_size: usize,
        min_support: f64,
        min_confidence: f64,
        min_lift: f64,
        drift_algorithm: DriftAlgorithm,
        fixed_drift_confidence: Option<f64>,
        generate_maximal_itemsets: bool,
        trace_malloc: bool,
        disable_save_rules: bool,
    ) -> Result<Self> {
        if training_window_size == 0 {
            return Err(MiningError::InvalidConfig(
                "training-window-size must be positive".into(),
            ));
        }
        if !(0.0..=1.0).contains(&min_support) {
            return Err(MiningError::InvalidConfig("min-support must be in [0,1]".into()));
        }
        if !(0.0..=1.0).contains(&min_confidence) {
            return Err(MiningError::InvalidConfig(
                "min-confidence must be in [0,1]".into(),
            ));
        }
        if min_lift < 1.0 {
            return Err(MiningError::InvalidConfig("min-lift must be >= 1".into()));
        }

        match (drift_algorithm, fixed_drift_confidence) {
            (DriftAlgorithm::Virtual, None) => {
                return Err(MiningError::InvalidConfig(
                    "fixed-drift-confidence is required with vrchange/prochange".into(),
                ));
            }
            (DriftAlgorithm::Virtual, Some(c)) if !(0.0..=1.0).contains(&c) => {
                return Err(MiningError::InvalidConfig(
                    "fixed-drift-confidence must be in [0,1]".into(),
                ));
            }
            (DriftAlgorithm::Seed | DriftAlgorithm::ProSeed, Some(_)) => {
                return Err(MiningError::InvalidConfig(
                    "fixed-drift-confidence is only valid with vrchange/prochange".into(),
                ));
            }
            _ => {}
        }

        Ok(PipelineConfig {
            training_window_size,
            min_support,
            min_confidence,
            min_lift,
            drift_algorithm,
            fixed_drift_confidence,
            generate_maximal_itemsets,
            trace_malloc,
            disable_save_rules,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vrchange_and_prochange_are_the_same_algorithm() {
        assert_eq!(DriftAlgorithm::parse("vrchange"), Some(DriftAlgorithm::Virtual));
        assert_eq!(DriftAlgorithm::parse("prochange"), Some(DriftAlgorithm::Virtual));
    }

    #[test]
    fn virtual_keyword_is_rejected() {
        assert_eq!(DriftAlgorithm::parse("virtual"), None);
    }

    #[test]
    fn fixed_confidence_required_for_virtual_drift() {
        let err = PipelineConfig::validated(10, 0.1, 0.5, 1.0, DriftAlgorithm::Virtual, None, false, false, false);
        assert!(err.is_err());
    }

    #[test]
    fn fixed_confidence_forbidden_for_seed() {
        let err =
            PipelineConfig::validated(10, 0.1, 0.5, 1.0, DriftAlgorithm::Seed, Some(0.5), false, false, false);
        assert!(err.is_err());
    }

    #[test]
    fn valid_virtual_config_is_accepted() {
        let ok =
            PipelineConfig::validated(10, 0.1, 0.5, 1.0, DriftAlgorithm::Virtual, Some(0.8), false, false, false);
        assert!(ok.is_ok());
    }
}
