pub mod detector;
pub mod hoeffding;
pub mod rollingmean;
pub mod seed;
pub mod volatility;

pub use detector::DriftDetector;
pub use seed::SeedDriftDetector;
pub use volatility::{FixedConfidenceVolatilityDetector, VolatilityDetector};

/// What kind of signal produced a [`Drift`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriftKind {
    RuleMatchVector,
    RagBag,
    Seed,
    ProSeed,
}

/// A detected concept-drift event.
#[derive(Debug, Clone, PartialEq)]
pub struct Drift {
    pub kind: DriftKind,
    pub transaction_num: u64,
    pub hellinger: Option<f64>,
    pub confidence_radius: Option<f64>,
    pub mean: Option<f64>,
}

impl Drift {
    pub fn new(kind: DriftKind, transaction_num: u64) -> Self {
        Drift {
            kind,
            transaction_num,
            hellinger: None,
            confidence_radius: None,
            mean: None,
        }
    }
}

/// Source of an adaptive confidence scaling factor consulted by the
/// rolling-mean-based drift detectors. Implemented by [`VolatilityDetector`]
/// and, for ablation, by [`FixedConfidenceVolatilityDetector`].
pub trait DriftConfidence {
    fn drift_confidence(&self, transaction_num: u64) -> f64;
}
