//! Inter-drift interval modelling: a pattern network used to derive an
//! adaptive confidence scaling for the rolling-mean drift detectors.

use super::DriftConfidence;
use ahash::AHashMap;

const KS_TEST_CONFIDENCE: f64 = 0.05;
const MAX_PATTERN_SET_SIZE: usize = 100;
/// Interval-sample bag cap per pattern; not named in the source, chosen to
/// keep memory bounded without discarding recent history too eagerly.
const PATTERN_SAMPLE_CAP: usize = 50;

/// One node of the inter-drift pattern network: a bag of recent interval
/// samples plus outgoing transition counts to other patterns.
#[derive(Debug, Clone, Default)]
struct Pattern {
    samples: Vec<f64>,
    out_edges: AHashMap<u64, u64>,
}

impl Pattern {
    fn add_sample(&mut self, value: f64) {
        self.samples.push(value);
        if self.samples.len() > 5 {
            reject_iqr_outliers(&mut self.samples);
        }
        if self.samples.len() > PATTERN_SAMPLE_CAP {
            let excess = self.samples.len() - PATTERN_SAMPLE_CAP;
            self.samples.drain(0..excess);
        }
    }

    fn mean(&self) -> f64 {
        if self.samples.is_empty() {
            0.0
        } else {
            self.samples.iter().sum::<f64>() / self.samples.len() as f64
        }
    }
}

fn reject_iqr_outliers(samples: &mut Vec<f64>) {
    let mut sorted = samples.clone();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap());
    let q1 = percentile(&sorted, 0.25);
    let q3 = percentile(&sorted, 0.75);
    let iqr = q3 - q1;
    let lo = q1 - 1.5 * iqr;
    let hi = q3 + 1.5 * iqr;
    samples.retain(|&v| v >= lo && v <= hi);
}

fn percentile(sorted: &[f64], p: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let idx = (p * (sorted.len() - 1) as f64).round() as usize;
    sorted[idx.min(sorted.len() - 1)]
}

/// Two-sample Kolmogorov-Smirnov statistic and its asymptotic p-value.
fn ks_2samp(a: &[f64], b: &[f64]) -> (f64, f64) {
    if a.is_empty() || b.is_empty() {
        return (1.0, 0.0);
    }
    let mut combined: Vec<f64> = a.iter().chain(b.iter()).copied().collect();
    combined.sort_by(|x, y| x.partial_cmp(y).unwrap());

    let na = a.len() as f64;
    let nb = b.len() as f64;
    let mut max_d = 0.0f64;
    for &x in &combined {
        let fa = a.iter().filter(|&&v| v <= x).count() as f64 / na;
        let fb = b.iter().filter(|&&v| v <= x).count() as f64 / nb;
        max_d = max_d.max((fa - fb).abs());
    }

    let en = (na * nb / (na + nb)).sqrt();
    let lambda = (en + 0.12 + 0.11 / en) * max_d;
    (max_d, kolmogorov_p(lambda))
}

/// Asymptotic Kolmogorov distribution tail, `Q_KS(lambda)`.
fn kolmogorov_p(lambda: f64) -> f64 {
    if lambda < 1e-9 {
        return 1.0;
    }
    let mut sum = 0.0;
    for k in 1..=100i32 {
        let term = if k % 2 == 1 { 1.0 } else { -1.0 } * (-2.0 * (k as f64).powi(2) * lambda * lambda).exp();
        sum += term;
        if term.abs() < 1e-12 {
            break;
        }
    }
    (2.0 * sum).clamp(0.0, 1.0)
}

/// Models the stream of inter-drift intervals as a pattern network, used to
/// derive a confidence scaling factor for other drift detectors.
pub struct VolatilityDetector {
    patterns: AHashMap<u64, Pattern>,
    next_id: u64,
    last_drift_transaction_num: Option<u64>,
    last_hit: Option<u64>,
    tick: u64,
    last_used: AHashMap<u64, u64>,
}

impl Default for VolatilityDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl VolatilityDetector {
    pub fn new() -> Self {
        VolatilityDetector {
            patterns: AHashMap::new(),
            next_id: 0,
            last_drift_transaction_num: None,
            last_hit: None,
            tick: 0,
            last_used: AHashMap::new(),
        }
    }

    pub fn pattern_count(&self) -> usize {
        self.patterns.len()
    }

    /// The single most likely next drift position, following the
    /// highest-count outgoing edge from the last-hit pattern. Used by
    /// ProSeed's guard zone, distinct from [`DriftConfidence::drift_confidence`]'s
    /// nearest-two-edges ratio.
    pub fn predicted_next_drift(&self) -> Option<u64> {
        let last_hit = self.last_hit?;
        let last_drift = self.last_drift_transaction_num?;
        let pattern = self.patterns.get(&last_hit)?;
        let (&target, _) = pattern.out_edges.iter().max_by_key(|(_, &count)| count)?;
        let target_pattern = self.patterns.get(&target)?;
        Some(last_drift + target_pattern.mean().round() as u64)
    }

    /// Record that a drift occurred at `transaction_num`.
    pub fn add(&mut self, transaction_num: u64) {
        let interval = match self.last_drift_transaction_num {
            Some(prev) => transaction_num.saturating_sub(prev) as f64,
            None => transaction_num as f64,
        };
        self.last_drift_transaction_num = Some(transaction_num);

        let target = self.find_or_create_pattern(interval);

        if let Some(prev) = self.last_hit {
            if let Some(p) = self.patterns.get_mut(&prev) {
                *p.out_edges.entry(target).or_insert(0) += 1;
            }
        }

        self.patterns.get_mut(&target).unwrap().add_sample(interval);
        self.tick += 1;
        self.last_used.insert(target, self.tick);
        self.last_hit = Some(target);

        if self.patterns.len() > MAX_PATTERN_SET_SIZE {
            self.evict_lru();
        }
    }

    fn find_or_create_pattern(&mut self, interval: f64) -> u64 {
        let mut best: Option<(u64, f64)> = None;
        for (&id, pattern) in &self.patterns {
            if pattern.samples.is_empty() {
                continue;
            }
            let (_, p_value) = ks_2samp(&[interval], &pattern.samples);
            if best.is_none() || p_value > best.unwrap().1 {
                best = Some((id, p_value));
            }
        }
        if let Some((id, p_value)) = best {
            if p_value > KS_TEST_CONFIDENCE {
                return id;
            }
        }
        let id = self.next_id;
        self.next_id += 1;
        self.patterns.insert(id, Pattern::default());
        id
    }

    fn evict_lru(&mut self) {
        let victim = self
            .last_used
            .iter()
            .min_by_key(|(_, &tick)| tick)
            .map(|(&id, _)| id);
        if let Some(id) = victim {
            self.patterns.remove(&id);
            self.last_used.remove(&id);
            for pattern in self.patterns.values_mut() {
                pattern.out_edges.remove(&id);
            }
            if self.last_hit == Some(id) {
                self.last_hit = None;
            }
        }
    }
}

impl DriftConfidence for VolatilityDetector {
    /// From the last-hit pattern's top-10 outgoing edges, take the two
    /// expected drift positions nearest `transaction_num`, model each as a
    /// normal centred at its expected position, and return the larger of
    /// the two PDF ratios (value at `transaction_num` over the peak).
    /// Returns `1.0` absent enough history.
    fn drift_confidence(&self, transaction_num: u64) -> f64 {
        let (Some(last_hit), Some(last_drift)) = (self.last_hit, self.last_drift_transaction_num)
        else {
            return 1.0;
        };
        let Some(pattern) = self.patterns.get(&last_hit) else {
            return 1.0;
        };

        let mut edges: Vec<(u64, u64)> = pattern.out_edges.iter().map(|(&k, &v)| (k, v)).collect();
        edges.sort_by(|a, b| b.1.cmp(&a.1));
        edges.truncate(10);
        if edges.is_empty() {
            return 1.0;
        }

        let mut candidates: Vec<(f64, f64)> = edges
            .iter()
            .filter_map(|&(target, _)| {
                let target_pattern = self.patterns.get(&target)?;
                let mean_interval = target_pattern.mean();
                let expected_position = last_drift as f64 + mean_interval;
                Some((expected_position, mean_interval))
            })
            .collect();
        if candidates.is_empty() {
            return 1.0;
        }

        candidates.sort_by(|a, b| {
            let da = (transaction_num as f64 - a.0).abs();
            let db = (transaction_num as f64 - b.0).abs();
            da.partial_cmp(&db).unwrap()
        });
        candidates.truncate(2);

        candidates
            .iter()
            .map(|&(center, mean_interval)| {
                let scale = (mean_interval / 2.0).max(1e-6);
                let distance = transaction_num as f64 - center;
                (-(distance * distance) / (2.0 * scale * scale)).exp()
            })
            .fold(0.0, f64::max)
    }
}

/// Constant-confidence stub used for ablation against the adaptive
/// [`VolatilityDetector`].
pub struct FixedConfidenceVolatilityDetector(pub f64);

impl DriftConfidence for FixedConfidenceVolatilityDetector {
    fn drift_confidence(&self, _transaction_num: u64) -> f64 {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_confidence_always_returns_constant() {
        let det = FixedConfidenceVolatilityDetector(0.7);
        assert_eq!(det.drift_confidence(0), 0.7);
        assert_eq!(det.drift_confidence(1_000_000), 0.7);
    }

    #[test]
    fn no_history_returns_one() {
        let det = VolatilityDetector::new();
        assert_eq!(det.drift_confidence(100), 1.0);
    }

    #[test]
    fn repeated_similar_intervals_reuse_the_same_pattern() {
        let mut det = VolatilityDetector::new();
        det.add(100);
        det.add(200); // interval 100
        det.add(300); // interval 100
        det.add(400); // interval 100
        // regular spacing should collapse onto very few patterns
        assert!(det.pattern_count() <= 2);
    }

    #[test]
    fn ks_identical_samples_have_p_value_one() {
        let (d, p) = ks_2samp(&[1.0, 2.0, 3.0], &[1.0, 2.0, 3.0]);
        assert!(d < 1e-9);
        assert!(p > 0.99);
    }
}
