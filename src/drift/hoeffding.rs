//! Hoeffding-bound two-sample equal-means test.

/// Test whether two observed means (each in `[0, 1]`, over `n_a` and `n_b`
/// samples respectively) are consistent with coming from the same
/// population at confidence `delta`.
///
/// Returns `true` when the bound *cannot* reject equality (i.e. the
/// observed difference is within the computed epsilon).
pub fn cannot_reject_equal_means(a_mean: f64, b_mean: f64, n_a: u64, n_b: u64, delta: f64) -> bool {
    if n_a == 0 || n_b == 0 {
        return true;
    }
    let n = a_mean + b_mean;
    let v = n * (1.0 - n);
    let m = 1.0 / (1.0 / n_a as f64 + 1.0 / n_b as f64);
    let delta_prime = (2.0 * ((n_a + n_b) as f64).ln() / delta).ln();
    let epsilon = ((2.0 / m) * v * delta_prime).max(0.0).sqrt() + (2.0 / (3.0 * m)) * delta_prime;
    (a_mean - b_mean).abs() < epsilon
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equal_means_never_rejected() {
        for &(n_a, n_b) in &[(10u64, 10u64), (5, 50), (200, 3), (1, 1)] {
            for &delta in &[0.01, 0.05, 0.1, 0.5] {
                for &mean in &[0.0, 0.1, 0.3, 0.5] {
                    assert!(
                        cannot_reject_equal_means(mean, mean, n_a, n_b, delta),
                        "equal means ({mean},{mean}) with n_a={n_a} n_b={n_b} delta={delta} was rejected"
                    );
                }
            }
        }
    }

    #[test]
    fn very_different_means_with_large_samples_are_rejected() {
        assert!(!cannot_reject_equal_means(0.05, 0.95, 10_000, 10_000, 0.05));
    }
}
