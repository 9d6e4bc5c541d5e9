//! Statistical helpers shared across the engine crates.
//!
//! Small, allocation-free moment calculations used by the risk metrics,
//! the anomaly feature extractors, and the allocation heuristic.

/// Minimum threshold for standard deviation to avoid division by zero.
/// Values below this threshold are treated as zero variance.
pub const MIN_STD_THRESHOLD: f64 = 1e-10;

/// Arithmetic mean of a slice.
///
/// Returns `f64::NAN` for an empty slice; callers working with validated
/// [`ReturnSeries`](crate::ReturnSeries) data never hit that case.
#[must_use]
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample variance with N-1 denominator (Bessel's correction).
///
/// Returns `None` for fewer than two values, where the sample variance is
/// undefined.
#[must_use]
pub fn sample_variance(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let m = mean(values);
    let variance =
        values.iter().map(|x| (x - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    Some(variance)
}

/// Sample standard deviation with N-1 denominator.
#[must_use]
pub fn sample_std(values: &[f64]) -> Option<f64> {
    sample_variance(values).map(f64::sqrt)
}

/// Sample covariance between two equally-long slices (N-1 denominator).
///
/// Returns `None` for fewer than two observations or mismatched lengths.
#[must_use]
pub fn sample_covariance(x: &[f64], y: &[f64]) -> Option<f64> {
    if x.len() != y.len() || x.len() < 2 {
        return None;
    }
    let mx = mean(x);
    let my = mean(y);
    let cov = x
        .iter()
        .zip(y.iter())
        .map(|(a, b)| (a - mx) * (b - my))
        .sum::<f64>()
        / (x.len() - 1) as f64;
    Some(cov)
}

/// Z-score of a value against a reference window.
///
/// Returns 0.0 when the window variance is below [`MIN_STD_THRESHOLD`], so a
/// flat window never produces NaN or infinity.
#[must_use]
pub fn zscore(value: f64, window: &[f64]) -> f64 {
    let Some(std) = sample_std(window) else {
        return 0.0;
    };
    if std > MIN_STD_THRESHOLD {
        (value - mean(window)) / std
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_mean_basic() {
        assert_relative_eq!(mean(&[1.0, 2.0, 3.0, 4.0, 5.0]), 3.0);
        assert_relative_eq!(mean(&[-2.0, 2.0]), 0.0);
    }

    #[test]
    fn test_mean_empty_is_nan() {
        assert!(mean(&[]).is_nan());
    }

    #[test]
    fn test_sample_variance_bessel() {
        // Variance of [1..5] with N-1 denominator is 2.5.
        let var = sample_variance(&[1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();
        assert_relative_eq!(var, 2.5);
    }

    #[test]
    fn test_sample_variance_undefined_below_two() {
        assert!(sample_variance(&[]).is_none());
        assert!(sample_variance(&[42.0]).is_none());
    }

    #[test]
    fn test_sample_std_constant_values() {
        let std = sample_std(&[5.0, 5.0, 5.0, 5.0]).unwrap();
        assert_relative_eq!(std, 0.0);
    }

    #[test]
    fn test_sample_covariance_matches_variance() {
        let x = [1.0, 2.0, 3.0, 4.0, 5.0];
        let cov = sample_covariance(&x, &x).unwrap();
        assert_relative_eq!(cov, sample_variance(&x).unwrap());
    }

    #[test]
    fn test_sample_covariance_mismatched_lengths() {
        assert!(sample_covariance(&[1.0, 2.0], &[1.0]).is_none());
    }

    #[test]
    fn test_zscore_basic() {
        let window = [1.0, 2.0, 3.0, 4.0, 5.0];
        // std = sqrt(2.5), mean = 3.0
        assert_relative_eq!(zscore(5.0, &window), 2.0 / 2.5_f64.sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn test_zscore_flat_window() {
        assert_eq!(zscore(7.0, &[5.0, 5.0, 5.0]), 0.0);
        assert_eq!(zscore(7.0, &[5.0]), 0.0);
    }

    #[test]
    fn test_zscore_of_window_mean_is_zero() {
        let window = [0.01, 0.03, 0.02, 0.04];
        assert_relative_eq!(zscore(0.025, &window), 0.0, epsilon = 1e-12);
    }
}
