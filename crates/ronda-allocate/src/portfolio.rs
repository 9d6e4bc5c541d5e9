//! Portfolio inputs: weights, per-asset summaries and correlations.

use std::collections::BTreeMap;

use ndarray::Array2;
use ronda_core::{Result, RondaError};
use serde::{Deserialize, Serialize};

/// Tolerance on the weight-sum invariant.
pub const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

/// Asset weights as fractions of the portfolio.
///
/// A `BTreeMap` keeps asset iteration order deterministic, which the
/// allocation heuristic relies on.
pub type Weights = BTreeMap<String, f64>;

/// Per-asset risk/return summary consumed by the optimizer.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AssetStats {
    /// Annualized expected return of the asset.
    pub expected_return: f64,
    /// Annualized volatility of the asset.
    pub volatility: f64,
}

/// A validated pairwise correlation matrix over a fixed asset order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorrelationMatrix {
    assets: Vec<String>,
    values: Array2<f64>,
}

impl CorrelationMatrix {
    /// Create a validated correlation matrix.
    ///
    /// # Errors
    ///
    /// [`RondaError::DimensionMismatch`] when the matrix is not square with
    /// one row per asset; [`RondaError::InvalidInput`] for entries outside
    /// [-1, 1], a diagonal away from 1, or an asymmetric matrix.
    pub fn new(assets: Vec<String>, values: Array2<f64>) -> Result<Self> {
        let n = assets.len();
        if values.nrows() != n {
            return Err(RondaError::DimensionMismatch {
                expected: n,
                actual: values.nrows(),
            });
        }
        if values.ncols() != n {
            return Err(RondaError::DimensionMismatch {
                expected: n,
                actual: values.ncols(),
            });
        }

        for i in 0..n {
            for j in 0..n {
                let v = values[[i, j]];
                if !v.is_finite() || v < -1.0 - 1e-9 || v > 1.0 + 1e-9 {
                    return Err(RondaError::InvalidInput(format!(
                        "correlation between {} and {} out of range: {v}",
                        assets[i], assets[j]
                    )));
                }
                if (v - values[[j, i]]).abs() > 1e-8 {
                    return Err(RondaError::InvalidInput(format!(
                        "correlation matrix not symmetric at ({}, {})",
                        assets[i], assets[j]
                    )));
                }
            }
            if (values[[i, i]] - 1.0).abs() > 1e-6 {
                return Err(RondaError::InvalidInput(format!(
                    "correlation of {} with itself must be 1, got {}",
                    assets[i],
                    values[[i, i]]
                )));
            }
        }

        Ok(Self { assets, values })
    }

    /// Asset names in matrix order.
    #[must_use]
    pub fn assets(&self) -> &[String] {
        &self.assets
    }

    /// Number of assets covered by the matrix.
    #[must_use]
    pub fn len(&self) -> usize {
        self.assets.len()
    }

    /// Whether the matrix covers no assets.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    /// Position of an asset in the matrix order.
    #[must_use]
    pub fn index_of(&self, asset: &str) -> Option<usize> {
        self.assets.iter().position(|a| a == asset)
    }

    /// Pairwise correlation by matrix position.
    #[must_use]
    pub fn correlation(&self, i: usize, j: usize) -> f64 {
        self.values[[i, j]]
    }
}

/// Validate the allocation invariants on a weight map.
///
/// # Errors
///
/// [`RondaError::InconsistentAllocation`] when the map is empty, a weight is
/// outside [0, 1], or the weights do not sum to 1 within
/// [`WEIGHT_SUM_TOLERANCE`].
pub fn validate_weights(weights: &Weights) -> Result<()> {
    if weights.is_empty() {
        return Err(RondaError::InconsistentAllocation(
            "no assets in the allocation".to_string(),
        ));
    }

    for (asset, &w) in weights {
        if !w.is_finite() || !(-WEIGHT_SUM_TOLERANCE..=1.0 + WEIGHT_SUM_TOLERANCE).contains(&w) {
            return Err(RondaError::InconsistentAllocation(format!(
                "weight of {asset} must be in [0, 1], got {w}"
            )));
        }
    }

    let sum: f64 = weights.values().sum();
    if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
        return Err(RondaError::InconsistentAllocation(format!(
            "weights must sum to 1, got {sum}"
        )));
    }

    Ok(())
}

/// Check that a correlation matrix covers exactly the weighted assets.
///
/// # Errors
///
/// [`RondaError::DimensionMismatch`] on a size difference,
/// [`RondaError::InvalidInput`] when the asset names differ.
pub fn check_alignment(weights: &Weights, correlations: &CorrelationMatrix) -> Result<()> {
    if correlations.len() != weights.len() {
        return Err(RondaError::DimensionMismatch {
            expected: weights.len(),
            actual: correlations.len(),
        });
    }
    for asset in weights.keys() {
        if correlations.index_of(asset).is_none() {
            return Err(RondaError::InvalidInput(format!(
                "correlation matrix does not cover asset {asset}"
            )));
        }
    }
    Ok(())
}

/// Diversification score of a weighted portfolio, in [0, 1].
///
/// The score is a decreasing function of the allocation-weighted mean
/// pairwise correlation: `(1 - mean_correlation) / 2`. A portfolio
/// concentrated in one asset scores 0.
///
/// # Errors
///
/// Propagates alignment errors from [`check_alignment`].
pub fn diversification_score(weights: &Weights, correlations: &CorrelationMatrix) -> Result<f64> {
    check_alignment(weights, correlations)?;

    if weights.len() < 2 {
        return Ok(0.0);
    }

    let mut weighted_corr = 0.0;
    let mut weight_mass = 0.0;
    for (a, &wa) in weights {
        for (b, &wb) in weights {
            if a == b {
                continue;
            }
            // Alignment was checked above, so both lookups succeed.
            let (Some(i), Some(j)) = (correlations.index_of(a), correlations.index_of(b)) else {
                continue;
            };
            weighted_corr += wa * wb * correlations.correlation(i, j);
            weight_mass += wa * wb;
        }
    }

    if weight_mass <= f64::EPSILON {
        // All mass sits on a single asset.
        return Ok(0.0);
    }

    let mean_correlation = weighted_corr / weight_mass;
    Ok(((1.0 - mean_correlation) / 2.0).clamp(0.0, 1.0))
}

/// Expected return and volatility of a weighted portfolio.
///
/// Volatility combines per-asset volatilities through the correlation
/// matrix; a numerically negative variance from rounding clamps to zero.
///
/// # Errors
///
/// [`RondaError::InvalidInput`] when statistics are missing for a weighted
/// asset; propagates alignment errors.
pub fn portfolio_moments(
    weights: &Weights,
    stats: &BTreeMap<String, AssetStats>,
    correlations: &CorrelationMatrix,
) -> Result<(f64, f64)> {
    check_alignment(weights, correlations)?;

    let mut expected_return = 0.0;
    for (asset, &w) in weights {
        let s = stats.get(asset).ok_or_else(|| {
            RondaError::InvalidInput(format!("missing statistics for asset {asset}"))
        })?;
        expected_return += w * s.expected_return;
    }

    let mut variance = 0.0;
    for (a, &wa) in weights {
        for (b, &wb) in weights {
            let (Some(i), Some(j)) = (correlations.index_of(a), correlations.index_of(b)) else {
                continue;
            };
            let (Some(sa), Some(sb)) = (stats.get(a), stats.get(b)) else {
                continue;
            };
            variance += wa * wb * correlations.correlation(i, j) * sa.volatility * sb.volatility;
        }
    }

    Ok((expected_return, variance.max(0.0).sqrt()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    fn two_assets(correlation: f64) -> CorrelationMatrix {
        CorrelationMatrix::new(
            vec!["A".to_string(), "B".to_string()],
            array![[1.0, correlation], [correlation, 1.0]],
        )
        .unwrap()
    }

    fn weights_of(pairs: &[(&str, f64)]) -> Weights {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn test_validate_weights_accepts_unit_sum() {
        let weights = weights_of(&[("A", 0.6), ("B", 0.4)]);
        assert!(validate_weights(&weights).is_ok());
    }

    #[test]
    fn test_validate_weights_rejects_bad_sum() {
        let weights = weights_of(&[("A", 0.6), ("B", 0.3)]);
        assert!(matches!(
            validate_weights(&weights),
            Err(RondaError::InconsistentAllocation(_))
        ));
    }

    #[test]
    fn test_validate_weights_rejects_negative() {
        let weights = weights_of(&[("A", 1.2), ("B", -0.2)]);
        assert!(matches!(
            validate_weights(&weights),
            Err(RondaError::InconsistentAllocation(_))
        ));
    }

    #[test]
    fn test_validate_weights_rejects_empty() {
        assert!(matches!(
            validate_weights(&Weights::new()),
            Err(RondaError::InconsistentAllocation(_))
        ));
    }

    #[test]
    fn test_correlation_matrix_rejects_wrong_shape() {
        let result = CorrelationMatrix::new(
            vec!["A".to_string(), "B".to_string(), "C".to_string()],
            array![[1.0, 0.5], [0.5, 1.0]],
        );
        assert!(matches!(result, Err(RondaError::DimensionMismatch { .. })));
    }

    #[test]
    fn test_correlation_matrix_rejects_asymmetry() {
        let result = CorrelationMatrix::new(
            vec!["A".to_string(), "B".to_string()],
            array![[1.0, 0.5], [0.2, 1.0]],
        );
        assert!(matches!(result, Err(RondaError::InvalidInput(_))));
    }

    #[test]
    fn test_correlation_matrix_rejects_bad_diagonal() {
        let result = CorrelationMatrix::new(
            vec!["A".to_string(), "B".to_string()],
            array![[0.9, 0.5], [0.5, 1.0]],
        );
        assert!(matches!(result, Err(RondaError::InvalidInput(_))));
    }

    #[test]
    fn test_alignment_size_mismatch() {
        let weights = weights_of(&[("A", 0.5), ("B", 0.3), ("C", 0.2)]);
        let matrix = two_assets(0.5);
        assert!(matches!(
            check_alignment(&weights, &matrix),
            Err(RondaError::DimensionMismatch {
                expected: 3,
                actual: 2
            })
        ));
    }

    #[test]
    fn test_alignment_name_mismatch() {
        let weights = weights_of(&[("A", 0.5), ("X", 0.5)]);
        let matrix = two_assets(0.5);
        assert!(matches!(
            check_alignment(&weights, &matrix),
            Err(RondaError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_diversification_score_equal_split() {
        let weights = weights_of(&[("A", 0.5), ("B", 0.5)]);
        // Perfectly correlated pair: no diversification benefit.
        assert_relative_eq!(
            diversification_score(&weights, &two_assets(1.0)).unwrap(),
            0.0
        );
        // Uncorrelated pair sits at the midpoint of the score range.
        assert_relative_eq!(
            diversification_score(&weights, &two_assets(0.0)).unwrap(),
            0.5
        );
        // Perfect hedge maxes the score.
        assert_relative_eq!(
            diversification_score(&weights, &two_assets(-1.0)).unwrap(),
            1.0
        );
    }

    #[test]
    fn test_diversification_score_decreases_with_correlation() {
        let weights = weights_of(&[("A", 0.5), ("B", 0.5)]);
        let low = diversification_score(&weights, &two_assets(0.2)).unwrap();
        let high = diversification_score(&weights, &two_assets(0.9)).unwrap();
        assert!(low > high);
    }

    #[test]
    fn test_single_asset_scores_zero() {
        let weights = weights_of(&[("A", 1.0)]);
        let matrix = CorrelationMatrix::new(vec!["A".to_string()], array![[1.0]]).unwrap();
        assert_eq!(diversification_score(&weights, &matrix).unwrap(), 0.0);
    }

    #[test]
    fn test_portfolio_moments() {
        let weights = weights_of(&[("A", 0.5), ("B", 0.5)]);
        let stats: BTreeMap<String, AssetStats> = [
            (
                "A".to_string(),
                AssetStats {
                    expected_return: 0.08,
                    volatility: 0.10,
                },
            ),
            (
                "B".to_string(),
                AssetStats {
                    expected_return: 0.04,
                    volatility: 0.20,
                },
            ),
        ]
        .into();

        let (er, vol) = portfolio_moments(&weights, &stats, &two_assets(0.0)).unwrap();
        assert_relative_eq!(er, 0.06, epsilon = 1e-12);
        // Uncorrelated: vol = sqrt(0.25 * 0.01 + 0.25 * 0.04)
        assert_relative_eq!(vol, (0.25_f64 * 0.05).sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn test_portfolio_moments_missing_stats() {
        let weights = weights_of(&[("A", 0.5), ("B", 0.5)]);
        let stats = BTreeMap::new();
        assert!(matches!(
            portfolio_moments(&weights, &stats, &two_assets(0.0)),
            Err(RondaError::InvalidInput(_))
        ));
    }
}
