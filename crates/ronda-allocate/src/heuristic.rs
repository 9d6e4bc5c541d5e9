//! Step-limited reallocation heuristic.
//!
//! This is a deterministic single-step improvement, not a mean-variance
//! optimizer: it moves a bounded amount of allocation mass from assets with
//! poor risk-adjusted contribution toward assets with favorable contribution,
//! and keeps the suggested weights summing to 1.

use std::collections::BTreeMap;

use ronda_core::stats::MIN_STD_THRESHOLD;
use ronda_core::{Result, RondaError};
use serde::{Deserialize, Serialize};

use crate::allocator::{AllocationRecommendation, Allocator};
use crate::portfolio::{
    self, AssetStats, CorrelationMatrix, Weights,
};

/// Configuration for the step-limited reallocation heuristic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllocatorConfig {
    /// Largest per-asset weight change in a single suggestion.
    pub max_step: f64,
    /// Lower bound on any suggested weight.
    pub min_weight: f64,
    /// Upper bound on any suggested weight.
    pub max_weight: f64,
    /// Penalty applied to an asset's weighted correlation with the rest of
    /// the portfolio when scoring its contribution.
    pub correlation_penalty: f64,
    /// Scaling from contribution-score spread to raw weight change.
    pub intensity: f64,
}

impl Default for AllocatorConfig {
    fn default() -> Self {
        Self {
            max_step: 0.05,
            min_weight: 0.0,
            max_weight: 1.0,
            correlation_penalty: 0.5,
            intensity: 0.5,
        }
    }
}

/// Deterministic single-step allocation heuristic.
///
/// Each asset is scored by excess return per unit of volatility minus a
/// penalty for its allocation-weighted correlation with the rest of the
/// portfolio. Mass moves from below-average to above-average assets; every
/// per-asset change is clamped to the configured step size and weight
/// bounds, and donated and received mass are balanced so the suggested
/// weights still sum to 1.
///
/// # Example
///
/// ```rust,ignore
/// use ronda_allocate::{Allocator, AllocatorConfig, StepLimitedAllocator};
///
/// let allocator = StepLimitedAllocator::new(AllocatorConfig::default());
/// let recommendation = allocator.rebalance(&weights, &stats, &correlations)?;
/// println!("{:?}", recommendation.suggested_weights);
/// ```
#[derive(Debug, Clone, Default)]
pub struct StepLimitedAllocator {
    config: AllocatorConfig,
}

impl StepLimitedAllocator {
    /// Create an allocator with the given configuration.
    #[must_use]
    pub const fn new(config: AllocatorConfig) -> Self {
        Self { config }
    }

    /// The configuration this allocator runs with.
    #[must_use]
    pub const fn config(&self) -> &AllocatorConfig {
        &self.config
    }

    fn validate_config(&self) -> Result<()> {
        let c = &self.config;
        if !c.max_step.is_finite() || !(0.0..=1.0).contains(&c.max_step) {
            return Err(RondaError::InvalidInput(format!(
                "max step must be in [0, 1], got {}",
                c.max_step
            )));
        }
        if c.min_weight < 0.0 || c.max_weight > 1.0 || c.min_weight > c.max_weight {
            return Err(RondaError::InvalidInput(format!(
                "weight bounds must satisfy 0 <= min <= max <= 1, got [{}, {}]",
                c.min_weight, c.max_weight
            )));
        }
        Ok(())
    }

    /// Contribution score of each asset: risk-adjusted return minus the
    /// correlation penalty. Asset order follows the weight map.
    fn contribution_scores(
        &self,
        weights: &Weights,
        stats: &BTreeMap<String, AssetStats>,
        correlations: &CorrelationMatrix,
    ) -> Result<Vec<f64>> {
        let mut scores = Vec::with_capacity(weights.len());

        for asset in weights.keys() {
            let s = stats.get(asset).ok_or_else(|| {
                RondaError::InvalidInput(format!("missing statistics for asset {asset}"))
            })?;
            if !s.expected_return.is_finite() || !s.volatility.is_finite() || s.volatility < 0.0 {
                return Err(RondaError::InvalidInput(format!(
                    "invalid statistics for asset {asset}"
                )));
            }

            let risk_adjusted = if s.volatility > MIN_STD_THRESHOLD {
                s.expected_return / s.volatility
            } else {
                0.0
            };

            // Allocation-weighted correlation with the rest of the portfolio.
            // Alignment was checked by the caller, so the lookup succeeds.
            let i = correlations.index_of(asset).ok_or_else(|| {
                RondaError::InvalidInput(format!("correlation matrix does not cover asset {asset}"))
            })?;
            let mut corr = 0.0;
            let mut mass = 0.0;
            for (other, &w_other) in weights {
                if other == asset {
                    continue;
                }
                if let Some(j) = correlations.index_of(other) {
                    corr += w_other * correlations.correlation(i, j);
                    mass += w_other;
                }
            }
            let portfolio_corr = if mass > f64::EPSILON { corr / mass } else { 0.0 };

            scores.push(risk_adjusted - self.config.correlation_penalty * portfolio_corr);
        }

        Ok(scores)
    }
}

impl Allocator for StepLimitedAllocator {
    fn rebalance(
        &self,
        weights: &Weights,
        stats: &BTreeMap<String, AssetStats>,
        correlations: &CorrelationMatrix,
    ) -> Result<AllocationRecommendation> {
        self.validate_config()?;
        portfolio::validate_weights(weights)?;
        portfolio::check_alignment(weights, correlations)?;

        let diversification = portfolio::diversification_score(weights, correlations)?;
        let scores = self.contribution_scores(weights, stats, correlations)?;

        let names: Vec<&String> = weights.keys().collect();
        let current: Vec<f64> = weights.values().copied().collect();

        let weighted_mean_score: f64 = current
            .iter()
            .zip(&scores)
            .map(|(w, s)| w * s)
            .sum();

        // Raw deltas, clamped to the step size and the per-asset bounds.
        let deltas: Vec<f64> = current
            .iter()
            .zip(&scores)
            .map(|(&w, &s)| {
                let raw = self.config.intensity * (s - weighted_mean_score);
                raw.clamp(-self.config.max_step, self.config.max_step)
                    .clamp(self.config.min_weight - w, self.config.max_weight - w)
            })
            .collect();

        let gain: f64 = deltas.iter().filter(|d| **d > 0.0).sum();
        let drain: f64 = -deltas.iter().filter(|d| **d < 0.0).sum::<f64>();
        let transfer = gain.min(drain);

        let mut suggested = weights.clone();
        let mut rationale = Vec::new();

        if transfer > 1e-12 {
            // Scale both sides down to the common transferable mass so the
            // suggestion still sums to 1.
            for ((name, &w), &delta) in names.iter().zip(&current).zip(&deltas) {
                let applied = if delta > 0.0 {
                    delta * transfer / gain
                } else {
                    delta * transfer / drain
                };
                suggested.insert((*name).clone(), (w + applied).clamp(0.0, 1.0));
            }

            // Absorb floating-point residue into the largest position.
            let residual = 1.0 - suggested.values().sum::<f64>();
            if residual != 0.0 {
                let largest = suggested
                    .iter()
                    .max_by(|a, b| a.1.partial_cmp(b.1).unwrap_or(std::cmp::Ordering::Equal))
                    .map(|(k, _)| k.clone());
                if let Some(key) = largest
                    && let Some(w) = suggested.get_mut(&key)
                {
                    *w += residual;
                }
            }

            let top_receiver = deltas
                .iter()
                .enumerate()
                .max_by(|a, b| a.1.partial_cmp(b.1).unwrap_or(std::cmp::Ordering::Equal));
            if let Some((i, &d)) = top_receiver
                && d > 0.0
            {
                rationale.push(format!(
                    "increase {}: favorable risk-adjusted contribution",
                    names[i]
                ));
            }

            let top_donor = deltas
                .iter()
                .enumerate()
                .min_by(|a, b| a.1.partial_cmp(b.1).unwrap_or(std::cmp::Ordering::Equal));
            if let Some((i, &d)) = top_donor
                && d < 0.0
            {
                rationale.push(format!(
                    "reduce {}: weak risk-adjusted contribution",
                    names[i]
                ));
            }

            if diversification < 0.25 {
                rationale.push("high correlation across holdings limits diversification".to_string());
            }
        } else {
            rationale.push("hold: allocation already balanced".to_string());
        }

        let (expected_return, expected_volatility) =
            portfolio::portfolio_moments(&suggested, stats, correlations)?;

        Ok(AllocationRecommendation {
            current_weights: weights.clone(),
            suggested_weights: suggested,
            diversification_score: diversification,
            expected_return,
            expected_volatility,
            rationale,
        })
    }

    fn name(&self) -> &str {
        "step_limited"
    }
}
