//! Core trait definition for allocation strategies.

use std::collections::BTreeMap;

use ronda_core::Result;
use serde::{Deserialize, Serialize};

use crate::portfolio::{AssetStats, CorrelationMatrix, Weights};

/// A suggested single-step reallocation of a portfolio.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllocationRecommendation {
    /// The weights the portfolio currently holds.
    pub current_weights: Weights,
    /// The suggested weights; same asset set, summing to 1 within tolerance.
    pub suggested_weights: Weights,
    /// Diversification score of the current portfolio, in [0, 1].
    pub diversification_score: f64,
    /// Expected annual return of the suggested portfolio.
    pub expected_return: f64,
    /// Expected annual volatility of the suggested portfolio.
    pub expected_volatility: f64,
    /// Human-readable tags describing the dominant shifts.
    pub rationale: Vec<String>,
}

/// Produces reallocation suggestions from per-asset statistics.
///
/// Implementors define different rebalancing strategies behind the same
/// contract. All implementations must be thread-safe (`Send + Sync`) and
/// deterministic: identical inputs must produce identical suggestions.
pub trait Allocator: Send + Sync {
    /// Suggest a reallocation for the given portfolio.
    ///
    /// # Arguments
    ///
    /// * `weights` - Current asset weights, summing to 1 within tolerance
    /// * `stats` - Expected return and volatility per asset
    /// * `correlations` - Pairwise correlation matrix over the same assets
    ///
    /// # Errors
    ///
    /// Returns an error if the weights violate the allocation invariants,
    /// statistics are missing for a weighted asset, or the correlation
    /// matrix does not match the asset set.
    fn rebalance(
        &self,
        weights: &Weights,
        stats: &BTreeMap<String, AssetStats>,
        correlations: &CorrelationMatrix,
    ) -> Result<AllocationRecommendation>;

    /// Name of this allocation strategy.
    fn name(&self) -> &str;
}
