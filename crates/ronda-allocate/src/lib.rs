//! Allocation scoring and reallocation suggestions for fund portfolios.
//!
//! This crate provides the portfolio side of the analytics engine:
//! - validated portfolio inputs (weights, per-asset summaries, correlations)
//! - a diversification score derived from allocation-weighted correlation
//! - reallocation strategies behind the [`Allocator`] trait, with the
//!   step-limited heuristic as the default implementation
//!
//! The heuristic is a documented single-step improvement, not a
//! mean-variance optimizer; identical inputs always produce identical
//! suggestions.

pub mod allocator;
pub mod heuristic;
pub mod portfolio;

// Re-export main types
pub use allocator::{AllocationRecommendation, Allocator};
pub use heuristic::{AllocatorConfig, StepLimitedAllocator};
pub use portfolio::{
    AssetStats, CorrelationMatrix, WEIGHT_SUM_TOLERANCE, Weights, check_alignment,
    diversification_score, portfolio_moments, validate_weights,
};
