#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/rondalabs/ronda/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! # ronda
//!
//! Risk analytics and anomaly detection engine for fund return series.
//!
//! ronda is an umbrella crate that re-exports all ronda sub-crates for
//! convenience. It provides a unified API for computing risk metrics,
//! flagging anomalous observations, scoring allocations, and assembling
//! analytics reports.
//!
//! ## Quick Start
//!
//! ```ignore
//! use chrono::Utc;
//! use ronda::prelude::*;
//! use ronda::report::ReportBuilder;
//!
//! # fn main() -> ronda::Result<()> {
//! // Build a validated return series
//! let series = ReturnSeries::new("GLOBAL-EQ", Frequency::Monthly, observations)?;
//!
//! // Risk metrics for one fund
//! let metrics = RiskCalculator::new(RiskConfig::default()).calculate(&series, None)?;
//!
//! // Or the full report across funds
//! let report = ReportBuilder::default().build(&[series], None, None, Utc::now());
//! # Ok(())
//! # }
//! ```
//!
//! ## Crate Organization
//!
//! - [`core`] - Data model ([`ReturnSeries`], [`Frequency`]) and error taxonomy
//! - [`risk`] - Risk and performance metrics (ratios, VaR/CVaR, drawdown)
//! - [`anomaly`] - Seeded isolation-forest anomaly detection
//! - [`allocate`] - Diversification scoring and reallocation heuristics
//! - [`report`] - Report aggregation over the engine crates
//!
//! ## Architecture
//!
//! ronda follows a modular architecture:
//!
//! 1. **ReturnSeries** validates and carries the per-fund observations
//! 2. **Calculators** derive risk/performance statistics per fund
//! 3. **Detectors** score observations for anomalies, fully seeded
//! 4. **Allocators** suggest bounded reallocations across assets
//! 5. **Reports** compose all of the above into one immutable structure
//!
//! Every computation takes its configuration as explicit parameters and
//! shares no mutable state, so concurrent callers need no coordination.

/// Version information for the ronda crate.
///
/// This constant contains the current version of ronda as specified in Cargo.toml.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// ============================================================================
// Core Types
// ============================================================================

/// Core data model and error taxonomy.
///
/// This module re-exports the foundational types that define the ronda API:
///
/// - [`ReturnSeries`] - Validated, timestamped periodic returns for one fund
/// - [`Frequency`] - Sampling frequency with annualization factors
/// - [`RondaError`] / [`Result`] - The shared error taxonomy
///
/// # Example
///
/// ```ignore
/// use ronda::core::{Frequency, ReturnSeries};
/// ```
pub mod core {
    pub use ronda_core::*;
}

// Re-export core types at top level for convenience
pub use ronda_core::{Date, Frequency, Result, ReturnSeries, RondaError};

// ============================================================================
// Risk Metrics
// ============================================================================

/// Risk and performance metrics.
///
/// This module re-exports the [`ronda_risk`] crate:
///
/// - [`RiskCalculator`](risk::RiskCalculator) with a per-call [`RiskConfig`](risk::RiskConfig)
/// - Historical VaR and expected shortfall as positive loss magnitudes
/// - Drawdown magnitude, duration and recovery flag
///
/// Undefined ratios (zero-volatility Sharpe, downside-free Sortino,
/// benchmark-free Treynor) are explicit `None` markers, never NaN.
pub mod risk {
    pub use ronda_risk::*;
}

pub use ronda_risk::{RiskCalculator, RiskConfig, RiskMetricsResult};

// ============================================================================
// Anomaly Detection
// ============================================================================

/// Anomaly detection with a seeded isolation forest.
///
/// This module re-exports the [`ronda_anomaly`] crate:
///
/// - [`AnomalyDetector`](anomaly::AnomalyDetector) with contamination-rate flagging
/// - [`FeatureExtractor`](anomaly::FeatureExtractor) trait with a default
///   return + rolling-statistics feature set
/// - [`IsolationForest`](anomaly::IsolationForest) with index-arena trees and
///   per-tree seeded PRNG streams
///
/// Identical input, seed and contamination rate produce identical output at
/// any degree of parallelism.
pub mod anomaly {
    pub use ronda_anomaly::*;
}

pub use ronda_anomaly::{AnomalyDetector, AnomalyResult, DetectorConfig};

// ============================================================================
// Allocation
// ============================================================================

/// Diversification scoring and reallocation suggestions.
///
/// This module re-exports the [`ronda_allocate`] crate:
///
/// - [`Allocator`](allocate::Allocator) trait for swappable strategies
/// - [`StepLimitedAllocator`](allocate::StepLimitedAllocator), a deterministic
///   single-step heuristic with bounded per-asset weight changes
/// - Validated portfolio inputs ([`CorrelationMatrix`](allocate::CorrelationMatrix),
///   weights, per-asset statistics)
pub mod allocate {
    pub use ronda_allocate::*;
}

pub use ronda_allocate::{AllocationRecommendation, Allocator, StepLimitedAllocator};

// ============================================================================
// Reports
// ============================================================================

/// Report aggregation over the engine crates.
///
/// This module re-exports the [`ronda_report`] crate:
///
/// - [`ReportBuilder`](report::ReportBuilder) composing risk, anomaly and
///   allocation results
/// - [`AnalyticsReport`](report::AnalyticsReport) with per-fund sections and
///   cross-fund summary statistics
///
/// A failure in any sub-computation aborts the whole report with the
/// originating section attached; partial reports are never produced.
pub mod report {
    pub use ronda_report::*;
}

pub use ronda_report::{AnalyticsReport, ReportBuilder};

// ============================================================================
// Prelude
// ============================================================================

/// Prelude module for convenient imports.
///
/// This module re-exports the most commonly used types for working with
/// ronda. Import it with:
///
/// ```ignore
/// use ronda::prelude::*;
/// ```
///
/// This brings into scope:
/// - Data model: [`ReturnSeries`], [`Frequency`], [`Date`]
/// - Calculators: [`RiskCalculator`], [`RiskConfig`], [`AnomalyDetector`],
///   [`DetectorConfig`], [`StepLimitedAllocator`], [`Allocator`]
/// - Error types: [`Result`], [`RondaError`]
pub mod prelude {
    pub use crate::{
        AnalyticsReport, AnomalyDetector, AnomalyResult, Date, DetectorConfig, Frequency,
        ReportBuilder, Result, ReturnSeries, RiskCalculator, RiskConfig, RiskMetricsResult,
        RondaError, StepLimitedAllocator,
    };
    pub use ronda_allocate::Allocator;
    pub use ronda_anomaly::FeatureExtractor;
}

// ============================================================================
// Tests
// ============================================================================
