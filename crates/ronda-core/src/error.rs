//! Error types for the Ronda engine.
//!
//! Every engine computation validates its own preconditions before doing any
//! work and fails immediately with one of the kinds below. Undefined ratios
//! (zero-volatility Sharpe, no downside observations for Sortino) are not
//! errors; they surface as `None` fields on the result structs.

use thiserror::Error;

/// The main error type for Ronda computations.
#[derive(Debug, Error)]
pub enum RondaError {
    /// Input data is malformed: non-finite values, non-monotonic timestamps,
    /// out-of-range configuration values.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Fewer observations than the requested statistic needs.
    #[error("Insufficient data: {context} requires at least {required} observations, got {actual}")]
    InsufficientData {
        /// Minimum number of observations for the statistic.
        required: usize,
        /// Number of observations actually supplied.
        actual: usize,
        /// The statistic that was requested.
        context: &'static str,
    },

    /// A benchmark-relative statistic was requested without a benchmark series.
    #[error("Benchmark series required: {0}")]
    BenchmarkRequired(String),

    /// Portfolio weights do not satisfy the allocation invariants
    /// (each weight in [0, 1], weights summing to 1 within tolerance).
    #[error("Inconsistent allocation: {0}")]
    InconsistentAllocation(String),

    /// A matrix or aligned series does not match the expected dimension.
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Expected dimension.
        expected: usize,
        /// Dimension actually supplied.
        actual: usize,
    },
}

/// A specialized Result type for Ronda computations.
///
/// This is a convenience type that uses [`RondaError`] as the error type.
pub type Result<T> = std::result::Result<T, RondaError>;
