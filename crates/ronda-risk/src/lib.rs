//! Risk and performance metrics for fund return series.
//!
//! This crate turns a validated [`ronda_core::ReturnSeries`] into a
//! [`RiskMetricsResult`]:
//! - total and geometrically annualized return, annualized volatility
//! - Sharpe, Sortino and Treynor ratios with explicit undefined markers
//! - historical VaR and expected shortfall as positive loss magnitudes
//! - maximum drawdown, drawdown length and recovery flag
//!
//! # Example
//!
//! ```rust,ignore
//! use ronda_risk::{RiskCalculator, RiskConfig};
//!
//! let calculator = RiskCalculator::new(RiskConfig::default());
//! let metrics = calculator.calculate(&series, Some(&benchmark))?;
//! println!("Sharpe: {:?}", metrics.sharpe_ratio);
//! ```

pub mod drawdown;
pub mod metrics;
pub mod var;

// Re-export main types
pub use drawdown::Drawdown;
pub use metrics::{RiskCalculator, RiskConfig, RiskMetricsResult};
pub use var::{expected_shortfall, historical_var};
