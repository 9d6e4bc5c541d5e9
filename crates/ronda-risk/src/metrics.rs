//! Risk-adjusted performance metrics.
//!
//! [`RiskCalculator`] turns a [`ReturnSeries`] (and an optional benchmark
//! series) into a [`RiskMetricsResult`]. Ratios that are numerically
//! undefined for the given series — zero volatility, no downside
//! observations, no benchmark — come back as `None`, never as NaN or a
//! fabricated zero.

use ronda_core::stats::{MIN_STD_THRESHOLD, sample_covariance, sample_std, sample_variance};
use ronda_core::{Result, ReturnSeries, RondaError};
use serde::{Deserialize, Serialize};

use crate::drawdown::{self, Drawdown};
use crate::var;

/// Configuration for risk metric calculation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskConfig {
    /// Annual risk-free rate used by Sharpe, Sortino and Treynor.
    pub risk_free_rate: f64,
    /// Confidence level for VaR and expected shortfall.
    pub confidence_level: f64,
    /// Minimum acceptable return per period for the Sortino downside.
    pub minimum_acceptable_return: f64,
    /// Override for the annualization factor; `None` uses the series
    /// frequency's default (e.g. 252 for daily data).
    pub periods_per_year: Option<f64>,
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            risk_free_rate: 0.02,
            confidence_level: 0.95,
            minimum_acceptable_return: 0.0,
            periods_per_year: None,
        }
    }
}

/// Risk and performance statistics for one fund.
///
/// `None` marks a metric that is undefined for the input series, so report
/// consumers can render "N/A" instead of a fabricated number.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskMetricsResult {
    /// Fund the metrics were computed for.
    pub fund_id: String,
    /// Number of observations in the series.
    pub n_observations: usize,
    /// Cumulative return over the whole series.
    pub total_return: f64,
    /// Geometrically annualized return.
    pub annualized_return: f64,
    /// Annualized volatility; undefined below two observations.
    pub annualized_volatility: Option<f64>,
    /// Sharpe ratio; undefined when volatility is zero.
    pub sharpe_ratio: Option<f64>,
    /// Sortino ratio; undefined without downside observations.
    pub sortino_ratio: Option<f64>,
    /// Treynor ratio; undefined without a benchmark or with zero beta.
    pub treynor_ratio: Option<f64>,
    /// Historical VaR as a positive loss magnitude.
    pub value_at_risk: Option<f64>,
    /// Expected shortfall as a positive loss magnitude.
    pub expected_shortfall: Option<f64>,
    /// Drawdown profile of the cumulative path.
    pub drawdown: Drawdown,
    /// Confidence level the tail measures were computed at.
    pub confidence_level: f64,
    /// Risk-free rate the ratios were computed with.
    pub risk_free_rate: f64,
}

/// Stateless calculator for risk and performance metrics.
///
/// # Example
///
/// ```
/// use ronda_core::{Date, Frequency, ReturnSeries};
/// use ronda_risk::{RiskCalculator, RiskConfig};
///
/// let observations = (1..=12)
///     .map(|m| (Date::from_ymd_opt(2024, m, 1).unwrap(), 0.01))
///     .collect();
/// let series = ReturnSeries::new("FUND", Frequency::Monthly, observations).unwrap();
///
/// let calculator = RiskCalculator::new(RiskConfig::default());
/// let metrics = calculator.calculate(&series, None).unwrap();
///
/// assert!(metrics.sharpe_ratio.is_none()); // constant returns, zero volatility
/// assert_eq!(metrics.drawdown.max_drawdown, 0.0);
/// ```
#[derive(Debug, Clone, Default)]
pub struct RiskCalculator {
    config: RiskConfig,
}

impl RiskCalculator {
    /// Create a calculator with the given configuration.
    #[must_use]
    pub const fn new(config: RiskConfig) -> Self {
        Self { config }
    }

    /// The configuration this calculator runs with.
    #[must_use]
    pub const fn config(&self) -> &RiskConfig {
        &self.config
    }

    /// Compute the full metrics set for a series.
    ///
    /// With a single observation only the return figures are defined; every
    /// variance-dependent metric is `None`. The benchmark is optional here:
    /// without one the Treynor ratio is reported as undefined. Use
    /// [`treynor`](Self::treynor) when a missing benchmark should be an error.
    ///
    /// # Errors
    ///
    /// [`RondaError::InvalidInput`] for out-of-range configuration,
    /// [`RondaError::DimensionMismatch`] when the benchmark length differs
    /// from the series length.
    pub fn calculate(
        &self,
        series: &ReturnSeries,
        benchmark: Option<&ReturnSeries>,
    ) -> Result<RiskMetricsResult> {
        let factor = self.annualization_factor(series)?;
        let returns = series.returns();
        let n = returns.len();

        let growth = returns.iter().fold(1.0, |acc, r| acc * (1.0 + r));
        let total_return = growth - 1.0;
        let annualized_return = annualize_return(growth, n, factor);
        let dd = drawdown::analyze(returns);

        let annualized_volatility = sample_std(returns).map(|std| std * factor.sqrt());

        let excess = annualized_return - self.config.risk_free_rate;

        let sharpe_ratio = match annualized_volatility {
            Some(vol) if vol > MIN_STD_THRESHOLD => Some(excess / vol),
            _ => None,
        };

        // Variance-dependent ratios stay undefined below two observations.
        let sortino_ratio = if n >= 2 {
            self.downside_deviation(returns, factor).and_then(|dev| {
                if dev > MIN_STD_THRESHOLD {
                    Some(excess / dev)
                } else {
                    None
                }
            })
        } else {
            None
        };

        let treynor_ratio = match benchmark {
            Some(bench) if n >= 2 => self
                .beta(series, bench)?
                .filter(|beta| beta.abs() > MIN_STD_THRESHOLD)
                .map(|beta| excess / beta),
            _ => None,
        };

        let (value_at_risk, expected_shortfall) = if n >= 2 {
            (
                Some(var::historical_var(returns, self.config.confidence_level)?),
                Some(var::expected_shortfall(returns, self.config.confidence_level)?),
            )
        } else {
            (None, None)
        };

        Ok(RiskMetricsResult {
            fund_id: series.fund_id().to_string(),
            n_observations: n,
            total_return,
            annualized_return,
            annualized_volatility,
            sharpe_ratio,
            sortino_ratio,
            treynor_ratio,
            value_at_risk,
            expected_shortfall,
            drawdown: dd,
            confidence_level: self.config.confidence_level,
            risk_free_rate: self.config.risk_free_rate,
        })
    }

    /// Treynor ratio of the series against a mandatory benchmark.
    ///
    /// Returns `Ok(None)` when beta is numerically zero (flat benchmark or no
    /// covariation), which leaves the ratio undefined.
    ///
    /// # Errors
    ///
    /// [`RondaError::BenchmarkRequired`] when no benchmark is supplied,
    /// [`RondaError::DimensionMismatch`] on misaligned series,
    /// [`RondaError::InsufficientData`] below two observations.
    pub fn treynor(
        &self,
        series: &ReturnSeries,
        benchmark: Option<&ReturnSeries>,
    ) -> Result<Option<f64>> {
        let bench = benchmark
            .ok_or_else(|| RondaError::BenchmarkRequired("Treynor ratio".to_string()))?;

        let factor = self.annualization_factor(series)?;
        let growth = series.returns().iter().fold(1.0, |acc, r| acc * (1.0 + r));
        let annualized_return = annualize_return(growth, series.len(), factor);
        let excess = annualized_return - self.config.risk_free_rate;

        Ok(self
            .beta(series, bench)?
            .filter(|beta| beta.abs() > MIN_STD_THRESHOLD)
            .map(|beta| excess / beta))
    }

    /// Beta of the fund returns against the benchmark returns
    /// (covariance divided by benchmark variance).
    ///
    /// Returns `Ok(None)` when the benchmark variance is numerically zero.
    ///
    /// # Errors
    ///
    /// [`RondaError::DimensionMismatch`] on misaligned series,
    /// [`RondaError::InsufficientData`] below two observations.
    pub fn beta(&self, series: &ReturnSeries, benchmark: &ReturnSeries) -> Result<Option<f64>> {
        if series.len() != benchmark.len() {
            return Err(RondaError::DimensionMismatch {
                expected: series.len(),
                actual: benchmark.len(),
            });
        }
        if series.len() < 2 {
            return Err(RondaError::InsufficientData {
                required: 2,
                actual: series.len(),
                context: "beta",
            });
        }

        let cov = sample_covariance(series.returns(), benchmark.returns());
        let bench_var = sample_variance(benchmark.returns());

        Ok(match (cov, bench_var) {
            (Some(cov), Some(bench_var)) if bench_var > MIN_STD_THRESHOLD => {
                Some(cov / bench_var)
            }
            _ => None,
        })
    }

    /// Annualized downside deviation from returns below the minimum
    /// acceptable return. `None` when no downside observations exist.
    fn downside_deviation(&self, returns: &[f64], factor: f64) -> Option<f64> {
        let mar = self.config.minimum_acceptable_return;
        let downside: Vec<f64> = returns.iter().copied().filter(|&r| r < mar).collect();
        if downside.is_empty() {
            return None;
        }
        let mean_sq =
            downside.iter().map(|r| (r - mar).powi(2)).sum::<f64>() / downside.len() as f64;
        Some(mean_sq.sqrt() * factor.sqrt())
    }

    fn annualization_factor(&self, series: &ReturnSeries) -> Result<f64> {
        let factor = self
            .config
            .periods_per_year
            .unwrap_or_else(|| series.frequency().periods_per_year());
        if factor.is_finite() && factor > 0.0 {
            Ok(factor)
        } else {
            Err(RondaError::InvalidInput(format!(
                "annualization factor must be positive, got {factor}"
            )))
        }
    }
}

/// Geometric annualization of a total growth factor over `n` periods.
///
/// A growth factor at or below zero (compounded wipeout) annualizes to a
/// total loss rather than a NaN.
fn annualize_return(growth: f64, n: usize, factor: f64) -> f64 {
    if growth > 0.0 {
        growth.powf(factor / n as f64) - 1.0
    } else {
        -1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ronda_core::{Date, Frequency};

    fn monthly(fund_id: &str, values: &[f64]) -> ReturnSeries {
        let observations = values
            .iter()
            .enumerate()
            .map(|(i, &v)| {
                let date = Date::from_ymd_opt(2023 + i as i32 / 12, 1 + (i % 12) as u32, 1);
                (date.unwrap(), v)
            })
            .collect();
        ReturnSeries::new(fund_id, Frequency::Monthly, observations).unwrap()
    }

    fn zero_rf() -> RiskConfig {
        RiskConfig {
            risk_free_rate: 0.0,
            ..Default::default()
        }
    }

    #[test]
    fn test_constant_monthly_returns_scenario() {
        // Twelve months of exactly 1%: annualized return is 1.01^12 - 1,
        // volatility is zero, Sharpe is undefined, no drawdown.
        let series = monthly("FUND", &[0.01; 12]);
        let calculator = RiskCalculator::new(zero_rf());
        let metrics = calculator.calculate(&series, None).unwrap();

        assert_relative_eq!(
            metrics.annualized_return,
            1.01_f64.powi(12) - 1.0,
            epsilon = 1e-12
        );
        assert_relative_eq!(metrics.annualized_volatility.unwrap(), 0.0);
        assert!(metrics.sharpe_ratio.is_none());
        assert!(metrics.sortino_ratio.is_none());
        assert_eq!(metrics.drawdown.max_drawdown, 0.0);
    }

    #[test]
    fn test_all_zero_returns_have_undefined_ratios() {
        let series = monthly("FUND", &[0.0; 6]);
        let metrics = RiskCalculator::default().calculate(&series, None).unwrap();

        assert_eq!(metrics.total_return, 0.0);
        assert_relative_eq!(metrics.annualized_volatility.unwrap(), 0.0);
        assert!(metrics.sharpe_ratio.is_none());
        assert!(metrics.sortino_ratio.is_none());
    }

    #[test]
    fn test_single_observation_only_returns_defined() {
        let series = monthly("FUND", &[0.03]);
        let metrics = RiskCalculator::new(zero_rf()).calculate(&series, None).unwrap();

        assert_relative_eq!(metrics.total_return, 0.03, epsilon = 1e-12);
        assert_relative_eq!(
            metrics.annualized_return,
            1.03_f64.powi(12) - 1.0,
            epsilon = 1e-12
        );
        assert!(metrics.annualized_volatility.is_none());
        assert!(metrics.sharpe_ratio.is_none());
        assert!(metrics.sortino_ratio.is_none());
        assert!(metrics.value_at_risk.is_none());
        assert!(metrics.expected_shortfall.is_none());
    }

    #[test]
    fn test_sharpe_positive_for_positive_excess_returns() {
        let series = monthly("FUND", &[0.02, -0.01, 0.03, 0.01, -0.005, 0.015]);
        let metrics = RiskCalculator::new(zero_rf()).calculate(&series, None).unwrap();

        let sharpe = metrics.sharpe_ratio.unwrap();
        assert!(sharpe > 0.0);
        let vol = metrics.annualized_volatility.unwrap();
        assert_relative_eq!(
            sharpe,
            metrics.annualized_return / vol,
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_sortino_uses_downside_only() {
        let series = monthly("FUND", &[0.02, -0.01, 0.03, -0.02, 0.01, 0.015]);
        let metrics = RiskCalculator::new(zero_rf()).calculate(&series, None).unwrap();

        // Two downside observations against six total: the downside deviation
        // is smaller than total volatility, so Sortino exceeds Sharpe here.
        assert!(metrics.sortino_ratio.unwrap() > metrics.sharpe_ratio.unwrap());
    }

    #[test]
    fn test_treynor_requires_benchmark() {
        let series = monthly("FUND", &[0.01, 0.02, -0.01]);
        let calculator = RiskCalculator::default();

        let result = calculator.treynor(&series, None);
        assert!(matches!(result, Err(RondaError::BenchmarkRequired(_))));
    }

    #[test]
    fn test_treynor_against_identical_benchmark() {
        let values = [0.02, -0.01, 0.03, 0.01, -0.02, 0.015];
        let series = monthly("FUND", &values);
        let bench = monthly("BENCH", &values);
        let calculator = RiskCalculator::new(zero_rf());

        // Beta of a series against itself is 1, so Treynor equals the
        // annualized excess return.
        assert_relative_eq!(
            calculator.beta(&series, &bench).unwrap().unwrap(),
            1.0,
            epsilon = 1e-12
        );
        let metrics = calculator.calculate(&series, Some(&bench)).unwrap();
        assert_relative_eq!(
            metrics.treynor_ratio.unwrap(),
            metrics.annualized_return,
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_treynor_undefined_without_benchmark_in_full_calculation() {
        let series = monthly("FUND", &[0.01, 0.02, -0.01]);
        let metrics = RiskCalculator::default().calculate(&series, None).unwrap();
        assert!(metrics.treynor_ratio.is_none());
    }

    #[test]
    fn test_flat_benchmark_leaves_beta_undefined() {
        let series = monthly("FUND", &[0.01, 0.02, -0.01, 0.03]);
        let bench = monthly("BENCH", &[0.005; 4]);
        let calculator = RiskCalculator::default();

        assert!(calculator.beta(&series, &bench).unwrap().is_none());
        let metrics = calculator.calculate(&series, Some(&bench)).unwrap();
        assert!(metrics.treynor_ratio.is_none());
    }

    #[test]
    fn test_misaligned_benchmark_is_rejected() {
        let series = monthly("FUND", &[0.01, 0.02, -0.01]);
        let bench = monthly("BENCH", &[0.01, 0.02]);
        let result = RiskCalculator::default().calculate(&series, Some(&bench));
        assert!(matches!(result, Err(RondaError::DimensionMismatch { .. })));
    }

    #[test]
    fn test_tail_measures_are_consistent() {
        let series = monthly(
            "FUND",
            &[0.01, 0.02, -0.01, 0.03, -0.02, 0.005, -0.015, 0.025],
        );
        let metrics = RiskCalculator::default().calculate(&series, None).unwrap();

        let var = metrics.value_at_risk.unwrap();
        let es = metrics.expected_shortfall.unwrap();
        assert!(var >= 0.0);
        assert!(es >= var);
    }

    #[test]
    fn test_annualization_override() {
        let config = RiskConfig {
            risk_free_rate: 0.0,
            periods_per_year: Some(4.0),
            ..Default::default()
        };
        let series = monthly("FUND", &[0.01; 4]);
        let metrics = RiskCalculator::new(config).calculate(&series, None).unwrap();

        // Four observations at a quarterly factor: one full year.
        assert_relative_eq!(
            metrics.annualized_return,
            metrics.total_return,
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_invalid_annualization_factor_rejected() {
        let config = RiskConfig {
            periods_per_year: Some(0.0),
            ..Default::default()
        };
        let series = monthly("FUND", &[0.01, 0.02]);
        let result = RiskCalculator::new(config).calculate(&series, None);
        assert!(matches!(result, Err(RondaError::InvalidInput(_))));
    }
}
