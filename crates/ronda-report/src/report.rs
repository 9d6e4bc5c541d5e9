//! Report aggregation over risk, anomaly and allocation results.
//!
//! [`ReportBuilder`] is pure composition: it invokes the three engines with
//! shared input and collects their outputs into one immutable
//! [`AnalyticsReport`]. The first failing sub-computation aborts the whole
//! report, tagged with the section and fund that failed; a partially
//! populated report is never produced.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use ronda_allocate::{
    AllocationRecommendation, Allocator, AllocatorConfig, AssetStats, CorrelationMatrix,
    StepLimitedAllocator, Weights,
};
use ronda_anomaly::{AnomalyDetector, AnomalyResult, DetectorConfig};
use ronda_core::{ReturnSeries, RondaError};
use ronda_risk::{RiskCalculator, RiskConfig, RiskMetricsResult};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The sub-computation a report failure originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReportSection {
    /// Risk and performance metrics (per fund).
    RiskMetrics,
    /// Anomaly detection (per fund).
    AnomalyDetection,
    /// Allocation optimization (portfolio level).
    Allocation,
}

impl fmt::Display for ReportSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::RiskMetrics => "risk metrics",
            Self::AnomalyDetection => "anomaly detection",
            Self::Allocation => "allocation optimization",
        };
        f.write_str(name)
    }
}

/// Failure while assembling an analytics report.
#[derive(Debug, Error)]
pub enum ReportError {
    /// The report input itself was unusable.
    #[error("Report input invalid: {0}")]
    Input(String),

    /// A sub-computation failed; the whole report is aborted.
    #[error("{section} failed for {}: {source}", .fund.as_deref().unwrap_or("portfolio"))]
    Section {
        /// The sub-computation that failed.
        section: ReportSection,
        /// Fund being processed, if the failure was fund-specific.
        fund: Option<String>,
        /// The underlying engine error.
        #[source]
        source: RondaError,
    },
}

/// Portfolio-level input for the allocation section of a report.
#[derive(Debug, Clone)]
pub struct AllocationInput {
    /// Current asset weights.
    pub weights: Weights,
    /// Per-asset expected return and volatility.
    pub stats: BTreeMap<String, AssetStats>,
    /// Pairwise correlation matrix over the same assets.
    pub correlations: CorrelationMatrix,
}

/// Risk and anomaly sections for a single fund.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FundReport {
    /// Fund identifier.
    pub fund_id: String,
    /// Risk and performance metrics.
    pub risk: RiskMetricsResult,
    /// Per-observation anomaly flags and scores.
    pub anomalies: AnomalyResult,
}

/// Cross-fund summary statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryStatistics {
    /// Number of funds covered by the report.
    pub fund_count: usize,
    /// Total observations across all funds.
    pub total_observations: usize,
    /// Mean annualized return across funds.
    pub mean_annualized_return: f64,
    /// Mean annualized volatility across funds where it is defined.
    pub mean_annualized_volatility: Option<f64>,
    /// Fund with the highest annualized return.
    pub best_performer: String,
    /// Fund with the lowest annualized return.
    pub worst_performer: String,
}

/// The aggregated analytics report consumed by the API layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticsReport {
    /// Evaluation timestamp supplied by the caller.
    pub generated_at: DateTime<Utc>,
    /// Per-fund risk and anomaly sections.
    pub funds: Vec<FundReport>,
    /// Allocation section; present when portfolio input was supplied.
    pub allocation: Option<AllocationRecommendation>,
    /// Cross-fund summary.
    pub summary: SummaryStatistics,
}

/// Composes the three engines into a single report.
///
/// # Example
///
/// ```rust,ignore
/// use chrono::Utc;
/// use ronda_report::ReportBuilder;
///
/// let builder = ReportBuilder::default();
/// let report = builder.build(&funds, Some(&benchmark), None, Utc::now())?;
/// println!("{} funds analyzed", report.summary.fund_count);
/// ```
#[derive(Debug)]
pub struct ReportBuilder {
    risk: RiskCalculator,
    detector: AnomalyDetector,
    allocator: StepLimitedAllocator,
}

impl Default for ReportBuilder {
    fn default() -> Self {
        Self::new(
            RiskConfig::default(),
            DetectorConfig::default(),
            AllocatorConfig::default(),
        )
    }
}

impl ReportBuilder {
    /// Create a builder from the configuration of each sub-computation.
    #[must_use]
    pub fn new(
        risk: RiskConfig,
        detector: DetectorConfig,
        allocator: AllocatorConfig,
    ) -> Self {
        Self {
            risk: RiskCalculator::new(risk),
            detector: AnomalyDetector::new(detector),
            allocator: StepLimitedAllocator::new(allocator),
        }
    }

    /// Assemble the full report for a set of fund series.
    ///
    /// # Arguments
    ///
    /// * `funds` - One validated return series per fund
    /// * `benchmark` - Optional benchmark series shared by all funds
    /// * `allocation` - Optional portfolio input for the allocation section
    /// * `as_of` - Evaluation timestamp attached to the report
    ///
    /// # Errors
    ///
    /// [`ReportError::Input`] for an empty fund set; [`ReportError::Section`]
    /// when any sub-computation fails, carrying the originating section,
    /// the fund (if fund-specific) and the engine error.
    pub fn build(
        &self,
        funds: &[ReturnSeries],
        benchmark: Option<&ReturnSeries>,
        allocation: Option<&AllocationInput>,
        as_of: DateTime<Utc>,
    ) -> Result<AnalyticsReport, ReportError> {
        if funds.is_empty() {
            return Err(ReportError::Input(
                "report requires at least one fund series".to_string(),
            ));
        }

        let mut fund_reports = Vec::with_capacity(funds.len());
        for series in funds {
            let risk = self
                .risk
                .calculate(series, benchmark)
                .map_err(|source| ReportError::Section {
                    section: ReportSection::RiskMetrics,
                    fund: Some(series.fund_id().to_string()),
                    source,
                })?;

            let anomalies =
                self.detector
                    .detect(series)
                    .map_err(|source| ReportError::Section {
                        section: ReportSection::AnomalyDetection,
                        fund: Some(series.fund_id().to_string()),
                        source,
                    })?;

            fund_reports.push(FundReport {
                fund_id: series.fund_id().to_string(),
                risk,
                anomalies,
            });
        }

        let allocation = allocation
            .map(|input| {
                self.allocator
                    .rebalance(&input.weights, &input.stats, &input.correlations)
                    .map_err(|source| ReportError::Section {
                        section: ReportSection::Allocation,
                        fund: None,
                        source,
                    })
            })
            .transpose()?;

        let summary = summarize(&fund_reports);

        Ok(AnalyticsReport {
            generated_at: as_of,
            funds: fund_reports,
            allocation,
            summary,
        })
    }
}

/// Cross-fund summary of the per-fund results.
fn summarize(funds: &[FundReport]) -> SummaryStatistics {
    let fund_count = funds.len();
    let total_observations = funds.iter().map(|f| f.risk.n_observations).sum();

    let mean_annualized_return =
        funds.iter().map(|f| f.risk.annualized_return).sum::<f64>() / fund_count as f64;

    let volatilities: Vec<f64> = funds
        .iter()
        .filter_map(|f| f.risk.annualized_volatility)
        .collect();
    let mean_annualized_volatility = if volatilities.is_empty() {
        None
    } else {
        Some(volatilities.iter().sum::<f64>() / volatilities.len() as f64)
    };

    let by_return = |a: &&FundReport, b: &&FundReport| {
        a.risk
            .annualized_return
            .partial_cmp(&b.risk.annualized_return)
            .unwrap_or(std::cmp::Ordering::Equal)
    };
    let best_performer = funds
        .iter()
        .max_by(by_return)
        .map(|f| f.fund_id.clone())
        .unwrap_or_default();
    let worst_performer = funds
        .iter()
        .min_by(by_return)
        .map(|f| f.fund_id.clone())
        .unwrap_or_default();

    SummaryStatistics {
        fund_count,
        total_observations,
        mean_annualized_return,
        mean_annualized_volatility,
        best_performer,
        worst_performer,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;
    use ronda_core::{Date, Frequency};

    fn daily(fund_id: &str, values: &[f64]) -> ReturnSeries {
        let start = Date::from_ymd_opt(2024, 1, 1).unwrap();
        let observations = values
            .iter()
            .enumerate()
            .map(|(i, &v)| (start + chrono::Duration::days(i as i64), v))
            .collect();
        ReturnSeries::new(fund_id, Frequency::Daily, observations).unwrap()
    }

    fn synthetic(n: usize, shift: usize) -> Vec<f64> {
        (0..n)
            .map(|i| ((((i + shift) * 31 + 7) % 23) as f64 - 11.0) / 500.0)
            .collect()
    }

    fn allocation_input() -> AllocationInput {
        AllocationInput {
            weights: [("EQ".to_string(), 0.5), ("BOND".to_string(), 0.5)].into(),
            stats: [
                (
                    "EQ".to_string(),
                    AssetStats {
                        expected_return: 0.08,
                        volatility: 0.15,
                    },
                ),
                (
                    "BOND".to_string(),
                    AssetStats {
                        expected_return: 0.03,
                        volatility: 0.05,
                    },
                ),
            ]
            .into(),
            correlations: CorrelationMatrix::new(
                vec!["BOND".to_string(), "EQ".to_string()],
                array![[1.0, 0.2], [0.2, 1.0]],
            )
            .unwrap(),
        }
    }

    #[test]
    fn test_full_report_with_all_sections() {
        let funds = vec![
            daily("ALPHA", &synthetic(40, 0)),
            daily("BETA", &synthetic(40, 5)),
        ];
        let input = allocation_input();
        let builder = ReportBuilder::default();
        let as_of = Utc::now();

        let report = builder.build(&funds, None, Some(&input), as_of).unwrap();

        assert_eq!(report.generated_at, as_of);
        assert_eq!(report.funds.len(), 2);
        assert!(report.allocation.is_some());
        assert_eq!(report.summary.fund_count, 2);
        assert_eq!(report.summary.total_observations, 80);
    }

    #[test]
    fn test_report_without_allocation_input() {
        let funds = vec![daily("ALPHA", &synthetic(30, 0))];
        let report = ReportBuilder::default()
            .build(&funds, None, None, Utc::now())
            .unwrap();
        assert!(report.allocation.is_none());
    }

    #[test]
    fn test_empty_fund_set_rejected() {
        let result = ReportBuilder::default().build(&[], None, None, Utc::now());
        assert!(matches!(result, Err(ReportError::Input(_))));
    }

    #[test]
    fn test_anomaly_failure_aborts_whole_report() {
        // Second fund is below the detector's minimum sample size: the
        // report must fail entirely, tagged with the failing section.
        let funds = vec![
            daily("ALPHA", &synthetic(40, 0)),
            daily("SHORT", &synthetic(5, 0)),
        ];
        let result = ReportBuilder::default().build(&funds, None, None, Utc::now());

        match result {
            Err(ReportError::Section {
                section: ReportSection::AnomalyDetection,
                fund: Some(fund),
                source: RondaError::InsufficientData { .. },
            }) => assert_eq!(fund, "SHORT"),
            other => panic!("expected anomaly section failure, got {other:?}"),
        }
    }

    #[test]
    fn test_risk_failure_reports_section_and_fund() {
        // Misaligned benchmark triggers the risk section failure.
        let funds = vec![daily("ALPHA", &synthetic(40, 0))];
        let benchmark = daily("BENCH", &synthetic(30, 1));
        let result =
            ReportBuilder::default().build(&funds, Some(&benchmark), None, Utc::now());

        match result {
            Err(ReportError::Section {
                section: ReportSection::RiskMetrics,
                fund: Some(fund),
                source: RondaError::DimensionMismatch { .. },
            }) => assert_eq!(fund, "ALPHA"),
            other => panic!("expected risk section failure, got {other:?}"),
        }
    }

    #[test]
    fn test_allocation_failure_has_no_fund_tag() {
        let funds = vec![daily("ALPHA", &synthetic(40, 0))];
        let mut input = allocation_input();
        input.weights.insert("EQ".to_string(), 0.9); // breaks the sum invariant

        let result =
            ReportBuilder::default().build(&funds, None, Some(&input), Utc::now());
        match result {
            Err(ReportError::Section {
                section: ReportSection::Allocation,
                fund: None,
                source: RondaError::InconsistentAllocation(_),
            }) => {}
            other => panic!("expected allocation section failure, got {other:?}"),
        }
    }

    #[test]
    fn test_summary_picks_best_and_worst_performer() {
        let strong: Vec<f64> = vec![0.01, 0.012, 0.009, 0.011, 0.008, 0.01]
            .into_iter()
            .cycle()
            .take(25)
            .collect();
        let weak: Vec<f64> = vec![-0.004, -0.002, -0.005, -0.001]
            .into_iter()
            .cycle()
            .take(25)
            .collect();
        let funds = vec![daily("STRONG", &strong), daily("WEAK", &weak)];

        let report = ReportBuilder::default()
            .build(&funds, None, None, Utc::now())
            .unwrap();
        assert_eq!(report.summary.best_performer, "STRONG");
        assert_eq!(report.summary.worst_performer, "WEAK");
        assert!(report.summary.mean_annualized_volatility.is_some());
    }

    #[test]
    fn test_error_display_names_section() {
        let err = ReportError::Section {
            section: ReportSection::AnomalyDetection,
            fund: Some("ALPHA".to_string()),
            source: RondaError::InsufficientData {
                required: 20,
                actual: 5,
                context: "anomaly detection",
            },
        };
        let text = err.to_string();
        assert!(text.contains("anomaly detection failed for ALPHA"));
    }
}
