//! Anomaly detection front end for return series.
//!
//! [`AnomalyDetector`] wires a [`FeatureExtractor`] to the
//! [`IsolationForest`](crate::IsolationForest) and converts ensemble scores
//! into per-observation flags at the configured contamination rate.

use ronda_core::{Date, Result, ReturnSeries, RondaError};
use serde::{Deserialize, Serialize};

use crate::features::{FeatureExtractor, ReturnFeatures};
use crate::forest::{ForestConfig, IsolationForest};

/// Configuration for anomaly detection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectorConfig {
    /// Expected fraction of anomalous observations, in [0, 1).
    pub contamination: f64,
    /// Seed for the ensemble PRNG streams; identical input and seed yield
    /// identical output.
    pub seed: u64,
    /// Minimum number of observations the detector accepts.
    pub min_samples: usize,
    /// Isolation forest construction parameters.
    pub forest: ForestConfig,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            contamination: 0.05,
            seed: 42,
            min_samples: 20,
            forest: ForestConfig::default(),
        }
    }
}

/// Score and flag for one observation of the series.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AnomalyPoint {
    /// Observation date.
    pub date: Date,
    /// Periodic return at this date.
    pub value: f64,
    /// Isolation score in (0, 1]; higher means more anomalous.
    pub score: f64,
    /// Whether this observation falls in the flagged top fraction.
    pub is_anomaly: bool,
}

/// Detection output for one fund series.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnomalyResult {
    /// Fund the detection ran on.
    pub fund_id: String,
    /// Contamination rate the flags were derived from.
    pub contamination: f64,
    /// Seed the ensemble was built with.
    pub seed: u64,
    /// Per-observation scores and flags, in series order.
    pub points: Vec<AnomalyPoint>,
}

impl AnomalyResult {
    /// Observations flagged as anomalous, in series order.
    pub fn anomalies(&self) -> impl Iterator<Item = &AnomalyPoint> {
        self.points.iter().filter(|p| p.is_anomaly)
    }

    /// Number of flagged observations.
    #[must_use]
    pub fn n_anomalies(&self) -> usize {
        self.points.iter().filter(|p| p.is_anomaly).count()
    }
}

/// Unsupervised outlier detector for fund return series.
///
/// # Example
///
/// ```rust,ignore
/// use ronda_anomaly::{AnomalyDetector, DetectorConfig};
///
/// let detector = AnomalyDetector::new(DetectorConfig::default());
/// let result = detector.detect(&series)?;
/// for point in result.anomalies() {
///     println!("{}: score {:.3}", point.date, point.score);
/// }
/// ```
#[derive(Debug)]
pub struct AnomalyDetector {
    config: DetectorConfig,
    extractor: Box<dyn FeatureExtractor>,
}

impl AnomalyDetector {
    /// Create a detector with the default return-based feature set.
    #[must_use]
    pub fn new(config: DetectorConfig) -> Self {
        Self {
            config,
            extractor: Box::new(ReturnFeatures::default()),
        }
    }

    /// Create a detector with a custom feature extractor.
    #[must_use]
    pub fn with_extractor(config: DetectorConfig, extractor: Box<dyn FeatureExtractor>) -> Self {
        Self { config, extractor }
    }

    /// The configuration this detector runs with.
    #[must_use]
    pub const fn config(&self) -> &DetectorConfig {
        &self.config
    }

    /// Score every observation and flag the top contamination fraction.
    ///
    /// Exactly `round(contamination × N)` observations are flagged; ties on
    /// score break toward the earliest observation.
    ///
    /// # Errors
    ///
    /// [`RondaError::InsufficientData`] below `min_samples` observations,
    /// [`RondaError::InvalidInput`] for an out-of-range contamination rate or
    /// min-samples setting, [`RondaError::DimensionMismatch`] when a custom
    /// extractor produces the wrong number of rows.
    pub fn detect(&self, series: &ReturnSeries) -> Result<AnomalyResult> {
        let contamination = self.config.contamination;
        if !contamination.is_finite() || !(0.0..1.0).contains(&contamination) {
            return Err(RondaError::InvalidInput(format!(
                "contamination rate must be in [0, 1), got {contamination}"
            )));
        }
        if self.config.min_samples < 2 {
            return Err(RondaError::InvalidInput(
                "minimum sample size must be at least 2".to_string(),
            ));
        }

        let n = series.len();
        if n < self.config.min_samples {
            return Err(RondaError::InsufficientData {
                required: self.config.min_samples,
                actual: n,
                context: "anomaly detection",
            });
        }

        let features = self.extractor.extract(series);
        if features.nrows() != n {
            return Err(RondaError::DimensionMismatch {
                expected: n,
                actual: features.nrows(),
            });
        }

        let forest = IsolationForest::fit(features.view(), &self.config.forest, self.config.seed)?;
        let scores = forest.scores(features.view());

        let n_flagged = ((contamination * n as f64).round() as usize).min(n);
        let mut order: Vec<usize> = (0..n).collect();
        order.sort_by(|&a, &b| {
            scores[b]
                .partial_cmp(&scores[a])
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.cmp(&b))
        });

        let mut flagged = vec![false; n];
        for &i in order.iter().take(n_flagged) {
            flagged[i] = true;
        }

        let points = series
            .dates()
            .iter()
            .zip(series.returns())
            .zip(scores.iter().zip(flagged))
            .map(|((&date, &value), (&score, is_anomaly))| AnomalyPoint {
                date,
                value,
                score,
                is_anomaly,
            })
            .collect();

        Ok(AnomalyResult {
            fund_id: series.fund_id().to_string(),
            contamination,
            seed: self.config.seed,
            points,
        })
    }
}
