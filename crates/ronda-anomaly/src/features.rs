//! Feature engineering for anomaly detection.
//!
//! Each observation of a return series is represented by a small feature
//! vector. The default extractor pairs the raw return with two trailing
//! rolling statistics so that both magnitude outliers and volatility-regime
//! outliers become separable in feature space. Alternate feature sets plug in
//! behind the [`FeatureExtractor`] trait.

use std::fmt;

use ndarray::Array2;
use ronda_core::ReturnSeries;
use ronda_core::stats::{sample_std, zscore};
use serde::{Deserialize, Serialize};

/// Maps a return series to a per-observation feature matrix.
///
/// Implementations must be thread-safe (`Send + Sync`) and must produce one
/// row per observation with only finite values.
pub trait FeatureExtractor: Send + Sync + fmt::Debug {
    /// Name of this feature set, used for identification in reports.
    fn name(&self) -> &str;

    /// Number of columns in the extracted matrix.
    fn n_features(&self) -> usize;

    /// Extract the feature matrix, one row per observation of the series.
    fn extract(&self, series: &ReturnSeries) -> Array2<f64>;
}

/// Configuration for the default return-based feature set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureConfig {
    /// Trailing window for the local volatility feature.
    pub volatility_window: usize,
    /// Trailing window for the rolling z-score feature.
    pub zscore_window: usize,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            volatility_window: 5,
            zscore_window: 20,
        }
    }
}

/// Default feature set: raw return, trailing rolling volatility, and
/// trailing rolling z-score.
///
/// Windows include the current observation and truncate at the start of the
/// series; degenerate windows (too short, or flat) contribute 0.0 instead of
/// NaN, so the matrix is finite for any valid series.
#[derive(Debug, Clone, Default)]
pub struct ReturnFeatures {
    config: FeatureConfig,
}

impl ReturnFeatures {
    /// Create the feature set with the given window configuration.
    #[must_use]
    pub const fn new(config: FeatureConfig) -> Self {
        Self { config }
    }
}

impl FeatureExtractor for ReturnFeatures {
    fn name(&self) -> &str {
        "return_rolling"
    }

    fn n_features(&self) -> usize {
        3
    }

    fn extract(&self, series: &ReturnSeries) -> Array2<f64> {
        let returns = series.returns();
        let n = returns.len();
        let mut features = Array2::zeros((n, self.n_features()));

        for i in 0..n {
            features[[i, 0]] = returns[i];

            let vol_start = (i + 1).saturating_sub(self.config.volatility_window);
            features[[i, 1]] = sample_std(&returns[vol_start..=i]).unwrap_or(0.0);

            let z_start = (i + 1).saturating_sub(self.config.zscore_window);
            features[[i, 2]] = zscore(returns[i], &returns[z_start..=i]);
        }

        features
    }
}
