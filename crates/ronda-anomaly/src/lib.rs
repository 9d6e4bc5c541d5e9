//! Anomaly detection for fund return series.
//!
//! This crate flags unusual return observations with a seeded
//! isolation-forest ensemble:
//! - feature engineering behind the [`FeatureExtractor`] trait, with a
//!   default set of raw return + trailing rolling statistics
//! - an index-arena isolation forest with bounded depth and per-tree seeded
//!   PRNG streams (deterministic at any parallelism degree)
//! - contamination-rate thresholding with date-ordered tie breaking
//!
//! # Example
//!
//! ```rust,ignore
//! use ronda_anomaly::{AnomalyDetector, DetectorConfig};
//!
//! let detector = AnomalyDetector::new(DetectorConfig::default());
//! let result = detector.detect(&series)?;
//! println!("{} of {} observations flagged", result.n_anomalies(), result.points.len());
//! ```

pub mod detector;
pub mod features;
pub mod forest;

// Re-export main types
pub use detector::{AnomalyDetector, AnomalyPoint, AnomalyResult, DetectorConfig};
pub use features::{FeatureConfig, FeatureExtractor, ReturnFeatures};
pub use forest::{ForestConfig, IsolationForest};
