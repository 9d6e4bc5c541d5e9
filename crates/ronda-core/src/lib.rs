#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/rondalabs/ronda/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Core data model and error taxonomy for the Ronda fund analytics engine.
//!
//! This crate provides the foundational pieces shared by every engine crate:
//! the validated return-series container, the sampling frequency that drives
//! annualization, the common error taxonomy, and shared statistics helpers.

/// The version of the ronda-core crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// Module declarations
pub mod error;
pub mod series;
pub mod stats;

// Re-exports
pub use error::{Result, RondaError};
pub use series::{Date, Frequency, ReturnSeries};
