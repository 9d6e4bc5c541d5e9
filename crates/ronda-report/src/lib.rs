//! Analytics report aggregation for the Ronda engine.
//!
//! Pure composition over the engine crates: risk metrics and anomaly
//! detection per fund, allocation optimization at the portfolio level, and
//! cross-fund summary statistics, assembled into one immutable
//! [`AnalyticsReport`]. A failure in any sub-computation aborts the whole
//! report with the originating section attached; partially populated reports
//! are never produced.

pub mod report;

// Re-export main types
pub use report::{
    AllocationInput, AnalyticsReport, FundReport, ReportBuilder, ReportError, ReportSection,
    SummaryStatistics,
};
