//! Drawdown analysis over the cumulative return path.
//!
//! Drawdown is measured on cumulative growth ratios, not absolute levels, so
//! the result is invariant to the starting capital of the fund.

use serde::{Deserialize, Serialize};

/// Drawdown statistics for a return series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Drawdown {
    /// Largest peak-to-trough decline of the cumulative path, in [0, 1].
    pub max_drawdown: f64,
    /// Longest run of consecutive periods spent below the prior peak.
    pub drawdown_length: usize,
    /// Whether the path regained the peak of the maximum drawdown before the
    /// series ended.
    pub recovered: bool,
}

/// Analyze the drawdown profile of a periodic return sequence.
///
/// The cumulative path starts from a reference level of 1.0 (the fund's value
/// at the start of the series), which counts as the initial peak: a negative
/// first return is already a drawdown.
///
/// # Example
///
/// ```
/// use ronda_risk::drawdown;
///
/// let dd = drawdown::analyze(&[0.10, -0.20, 0.05, 0.30]);
/// assert!((dd.max_drawdown - 0.20).abs() < 1e-12);
/// assert_eq!(dd.drawdown_length, 2);
/// assert!(dd.recovered);
/// ```
#[must_use]
pub fn analyze(returns: &[f64]) -> Drawdown {
    let mut value = 1.0_f64;
    let mut peak = 1.0_f64;
    let mut max_drawdown = 0.0_f64;
    let mut recovered = true;
    let mut run = 0_usize;
    let mut longest_run = 0_usize;

    for &r in returns {
        value *= 1.0 + r;
        if value >= peak {
            peak = value;
            run = 0;
            // The current peak is always at least the max-drawdown peak, so
            // reaching it means the deepest decline has been recovered.
            recovered = true;
        } else {
            run += 1;
            longest_run = longest_run.max(run);
            let dd = (peak - value) / peak;
            if dd > max_drawdown {
                max_drawdown = dd;
                recovered = false;
            }
        }
    }

    Drawdown {
        // A compounded loss past total wipeout is still a full drawdown.
        max_drawdown: max_drawdown.min(1.0),
        drawdown_length: longest_run,
        recovered,
    }
}
