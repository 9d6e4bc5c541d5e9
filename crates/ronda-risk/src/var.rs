//! Historical Value-at-Risk and expected shortfall.
//!
//! Both measures are estimated from the empirical return distribution and
//! reported as positive loss magnitudes: a VaR of 0.034 at 95% confidence
//! means a one-period loss of 3.4% is not exceeded with 95% probability.

use ronda_core::stats::mean;
use ronda_core::{Result, RondaError};

/// Historical Value-at-Risk at the given confidence level.
///
/// The estimate is the loss at the `(1 - confidence_level)` quantile of the
/// empirical return distribution, with linear interpolation between order
/// statistics. A quantile that lands in positive territory (every tail
/// observation is a gain) yields a loss of 0.0.
///
/// # Errors
///
/// Returns [`RondaError::InvalidInput`] when the confidence level is outside
/// (0, 1) and [`RondaError::InsufficientData`] below two observations.
///
/// # Example
///
/// ```
/// use ronda_risk::var::historical_var;
///
/// let returns = [0.01, 0.02, -0.01, 0.03, -0.02];
/// let var_95 = historical_var(&returns, 0.95).unwrap();
/// assert!(var_95 > 0.0);
/// ```
pub fn historical_var(returns: &[f64], confidence_level: f64) -> Result<f64> {
    validate_confidence(confidence_level)?;
    if returns.len() < 2 {
        return Err(RondaError::InsufficientData {
            required: 2,
            actual: returns.len(),
            context: "historical VaR",
        });
    }

    let q = return_quantile(returns, 1.0 - confidence_level);
    Ok(loss_magnitude(q))
}

/// Expected shortfall (CVaR) at the given confidence level.
///
/// The mean of all returns at or below the VaR quantile threshold, reported
/// as a positive loss magnitude. Always at least as large as the VaR at the
/// same confidence level.
///
/// # Errors
///
/// Same conditions as [`historical_var`].
pub fn expected_shortfall(returns: &[f64], confidence_level: f64) -> Result<f64> {
    validate_confidence(confidence_level)?;
    if returns.len() < 2 {
        return Err(RondaError::InsufficientData {
            required: 2,
            actual: returns.len(),
            context: "expected shortfall",
        });
    }

    let q = return_quantile(returns, 1.0 - confidence_level);
    // The quantile is never below the sample minimum, so the tail is non-empty.
    let tail: Vec<f64> = returns.iter().copied().filter(|&r| r <= q).collect();
    Ok(loss_magnitude(mean(&tail)))
}

fn validate_confidence(confidence_level: f64) -> Result<()> {
    if confidence_level.is_finite() && confidence_level > 0.0 && confidence_level < 1.0 {
        Ok(())
    } else {
        Err(RondaError::InvalidInput(format!(
            "confidence level must be in (0, 1), got {confidence_level}"
        )))
    }
}

/// Empirical quantile of the returns with linear interpolation between order
/// statistics, `alpha` in [0, 1].
fn return_quantile(returns: &[f64], alpha: f64) -> f64 {
    let mut sorted = returns.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let rank = alpha.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    if lo == hi {
        sorted[lo]
    } else {
        sorted[lo] + (rank - lo as f64) * (sorted[hi] - sorted[lo])
    }
}

/// Convert a return-space quantile to a positive loss magnitude.
fn loss_magnitude(r: f64) -> f64 {
    (-r).max(0.0)
}
