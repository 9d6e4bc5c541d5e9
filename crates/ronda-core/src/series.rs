//! Fund return series and sampling frequency.
//!
//! [`ReturnSeries`] is the single input type consumed by every engine
//! computation: an ordered, timestamped sequence of periodic returns for one
//! fund. The constructor enforces the series invariants once, so downstream
//! code can rely on finite returns and strictly increasing timestamps.

use serde::{Deserialize, Serialize};

use crate::error::{Result, RondaError};

// Re-export date type from chrono
pub use chrono::NaiveDate as Date;

/// Sampling frequency of a return series.
///
/// The frequency determines the default annualization factor: periodic means
/// scale by the factor, periodic volatilities by its square root. Callers can
/// override the factor per computation when a non-standard calendar applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    /// Trading-daily observations (252 periods per year).
    Daily,
    /// Weekly observations (52 periods per year).
    Weekly,
    /// Monthly observations (12 periods per year).
    Monthly,
    /// Quarterly observations (4 periods per year).
    Quarterly,
    /// Annual observations (1 period per year).
    Annual,
}

impl Frequency {
    /// Default number of periods per year for this frequency.
    #[must_use]
    pub const fn periods_per_year(self) -> f64 {
        match self {
            Self::Daily => 252.0,
            Self::Weekly => 52.0,
            Self::Monthly => 12.0,
            Self::Quarterly => 4.0,
            Self::Annual => 1.0,
        }
    }
}

/// An ordered, timestamped sequence of periodic returns for one fund.
///
/// Returns are fractions (0.01 = 1%), not percentages. The series is
/// immutable once constructed; the engine never mutates its input.
///
/// # Invariants
///
/// - at least one observation
/// - timestamps strictly increasing (no duplicates)
/// - every return finite
///
/// # Example
///
/// ```
/// use ronda_core::{Frequency, ReturnSeries};
/// use chrono::NaiveDate;
///
/// let series = ReturnSeries::new(
///     "GLOBAL-EQ",
///     Frequency::Monthly,
///     vec![
///         (NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(), 0.012),
///         (NaiveDate::from_ymd_opt(2024, 2, 29).unwrap(), -0.004),
///     ],
/// )
/// .unwrap();
///
/// assert_eq!(series.len(), 2);
/// assert_eq!(series.frequency().periods_per_year(), 12.0);
/// ```
#[derive(Debug, Clone)]
pub struct ReturnSeries {
    fund_id: String,
    frequency: Frequency,
    dates: Vec<Date>,
    returns: Vec<f64>,
}

impl ReturnSeries {
    /// Creates a validated return series.
    ///
    /// # Arguments
    ///
    /// * `fund_id` - Identifier of the fund the series belongs to
    /// * `frequency` - Sampling frequency of the observations
    /// * `observations` - `(date, periodic_return)` pairs in ascending date order
    ///
    /// # Errors
    ///
    /// Returns [`RondaError::InvalidInput`] when the series is empty, a return
    /// is not finite, or timestamps are not strictly increasing.
    pub fn new(
        fund_id: impl Into<String>,
        frequency: Frequency,
        observations: Vec<(Date, f64)>,
    ) -> Result<Self> {
        if observations.is_empty() {
            return Err(RondaError::InvalidInput(
                "return series must contain at least one observation".to_string(),
            ));
        }

        let mut dates = Vec::with_capacity(observations.len());
        let mut returns = Vec::with_capacity(observations.len());

        for (date, value) in observations {
            if !value.is_finite() {
                return Err(RondaError::InvalidInput(format!(
                    "non-finite return {value} at {date}"
                )));
            }
            if let Some(&prev) = dates.last()
                && date <= prev
            {
                return Err(RondaError::InvalidInput(format!(
                    "timestamps must be strictly increasing: {date} follows {prev}"
                )));
            }
            dates.push(date);
            returns.push(value);
        }

        Ok(Self {
            fund_id: fund_id.into(),
            frequency,
            dates,
            returns,
        })
    }

    /// Identifier of the fund this series belongs to.
    #[must_use]
    pub fn fund_id(&self) -> &str {
        &self.fund_id
    }

    /// Sampling frequency of the observations.
    #[must_use]
    pub const fn frequency(&self) -> Frequency {
        self.frequency
    }

    /// Number of observations in the series.
    #[must_use]
    pub fn len(&self) -> usize {
        self.returns.len()
    }

    /// Whether the series contains no observations.
    ///
    /// Always `false` for a constructed series; provided for API completeness.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.returns.is_empty()
    }

    /// Periodic returns in observation order.
    #[must_use]
    pub fn returns(&self) -> &[f64] {
        &self.returns
    }

    /// Observation dates in ascending order.
    #[must_use]
    pub fn dates(&self) -> &[Date] {
        &self.dates
    }

    /// Date of the first observation.
    #[must_use]
    pub fn first_date(&self) -> Date {
        self.dates[0]
    }

    /// Date of the last observation.
    #[must_use]
    pub fn last_date(&self) -> Date {
        self.dates[self.dates.len() - 1]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> Date {
        Date::from_ymd_opt(y, m, d).unwrap()
    }

    fn monthly(values: &[f64]) -> ReturnSeries {
        let observations = values
            .iter()
            .enumerate()
            .map(|(i, &v)| (date(2024, 1 + i as u32, 1), v))
            .collect();
        ReturnSeries::new("TEST", Frequency::Monthly, observations).unwrap()
    }

    #[test]
    fn test_new_valid_series() {
        let series = monthly(&[0.01, -0.02, 0.015]);
        assert_eq!(series.fund_id(), "TEST");
        assert_eq!(series.len(), 3);
        assert!(!series.is_empty());
        assert_eq!(series.returns(), &[0.01, -0.02, 0.015]);
        assert_eq!(series.first_date(), date(2024, 1, 1));
        assert_eq!(series.last_date(), date(2024, 3, 1));
    }

    #[test]
    fn test_new_rejects_empty() {
        let result = ReturnSeries::new("TEST", Frequency::Daily, vec![]);
        assert!(matches!(result, Err(RondaError::InvalidInput(_))));
    }

    #[test]
    fn test_new_rejects_non_finite() {
        let result = ReturnSeries::new(
            "TEST",
            Frequency::Daily,
            vec![(date(2024, 1, 2), 0.01), (date(2024, 1, 3), f64::NAN)],
        );
        assert!(matches!(result, Err(RondaError::InvalidInput(_))));

        let result = ReturnSeries::new(
            "TEST",
            Frequency::Daily,
            vec![(date(2024, 1, 2), f64::INFINITY)],
        );
        assert!(matches!(result, Err(RondaError::InvalidInput(_))));
    }

    #[test]
    fn test_new_rejects_duplicate_timestamps() {
        let result = ReturnSeries::new(
            "TEST",
            Frequency::Daily,
            vec![(date(2024, 1, 2), 0.01), (date(2024, 1, 2), 0.02)],
        );
        assert!(matches!(result, Err(RondaError::InvalidInput(_))));
    }

    #[test]
    fn test_new_rejects_decreasing_timestamps() {
        let result = ReturnSeries::new(
            "TEST",
            Frequency::Daily,
            vec![(date(2024, 1, 3), 0.01), (date(2024, 1, 2), 0.02)],
        );
        assert!(matches!(result, Err(RondaError::InvalidInput(_))));
    }

    #[test]
    fn test_frequency_periods_per_year() {
        assert_eq!(Frequency::Daily.periods_per_year(), 252.0);
        assert_eq!(Frequency::Weekly.periods_per_year(), 52.0);
        assert_eq!(Frequency::Monthly.periods_per_year(), 12.0);
        assert_eq!(Frequency::Quarterly.periods_per_year(), 4.0);
        assert_eq!(Frequency::Annual.periods_per_year(), 1.0);
    }

    #[test]
    fn test_single_observation_allowed() {
        let series =
            ReturnSeries::new("TEST", Frequency::Annual, vec![(date(2024, 12, 31), 0.07)]).unwrap();
        assert_eq!(series.len(), 1);
    }
}
