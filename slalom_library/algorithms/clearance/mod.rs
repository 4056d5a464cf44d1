//! Clearance estimation
//!
//! Reduces one side's arc scan to a single number: the arithmetic mean of the
//! filtered readings. A short mean means something is close on that side.
//! Averaging several pings over a small arc smooths out individual bad echoes.
//!
//! # Example
//!
//! ```rust
//! use slalom_core::{RangeReading, Side};
//! use slalom_library::algorithms::clearance::ClearanceEstimator;
//! use slalom_library::algorithms::range_filter::RangeFilter;
//!
//! let estimator = ClearanceEstimator::new(RangeFilter::new(100.0));
//! let readings = [40, -1, 60].map(RangeReading::from);
//!
//! let clearance = estimator.estimate(Side::Left, &readings).unwrap();
//! assert_eq!(clearance.cm(), 200.0 / 3.0);
//! ```

use crate::algorithms::range_filter::RangeFilter;
use slalom_core::{RangeReading, Side, SlalomError, SlalomResult};
use std::fmt;

/// Mean filtered distance over one scan arc, in centimeters
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct ClearanceEstimate(f64);

impl ClearanceEstimate {
    pub fn from_cm(cm: f64) -> Self {
        Self(cm)
    }

    pub fn cm(self) -> f64 {
        self.0
    }
}

impl fmt::Display for ClearanceEstimate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}cm", self.0)
    }
}

/// Clearance estimator
#[derive(Debug, Clone, Copy, Default)]
pub struct ClearanceEstimator {
    filter: RangeFilter,
}

impl ClearanceEstimator {
    pub fn new(filter: RangeFilter) -> Self {
        Self { filter }
    }

    /// Mean of the filtered readings.
    ///
    /// An empty slice is a configuration fault upstream (an arc with no angles)
    /// and is rejected rather than averaged.
    pub fn estimate(&self, side: Side, readings: &[RangeReading]) -> SlalomResult<ClearanceEstimate> {
        if readings.is_empty() {
            return Err(SlalomError::EmptyScan { side });
        }

        let total: f64 = readings.iter().map(|&r| self.filter.apply(r)).sum();
        Ok(ClearanceEstimate(total / readings.len() as f64))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn readings(raw: &[f64]) -> Vec<RangeReading> {
        raw.iter().copied().map(RangeReading::from).collect()
    }

    #[test]
    fn test_plain_mean() {
        let estimator = ClearanceEstimator::default();
        let clearance = estimator
            .estimate(Side::Left, &readings(&[10.0, 20.0, 30.0, 40.0]))
            .unwrap();
        assert_relative_eq!(clearance.cm(), 25.0);
    }

    #[test]
    fn test_single_reading() {
        let estimator = ClearanceEstimator::default();
        let clearance = estimator.estimate(Side::Right, &readings(&[42.5])).unwrap();
        assert_relative_eq!(clearance.cm(), 42.5);
    }

    #[test]
    fn test_sentinels_replaced_before_mean() {
        let estimator = ClearanceEstimator::new(RangeFilter::new(100.0));

        let with_sentinels = estimator
            .estimate(Side::Left, &readings(&[20.0, -1.0, 40.0, -2.0]))
            .unwrap();
        let substituted = estimator
            .estimate(Side::Left, &readings(&[20.0, 100.0, 40.0, 100.0]))
            .unwrap();

        assert_relative_eq!(with_sentinels.cm(), substituted.cm());
        assert_relative_eq!(with_sentinels.cm(), 65.0);
    }

    #[test]
    fn test_all_sentinel_arc_is_outlier_distance() {
        let estimator = ClearanceEstimator::new(RangeFilter::new(100.0));
        let clearance = estimator
            .estimate(Side::Right, &readings(&[-1.0, -2.0, -1.0]))
            .unwrap();
        assert_eq!(clearance.cm(), 100.0);
    }

    #[test]
    fn test_empty_rejected() {
        let estimator = ClearanceEstimator::default();
        let result = estimator.estimate(Side::Right, &[]);
        assert!(matches!(
            result,
            Err(SlalomError::EmptyScan { side: Side::Right })
        ));
    }
}
