//! Range reading filter
//!
//! Ultrasonic sensors report a missing or late echo as a negative code rather
//! than a distance. Averaging those codes would drag a side's mean towards zero
//! and make an open side look blocked, so every reading goes through this filter
//! before aggregation: sentinels become a large stand-in distance ("nothing
//! there"), valid readings pass through unchanged.
//!
//! # Example
//!
//! ```rust
//! use slalom_core::RangeReading;
//! use slalom_library::algorithms::range_filter::RangeFilter;
//!
//! let filter = RangeFilter::new(100.0);
//!
//! assert_eq!(filter.apply(RangeReading::from(35)), 35.0);
//! assert_eq!(filter.apply(RangeReading::NO_ECHO), 100.0);
//! ```

use slalom_core::RangeReading;

/// Sentinel substitution filter
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RangeFilter {
    outlier_distance_cm: f64,
}

impl RangeFilter {
    /// Create a filter substituting `outlier_distance_cm` for sentinel readings
    pub fn new(outlier_distance_cm: f64) -> Self {
        Self {
            outlier_distance_cm,
        }
    }

    pub fn outlier_distance_cm(&self) -> f64 {
        self.outlier_distance_cm
    }

    /// Filtered distance in centimeters
    pub fn apply(&self, reading: RangeReading) -> f64 {
        reading.valid_cm().unwrap_or(self.outlier_distance_cm)
    }

    /// Filter a sequence of readings
    pub fn apply_all<I>(&self, readings: I) -> Vec<f64>
    where
        I: IntoIterator<Item = RangeReading>,
    {
        readings
            .into_iter()
            .map(|reading| self.apply(reading))
            .collect()
    }
}

impl Default for RangeFilter {
    fn default() -> Self {
        Self::new(100.0)
    }
}
