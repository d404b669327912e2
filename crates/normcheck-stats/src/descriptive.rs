use serde::{Deserialize, Serialize};

use crate::AnalysisError;

/// Smallest standard deviation reported by [`DescriptiveStats`].
///
/// Downstream density evaluation divides by the standard deviation, so a
/// zero-variance sample reports this value instead of `0.0`.
pub const MIN_STD_DEV: f64 = 1e-4;

/// Normalization used when computing the variance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VarianceMode {
    /// Biased estimator: `sum((x - mean)^2) / n`.
    Population,
    /// Unbiased estimator: `sum((x - mean)^2) / (n - 1)`.
    #[default]
    Sample,
}

/// Descriptive statistics summarizing a dataset.
///
/// This structure contains common measures of central tendency and dispersion
/// for a dataset of `f64` values. It is derived once per sample and never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DescriptiveStats {
    /// The number of values in the dataset.
    pub count: usize,
    /// The minimum value in the dataset.
    pub min: f64,
    /// The maximum value in the dataset.
    pub max: f64,
    /// The arithmetic mean (average) of the dataset.
    pub mean: f64,
    /// The median value of the dataset.
    ///
    /// For an even count this is the average of the two middle values.
    pub median: f64,
    /// The variance of the dataset, normalized according to `variance_mode`.
    pub variance: f64,
    /// The standard deviation of the dataset, floored at [`MIN_STD_DEV`].
    pub std_dev: f64,
    /// The normalization used for `variance` and `std_dev`.
    pub variance_mode: VarianceMode,
}

impl DescriptiveStats {
    /// Computes descriptive statistics from unsorted values.
    ///
    /// This method will sort the values internally before computing statistics.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::InsufficientData`] if fewer than two values are given.
    ///
    /// # Examples
    ///
    /// ```
    /// # use normcheck_stats::descriptive::{DescriptiveStats, VarianceMode};
    /// let values = [5.0, 2.0, 4.0, 1.0, 3.0];
    /// let stats = DescriptiveStats::new(values, VarianceMode::Sample).unwrap();
    /// assert_eq!(stats.min, 1.0);
    /// assert_eq!(stats.max, 5.0);
    /// assert_eq!(stats.mean, 3.0);
    /// assert_eq!(stats.median, 3.0);
    /// assert_eq!(stats.variance, 2.5);
    /// ```
    pub fn new<I>(values: I, variance_mode: VarianceMode) -> Result<Self, AnalysisError>
    where
        I: IntoIterator<Item = f64>,
    {
        let mut values = values.into_iter().collect::<Vec<_>>();
        values.sort_by(f64::total_cmp);
        Self::from_sorted(&values, variance_mode)
    }

    /// Computes descriptive statistics from pre-sorted values.
    ///
    /// This is an optimized version that skips the sorting step.
    /// Use this when you already have sorted data to avoid unnecessary work.
    ///
    /// # Panics
    ///
    /// Panics in debug mode if `sorted_values` is not sorted in ascending order.
    ///
    /// # Examples
    ///
    /// ```
    /// # use normcheck_stats::descriptive::{DescriptiveStats, VarianceMode};
    /// let stats = DescriptiveStats::from_sorted(&[5.0; 5], VarianceMode::Population).unwrap();
    /// assert_eq!(stats.variance, 0.0);
    /// assert_eq!(stats.std_dev, normcheck_stats::descriptive::MIN_STD_DEV);
    /// ```
    #[expect(clippy::cast_precision_loss)]
    pub fn from_sorted(
        sorted_values: &[f64],
        variance_mode: VarianceMode,
    ) -> Result<Self, AnalysisError> {
        debug_assert!(
            sorted_values.is_sorted_by(|a, b| a <= b),
            "values must be sorted in ascending order"
        );

        let count = sorted_values.len();
        if count < 2 {
            return Err(AnalysisError::InsufficientData {
                required: 2,
                actual: count,
            });
        }

        let min = sorted_values[0];
        let max = sorted_values[count - 1];
        let n = count as f64;
        let median = if count.is_multiple_of(2) {
            f64::midpoint(sorted_values[count / 2 - 1], sorted_values[count / 2])
        } else {
            sorted_values[count / 2]
        };

        // Moments are accumulated on values divided by a power of two close to
        // the largest magnitude. Huge sums stay finite and rounding is unchanged.
        let scale = moment_scale(min.abs().max(max.abs()));
        let scaled_mean = sorted_values.iter().map(|v| v / scale).sum::<f64>() / n;
        let scaled_sum_sq = sorted_values
            .iter()
            .map(|v| (v / scale - scaled_mean).powi(2))
            .sum::<f64>();
        let scaled_variance = match variance_mode {
            VarianceMode::Population => scaled_sum_sq / n,
            VarianceMode::Sample => scaled_sum_sq / (n - 1.0),
        };
        let mean = scaled_mean * scale;
        let variance = (scaled_variance * scale * scale).min(f64::MAX);
        let std_dev = (scaled_variance.sqrt() * scale).clamp(MIN_STD_DEV, f64::MAX);

        Ok(Self {
            count,
            min,
            max,
            mean,
            median,
            variance,
            std_dev,
            variance_mode,
        })
    }

    /// Returns `true` if every value in the dataset is identical.
    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        self.max <= self.min
    }
}

/// Largest power of two not above `max_abs`, kept within the normal range.
#[expect(clippy::cast_possible_truncation)]
fn moment_scale(max_abs: f64) -> f64 {
    if max_abs == 0.0 {
        return 1.0;
    }
    let exponent = max_abs.log2().floor().clamp(-1022.0, 1023.0);
    2.0_f64.powi(exponent as i32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_to_ten() {
        let values = (1..=10).map(f64::from);
        let stats = DescriptiveStats::new(values, VarianceMode::Sample).unwrap();
        assert_eq!(stats.count, 10);
        assert!((stats.mean - 5.5).abs() < 1e-12);
        assert!((stats.median - 5.5).abs() < 1e-12);
        assert!((stats.std_dev - 3.027_650_354_097_491_7).abs() < 1e-9);
        assert_eq!(stats.min, 1.0);
        assert_eq!(stats.max, 10.0);
    }

    #[test]
    fn test_population_variance() {
        let values = (1..=10).map(f64::from);
        let stats = DescriptiveStats::new(values, VarianceMode::Population).unwrap();
        assert!((stats.variance - 8.25).abs() < 1e-12);
        assert!((stats.std_dev - 8.25_f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_odd_median() {
        let stats = DescriptiveStats::new([9.0, 1.0, 4.0], VarianceMode::Sample).unwrap();
        assert_eq!(stats.median, 4.0);
    }

    #[test]
    fn test_degenerate_floor() {
        let stats = DescriptiveStats::new([5.0; 5], VarianceMode::Sample).unwrap();
        assert_eq!(stats.variance, 0.0);
        assert_eq!(stats.std_dev, MIN_STD_DEV);
        assert!(stats.is_degenerate());
    }

    #[test]
    fn test_huge_values_stay_finite() {
        let values = [-1e200, -5e199, 0.0, 5e199, 1e200];
        let stats = DescriptiveStats::new(values, VarianceMode::Sample).unwrap();
        assert!(stats.mean.abs() < 1e186);
        assert!((stats.std_dev / 7.905_694_150_420_949e199 - 1.0).abs() < 1e-12);
        // The variance itself exceeds f64::MAX
        assert_eq!(stats.variance, f64::MAX);

        let stats = DescriptiveStats::new([f64::MIN, f64::MAX], VarianceMode::Sample).unwrap();
        assert_eq!(stats.mean, 0.0);
        assert_eq!(stats.std_dev, f64::MAX);
        assert_eq!(stats.variance, f64::MAX);
    }

    #[test]
    fn test_insufficient_data() {
        assert_eq!(
            DescriptiveStats::new([1.0], VarianceMode::Population),
            Err(AnalysisError::InsufficientData {
                required: 2,
                actual: 1
            })
        );
        assert!(DescriptiveStats::new([], VarianceMode::Sample).is_err());
    }
}
