use std::ops::Range;

use serde::{Deserialize, Serialize};

/// Strategy for choosing the number of histogram bins from the sample size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BinCount {
    /// Always use the given number of bins.
    Fixed(usize),
    /// `clamp(ceil(sqrt(n)), min, max)`.
    Adaptive { min: usize, max: usize },
    /// `min(ceil(sqrt(n)), max)`.
    SquareRoot { max: usize },
}

impl Default for BinCount {
    fn default() -> Self {
        Self::Adaptive { min: 20, max: 50 }
    }
}

impl BinCount {
    /// Resolves the strategy to a concrete bin count for `sample_size` values.
    ///
    /// The result is never less than 1.
    ///
    /// # Examples
    ///
    /// ```
    /// # use normcheck_stats::histogram::BinCount;
    /// assert_eq!(BinCount::Fixed(20).resolve(1_000), 20);
    /// assert_eq!(BinCount::Adaptive { min: 20, max: 50 }.resolve(10), 20);
    /// assert_eq!(BinCount::Adaptive { min: 20, max: 50 }.resolve(1_000), 32);
    /// assert_eq!(BinCount::Adaptive { min: 20, max: 50 }.resolve(1_000_000), 50);
    /// assert_eq!(BinCount::SquareRoot { max: 50 }.resolve(10), 4);
    /// ```
    #[expect(
        clippy::cast_precision_loss,
        clippy::cast_sign_loss,
        clippy::cast_possible_truncation
    )]
    #[must_use]
    pub fn resolve(self, sample_size: usize) -> usize {
        let sqrt_bins = (sample_size as f64).sqrt().ceil() as usize;
        let bins = match self {
            Self::Fixed(bins) => bins,
            Self::Adaptive { min, max } => sqrt_bins.max(min).min(max),
            Self::SquareRoot { max } => sqrt_bins.min(max),
        };
        bins.max(1)
    }
}

/// A histogram representation of a dataset's distribution.
///
/// The histogram divides `[min, max]` into bins of equal width and counts the
/// values falling into each bin. When every value is identical the histogram
/// consists of a single zero-width bin and [`is_single_point`](Self::is_single_point)
/// returns `true`; callers must special-case that shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Histogram {
    /// The bins comprising the histogram, in ascending order.
    pub bins: Vec<HistogramBin>,
    /// The width shared by every bin (`0.0` for a single-point histogram).
    pub bin_width: f64,
    single_point: bool,
}

/// A single bin in a histogram.
///
/// Each bin represents a range of values and the count of data points falling within that range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistogramBin {
    /// The range of values covered by this bin (inclusive start, exclusive end).
    ///
    /// The last bin also includes its end.
    pub range: Range<f64>,
    /// The midpoint of `range`.
    pub center: f64,
    /// The number of values that fall within this bin's range.
    pub count: usize,
}

impl Histogram {
    /// Creates a histogram from unsorted values.
    ///
    /// # Arguments
    ///
    /// * `values` - The data points to create the histogram from. Will be sorted internally.
    /// * `num_bins` - The number of bins to create.
    /// * `explicit_min` - If provided, overrides the minimum value for histogram bounds.
    /// * `explicit_max` - If provided, overrides the maximum value for histogram bounds.
    ///
    /// # Examples
    ///
    /// ```
    /// # use normcheck_stats::histogram::Histogram;
    /// let values = [5.0, 2.0, 8.0, 1.0, 9.0, 3.0, 7.0, 4.0, 6.0, 10.0];
    /// let histogram = Histogram::new(values, 5, None, None);
    /// assert_eq!(histogram.bins.len(), 5);
    /// assert!(histogram.bins.iter().all(|bin| bin.count == 2));
    /// ```
    #[must_use]
    pub fn new<I>(
        values: I,
        num_bins: usize,
        explicit_min: Option<f64>,
        explicit_max: Option<f64>,
    ) -> Self
    where
        I: IntoIterator<Item = f64>,
    {
        let mut sorted = values.into_iter().collect::<Vec<_>>();
        sorted.sort_by(f64::total_cmp);
        Self::from_sorted(&sorted, num_bins, explicit_min, explicit_max)
    }

    /// Creates a histogram from pre-sorted values.
    ///
    /// This is an optimized version that skips the sorting step.
    ///
    /// A value is assigned to bin `floor((value - min) / bin_width)`, except
    /// that a value equal to `max` always lands in the last bin. Values outside
    /// an explicit range are counted in the first or last bin, so the bin
    /// counts always sum to the number of values.
    ///
    /// An empty input or `num_bins == 0` yields a histogram without bins.
    ///
    /// # Panics
    ///
    /// Panics in debug mode if `sorted_values` is not sorted in ascending order.
    ///
    /// # Examples
    ///
    /// ```
    /// # use normcheck_stats::histogram::Histogram;
    /// let histogram = Histogram::from_sorted(&[5.0, 5.0, 5.0], 20, None, None);
    /// assert!(histogram.is_single_point());
    /// assert_eq!(histogram.bins.len(), 1);
    /// assert_eq!(histogram.bins[0].count, 3);
    /// ```
    #[expect(
        clippy::cast_precision_loss,
        clippy::cast_sign_loss,
        clippy::cast_possible_truncation
    )]
    #[must_use]
    pub fn from_sorted(
        sorted_values: &[f64],
        num_bins: usize,
        explicit_min: Option<f64>,
        explicit_max: Option<f64>,
    ) -> Self {
        debug_assert!(
            sorted_values.is_sorted_by(|a, b| a <= b),
            "values must be sorted in ascending order"
        );

        let (Some(&first), Some(&last)) = (sorted_values.first(), sorted_values.last()) else {
            return Self::empty();
        };
        if num_bins == 0 {
            return Self::empty();
        }

        let min = explicit_min.unwrap_or(first);
        let max = explicit_max.unwrap_or(last);

        if max <= min {
            // All values collapse onto one point: no meaningful bin width exists
            return Self {
                bins: vec![HistogramBin {
                    range: min..min,
                    center: min,
                    count: sorted_values.len(),
                }],
                bin_width: 0.0,
                single_point: true,
            };
        }

        let bin_width = (max - min) / num_bins as f64;
        let mut bins = (0..num_bins)
            .map(|bin_idx| {
                let start = min + bin_idx as f64 * bin_width;
                // Pin the last edge to `max` to avoid floating-point accumulation errors
                let end = if bin_idx == num_bins - 1 {
                    max
                } else {
                    min + (bin_idx + 1) as f64 * bin_width
                };
                HistogramBin {
                    range: start..end,
                    center: min + (bin_idx as f64 + 0.5) * bin_width,
                    count: 0,
                }
            })
            .collect::<Vec<_>>();

        for &val in sorted_values {
            let idx = if val >= max {
                num_bins - 1
            } else if val <= min {
                0
            } else {
                // Rounding can push values just below `max` one past the last bin
                (((val - min) / bin_width).floor() as usize).min(num_bins - 1)
            };
            bins[idx].count += 1;
        }

        Self {
            bins,
            bin_width,
            single_point: false,
        }
    }

    fn empty() -> Self {
        Self {
            bins: vec![],
            bin_width: 0.0,
            single_point: false,
        }
    }

    /// Returns `true` when every value was identical and the histogram has a
    /// single zero-width bin.
    #[must_use]
    pub fn is_single_point(&self) -> bool {
        self.single_point
    }

    /// The total number of values counted across all bins.
    #[must_use]
    pub fn total_count(&self) -> usize {
        self.bins.iter().map(|bin| bin.count).sum()
    }

    /// The representative value (center) of each bin.
    pub fn centers(&self) -> impl Iterator<Item = f64> + '_ {
        self.bins.iter().map(|bin| bin.center)
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn test_max_goes_to_last_bin() {
        let histogram = Histogram::new([0.0, 0.5, 1.0], 2, None, None);
        assert_eq!(histogram.bins[0].count, 1);
        assert_eq!(histogram.bins[1].count, 2);
        assert_eq!(histogram.bins[1].range.end, 1.0);
    }

    #[test]
    fn test_centers_and_edges() {
        let histogram = Histogram::new([0.0, 10.0], 4, None, None);
        assert!((histogram.bin_width - 2.5).abs() < 1e-12);
        let centers = histogram.centers().collect::<Vec<_>>();
        assert_eq!(centers, vec![1.25, 3.75, 6.25, 8.75]);
        assert_eq!(histogram.bins[2].range, 5.0..7.5);
    }

    #[test]
    fn test_single_point() {
        let histogram = Histogram::new([5.0; 5], 20, None, None);
        assert!(histogram.is_single_point());
        assert_eq!(histogram.bins.len(), 1);
        assert_eq!(histogram.bins[0].count, 5);
        assert_eq!(histogram.bins[0].center, 5.0);
        assert_eq!(histogram.bin_width, 0.0);
    }

    #[test]
    fn test_empty_input() {
        let histogram = Histogram::new([], 10, None, None);
        assert!(histogram.bins.is_empty());
        assert!(!histogram.is_single_point());
        assert!(Histogram::new([1.0, 2.0], 0, None, None).bins.is_empty());
    }

    #[test]
    fn test_explicit_range_clamps_outliers() {
        let histogram = Histogram::new([-5.0, 0.5, 1.5, 9.0], 2, Some(0.0), Some(2.0));
        assert_eq!(histogram.bins[0].count, 2);
        assert_eq!(histogram.bins[1].count, 2);
    }

    #[test]
    fn test_rebinning_centers_is_idempotent() {
        let values = (0..200).map(|i| f64::from(i).sin() * 3.0 + f64::from(i % 7));
        let histogram = Histogram::new(values, 12, None, None);
        let min = histogram.bins[0].range.start;
        let max = histogram.bins[11].range.end;

        let rebinned = Histogram::new(histogram.centers(), 12, Some(min), Some(max));
        for (original, again) in histogram.bins.iter().zip(&rebinned.bins) {
            assert!((original.range.start - again.range.start).abs() < 1e-12);
            assert!((original.range.end - again.range.end).abs() < 1e-12);
            assert_eq!(again.count, 1);
        }
    }

    #[test]
    fn test_bin_count_never_zero() {
        assert_eq!(BinCount::Fixed(0).resolve(100), 1);
        assert_eq!(BinCount::SquareRoot { max: 50 }.resolve(0), 1);
        assert_eq!(BinCount::SquareRoot { max: 50 }.resolve(10_000), 50);
    }

    proptest! {
        #[test]
        fn counts_sum_to_sample_size(
            values in proptest::collection::vec(-1e6_f64..1e6, 1..500),
            num_bins in 1_usize..80,
        ) {
            let histogram = Histogram::new(values.iter().copied(), num_bins, None, None);
            prop_assert_eq!(histogram.total_count(), values.len());
            if !histogram.is_single_point() {
                prop_assert_eq!(histogram.bins.len(), num_bins);
            }
        }
    }
}
