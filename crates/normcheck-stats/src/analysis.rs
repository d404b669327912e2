use serde::{Deserialize, Serialize};

use crate::{
    AnalysisError,
    anderson_darling::{AndersonDarling, SignificanceLevel},
    descriptive::{DescriptiveStats, VarianceMode},
    divergence::KlDivergence,
    histogram::{BinCount, Histogram},
    interpret::{KlBucket, KlThresholds},
    normal::{Gaussian, NormalCurve, NormalDistribution},
    qq::{QqPoint, qq_points},
    sample::Sample,
};

/// Sample size below which results are statistically unreliable.
///
/// The engine only logs a warning below this size; callers decide whether to refuse.
pub const RECOMMENDED_MIN_SAMPLE_SIZE: usize = 8;

/// Largest sample callers are expected to hand to [`analyze`].
pub const MAX_SAMPLE_SIZE: usize = 1_000_000;

/// Options controlling a normality analysis.
///
/// Every policy that differs between deployments of the analyzer is a field
/// here; nothing is picked implicitly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisOptions {
    /// How many histogram bins to use for the given sample size.
    pub bin_count: BinCount,
    /// Normalization of the variance used to fit the normal model.
    pub variance_mode: VarianceMode,
    /// Upper bound on the number of Q-Q points returned.
    pub qq_max_points: usize,
    /// Policy used to interpret the KL score.
    pub kl_thresholds: KlThresholds,
    /// Level at which the Anderson-Darling statistic is judged.
    pub significance_level: SignificanceLevel,
    /// Samples smaller than this are rejected. Values below 2 are treated as 2.
    pub min_sample_size: usize,
    /// Number of points in the overlay curve.
    pub curve_points: usize,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            bin_count: BinCount::default(),
            variance_mode: VarianceMode::default(),
            qq_max_points: 1_000,
            kl_thresholds: KlThresholds::standard(),
            significance_level: SignificanceLevel::default(),
            min_sample_size: 2,
            curve_points: 100,
        }
    }
}

/// Everything computed for one sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub stats: DescriptiveStats,
    pub histogram: Histogram,
    pub kl_divergence: KlDivergence,
    /// Bucket of the KL score, absent when the divergence is undefined.
    pub kl_interpretation: Option<KlBucket>,
    pub anderson_darling: AndersonDarling,
    pub significance_level: SignificanceLevel,
    /// Whether the Anderson-Darling statistic is below the critical value at
    /// `significance_level`.
    pub passes_normality: bool,
    pub qq_points: Vec<QqPoint>,
    /// Fitted density scaled to histogram counts.
    pub normal_curve: NormalCurve,
}

impl AnalysisResult {
    /// Largest absolute distance of a Q-Q point from the identity line.
    #[must_use]
    pub fn max_qq_deviation(&self) -> Option<f64> {
        self.qq_points
            .iter()
            .map(|point| point.deviation().abs())
            .max_by(f64::total_cmp)
    }
}

/// Runs every diagnostic on `sample` with the default normal backend.
///
/// # Errors
///
/// Returns [`AnalysisError::InsufficientData`] if the sample is smaller than
/// `options.min_sample_size` (and never accepts fewer than two values).
///
/// # Examples
///
/// ```
/// use normcheck_stats::{
///     analysis::{AnalysisOptions, analyze},
///     sample::Sample,
/// };
///
/// let sample = Sample::from_text("5 5 5 5 5").unwrap();
/// let result = analyze(&sample, &AnalysisOptions::default()).unwrap();
/// assert!(result.histogram.is_single_point());
/// assert!(result.kl_divergence.is_undefined());
/// assert!(result.kl_interpretation.is_none());
/// ```
pub fn analyze(
    sample: &Sample,
    options: &AnalysisOptions,
) -> Result<AnalysisResult, AnalysisError> {
    analyze_with::<Gaussian>(sample, options)
}

/// Runs every diagnostic on `sample`, evaluating the normal model through `D`.
///
/// # Errors
///
/// See [`analyze`]. Errors from the backend's constructor or quantile
/// function are propagated as well.
#[expect(clippy::cast_precision_loss)]
pub fn analyze_with<D>(
    sample: &Sample,
    options: &AnalysisOptions,
) -> Result<AnalysisResult, AnalysisError>
where
    D: NormalDistribution,
{
    let sorted = sample.sorted();
    let n = sorted.len();
    let required = options.min_sample_size.max(2);
    if n < required {
        return Err(AnalysisError::InsufficientData {
            required,
            actual: n,
        });
    }
    if n < RECOMMENDED_MIN_SAMPLE_SIZE {
        log::warn!(
            "only {n} data points; at least {RECOMMENDED_MIN_SAMPLE_SIZE} are recommended for reliable results"
        );
    }

    let stats = DescriptiveStats::from_sorted(sorted, options.variance_mode)?;
    let model = D::new(stats.mean, stats.std_dev)?;

    let num_bins = options.bin_count.resolve(n);
    let histogram = Histogram::from_sorted(sorted, num_bins, None, None);
    let kl_divergence = KlDivergence::estimate(&histogram, &model);
    let kl_interpretation = options.kl_thresholds.interpret(kl_divergence).cloned();

    // `sorted` is never empty past the size check
    let anderson_darling = AndersonDarling::from_sorted(sorted, &model).ok_or(
        AnalysisError::InsufficientData {
            required,
            actual: n,
        },
    )?;
    let passes_normality = anderson_darling.passes(options.significance_level);

    let qq_points = qq_points(sorted, &model, options.qq_max_points)?;

    let (curve_start, curve_end) = if stats.is_degenerate() {
        (stats.min - 1.0, stats.max + 1.0)
    } else {
        (
            (stats.mean - 4.0 * stats.std_dev).max(f64::MIN),
            (stats.mean + 4.0 * stats.std_dev).min(f64::MAX),
        )
    };
    let curve_bin_width = if histogram.is_single_point() {
        1.0
    } else {
        histogram.bin_width
    };
    let normal_curve = NormalCurve::sample(
        &model,
        curve_start,
        curve_end,
        options.curve_points,
        (n as f64 * curve_bin_width).min(f64::MAX),
    );

    log::debug!(
        "analyzed {n} values: mean={}, std_dev={}, bins={num_bins}, kl={kl_divergence:?}, a2={}",
        stats.mean,
        stats.std_dev,
        anderson_darling.statistic,
    );

    Ok(AnalysisResult {
        stats,
        histogram,
        kl_divergence,
        kl_interpretation,
        anderson_darling,
        significance_level: options.significance_level,
        passes_normality,
        qq_points,
        normal_curve,
    })
}
